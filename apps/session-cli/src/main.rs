use std::sync::Arc;

use jukebox_session_client::{SessionClient, SessionContext, SessionHttpClient, WsConnector};
use jukebox_shared_config::ClientConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod input;
mod view;

use view::TerminalView;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout belongs to the session view
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukebox_cli=debug,jukebox_session_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;

    tracing::info!(
        server = %config.server.base_url,
        environment = %config.environment,
        "Starting Jukebox session client"
    );

    let http = SessionHttpClient::new(config.server.clone())?;

    let context = resolve_context(config.context.as_deref(), &http).await?;
    tracing::info!(%context, "Resolved session context");

    let mut client = SessionClient::new(
        Arc::new(WsConnector::with_cookies(http.cookies())),
        &config.server,
        config.reconnect.clone(),
        context,
        TerminalView::new(context),
    );

    println!("{}", input::HELP);
    let dispatcher = client.dispatcher().clone();
    std::thread::spawn(move || input::read_stdin(dispatcher));

    let exit = client.run().await;
    tracing::info!(reason = %exit, "Session finished");

    if let Err(e) = http.logout().await {
        tracing::warn!(error = %e, "Logout failed");
    }

    Ok(())
}

/// Role from the configured hint, or from the server when no hint is set
///
/// A bad hint is a configuration error. A failed lookup joins without a role.
async fn resolve_context(
    hint: Option<&str>,
    http: &SessionHttpClient,
) -> anyhow::Result<SessionContext> {
    if let Some(raw) = hint {
        return raw.parse::<SessionContext>().map_err(anyhow::Error::msg);
    }

    Ok(http.fetch_context().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not resolve session context");
        SessionContext::None
    }))
}
