//! Session server configuration types

use url::Url;

use crate::{get_env_or_default, parse_env, ConfigError, ConfigResult};

const SERVER_URL_VAR: &str = "JUKEBOX_SERVER_URL";

/// Default session server origin
const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Default path of the session WebSocket endpoint
const DEFAULT_WS_PATH: &str = "/session/ws";

/// Path the client navigates to when leaving a session
const LOGOUT_PATH: &str = "/session/logout";

/// Session server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP origin of the session server (e.g. `https://jukebox.example`)
    pub base_url: Url,

    /// Path of the session WebSocket endpoint
    pub ws_path: String,

    /// Timeout for plain HTTP requests in seconds
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load server configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let raw_url = get_env_or_default(SERVER_URL_VAR, DEFAULT_SERVER_URL);
        let mut config = Self::with_url(&raw_url)?;
        config.ws_path = get_env_or_default("JUKEBOX_WS_PATH", DEFAULT_WS_PATH);
        config.request_timeout_secs = parse_env("JUKEBOX_REQUEST_TIMEOUT", 10)?;
        Ok(config)
    }

    /// Create a configuration with a custom origin (useful for testing)
    pub fn with_url(url: &str) -> ConfigResult<Self> {
        let invalid = |reason: String| ConfigError::InvalidServerUrl {
            var: SERVER_URL_VAR.to_string(),
            reason,
        };

        let base_url = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }

        Ok(Self {
            base_url,
            ws_path: DEFAULT_WS_PATH.to_string(),
            request_timeout_secs: 10,
        })
    }

    /// WebSocket URL of the session endpoint
    ///
    /// The scheme follows the origin: `https` origins use `wss`, everything
    /// else uses `ws`.
    pub fn ws_url(&self) -> Url {
        let mut url = self.base_url.clone();
        let scheme = if self.base_url.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        // http -> ws and https -> wss are both special-to-special, always accepted
        let _ = url.set_scheme(scheme);
        url.set_path(&self.ws_path);
        url.set_query(None);
        url
    }

    /// Absolute URL for a server-relative path
    pub fn http_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    /// URL the client navigates to when the session ends
    pub fn logout_url(&self) -> Url {
        self.http_url(LOGOUT_PATH)
    }

    /// Link a host shares with peers to join a session
    pub fn join_url(&self, session_id: &str) -> Url {
        self.http_url(&format!("/join/{}", session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::with_url(DEFAULT_SERVER_URL).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.ws_path, "/session/ws");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_ws_url_plain_origin() {
        let config = ServerConfig::with_url("http://jukebox.local:8080").unwrap();
        assert_eq!(config.ws_url().as_str(), "ws://jukebox.local:8080/session/ws");
    }

    #[test]
    fn test_ws_url_secure_origin() {
        let config = ServerConfig::with_url("https://jukebox.example").unwrap();
        assert_eq!(config.ws_url().as_str(), "wss://jukebox.example/session/ws");
    }

    #[test]
    fn test_ws_url_drops_page_path_and_query() {
        let config = ServerConfig::with_url("https://jukebox.example/session/?x=1").unwrap();
        assert_eq!(config.ws_url().as_str(), "wss://jukebox.example/session/ws");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = ServerConfig::with_url("ftp://jukebox.example");
        assert!(matches!(result, Err(ConfigError::InvalidServerUrl { .. })));
    }

    #[test]
    fn test_rejects_garbage_url() {
        assert!(ServerConfig::with_url("not a url").is_err());
    }

    #[test]
    fn test_logout_and_join_urls() {
        let config = ServerConfig::with_url("https://jukebox.example").unwrap();
        assert_eq!(
            config.logout_url().as_str(),
            "https://jukebox.example/session/logout"
        );
        assert_eq!(
            config.join_url("abc-123").as_str(),
            "https://jukebox.example/join/abc-123"
        );
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("JUKEBOX_SERVER_URL", Some("https://party.example")),
                ("JUKEBOX_WS_PATH", Some("/live")),
                ("JUKEBOX_REQUEST_TIMEOUT", Some("3")),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.ws_url().as_str(), "wss://party.example/live");
                assert_eq!(config.request_timeout_secs, 3);
            },
        );
    }

    #[test]
    fn test_from_env_invalid_timeout() {
        temp_env::with_var("JUKEBOX_REQUEST_TIMEOUT", Some("soon"), || {
            let result = ServerConfig::from_env();
            assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        });
    }
}
