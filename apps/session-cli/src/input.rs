//! Terminal input parsing and dispatch

use std::io::BufRead;

use jukebox_session_client::{CommandDispatcher, CommandResult};

pub const HELP: &str = "\
commands:
  search <query>      search the catalog
  queue <track id>    add a track to the queue
  vote <track id>     vote for a queued track
  state               refresh playback state
  votes               refresh your votes
  devices             list playback devices (host)
  transfer <device>   move playback to a device (host)
  kill                end the session for everyone (host)
  leave               leave the session
  help                show this help";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Search(String),
    Queue(String),
    Vote(String),
    State,
    Votes,
    Devices,
    Transfer(String),
    Kill,
    Leave,
    Help,
    Empty,
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Input::Empty,
            "search" | "s" => Input::Search(rest.to_string()),
            "queue" | "q" => Input::Queue(rest.to_string()),
            "vote" | "v" => Input::Vote(rest.to_string()),
            "state" => Input::State,
            "votes" => Input::Votes,
            "devices" => Input::Devices,
            "transfer" => Input::Transfer(rest.to_string()),
            "kill" => Input::Kill,
            "leave" | "quit" | "exit" => Input::Leave,
            "help" | "?" => Input::Help,
            other => Input::Unknown(other.to_string()),
        }
    }

    /// Hand the input to the dispatcher
    pub fn dispatch(self, dispatcher: &CommandDispatcher) -> CommandResult<()> {
        match self {
            Input::Search(query) => dispatcher.search(&query),
            Input::Queue(id) => dispatcher.queue(&id),
            Input::Vote(id) => dispatcher.vote(&id),
            Input::State => {
                dispatcher.request_state();
                Ok(())
            }
            Input::Votes => {
                dispatcher.request_voted_tracks();
                Ok(())
            }
            Input::Devices => dispatcher.request_devices(),
            Input::Transfer(device_id) => dispatcher.transfer(&device_id),
            Input::Kill => dispatcher.end_session(),
            Input::Leave => {
                dispatcher.leave();
                Ok(())
            }
            Input::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Input::Empty => Ok(()),
            Input::Unknown(word) => {
                println!("unknown command '{}', type 'help'", word);
                Ok(())
            }
        }
    }
}

/// Read commands from stdin until it closes or the user leaves
///
/// Runs on a dedicated thread: stdin reads block.
pub fn read_stdin(dispatcher: CommandDispatcher) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read input");
                break;
            }
        };

        let input = Input::parse(&line);
        let leaving = input == Input::Leave;
        if let Err(e) = input.dispatch(&dispatcher) {
            println!("! {}", e);
        }
        if leaving {
            return;
        }
    }

    // stdin closed
    dispatcher.leave();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("search daft punk", Input::Search("daft punk".to_string()))]
    #[case("  s   around the world ", Input::Search("around the world".to_string()))]
    #[case("search", Input::Search(String::new()))]
    #[case("queue t1", Input::Queue("t1".to_string()))]
    #[case("VOTE t2", Input::Vote("t2".to_string()))]
    #[case("state", Input::State)]
    #[case("votes", Input::Votes)]
    #[case("devices", Input::Devices)]
    #[case("transfer d1", Input::Transfer("d1".to_string()))]
    #[case("kill", Input::Kill)]
    #[case("quit", Input::Leave)]
    #[case("?", Input::Help)]
    #[case("   ", Input::Empty)]
    #[case("dance", Input::Unknown("dance".to_string()))]
    fn test_parse_input(#[case] line: &str, #[case] expected: Input) {
        assert_eq!(Input::parse(line), expected);
    }
}
