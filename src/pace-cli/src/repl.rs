//! Line commands read from stdin while the player runs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Play(String),
    Next,
    Pause,
    Resume,
    Clear,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplError {
    #[error("play requires a url")]
    MissingUrl,
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
}

pub const HELP: &str = "\
commands:
  play <url>   queue a song or playlist
  next         skip the current song
  pause        pause playback
  resume       resume playback
  clear        stop and empty the queue
  status       show what is playing
  quit         exit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, ReplError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "play" | "p" => {
            if rest.is_empty() {
                return Err(ReplError::MissingUrl);
            }
            ReplCommand::Play(rest.to_string())
        }
        "next" | "skip" | "n" => ReplCommand::Next,
        "pause" => ReplCommand::Pause,
        "resume" => ReplCommand::Resume,
        "clear" => ReplCommand::Clear,
        "status" => ReplCommand::Status,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(ReplError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
