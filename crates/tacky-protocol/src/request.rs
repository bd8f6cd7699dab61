//! Inbound request lines.
//!
//! A request line looks like `<command> <body>`. The line is split at the
//! FIRST space: everything before it is the command token, everything
//! after it (spaces included) is the body.
//!
//! ```text
//! "name Alice Smith"  →  command = "name", body = "Alice Smith"
//! "play now"          →  command = "play", body = "now"
//! "play"              →  command = "play", body = ""   (body-less command)
//! "hello"             →  ProtocolError::MissingDelimiter
//! ```

use crate::ProtocolError;

/// Commands that may be sent without a delimiter or body.
///
/// Every other line lacking a space is rejected as malformed.
pub const BODYLESS_COMMANDS: &[&str] = &["play"];

/// One decoded request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The command token (text before the first space).
    pub command: String,
    /// The rest of the line after the first space. May be empty and may
    /// contain further spaces.
    pub body: String,
}

/// The commands the server recognizes, borrowed from a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `name <text>` — set the display name.
    Name(&'a str),
    /// `play` — ask to be matched with an opponent. The body is ignored.
    Play,
    /// Anything else. Only meaningful to match logic.
    Other(&'a str),
}

impl Request {
    /// Parses a single line. A trailing `\n` or `\r\n` is stripped first.
    ///
    /// # Errors
    /// - [`ProtocolError::Empty`] for an empty line.
    /// - [`ProtocolError::MissingDelimiter`] for a line with no space that
    ///   is not one of [`BODYLESS_COMMANDS`].
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = strip_terminator(line);
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }

        match line.split_once(' ') {
            Some((command, body)) => Ok(Self {
                command: command.to_string(),
                body: body.to_string(),
            }),
            None if BODYLESS_COMMANDS.contains(&line) => Ok(Self {
                command: line.to_string(),
                body: String::new(),
            }),
            None => Err(ProtocolError::MissingDelimiter(line.to_string())),
        }
    }

    /// Classifies the command token.
    pub fn command(&self) -> Command<'_> {
        match self.command.as_str() {
            "name" => Command::Name(&self.body),
            "play" => Command::Play,
            other => Command::Other(other),
        }
    }
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
