//! Error types for the protocol layer.
//!
//! Each crate in Tacky defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in how a line was shaped,
//! not in networking or matchmaking.

/// Errors that can occur while decoding a request line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The line has no space separating the command from the body, and
    /// the whole line is not a body-less command either.
    #[error("missing delimiter in line: {0:?}")]
    MissingDelimiter(String),

    /// The line was empty once the terminator was stripped.
    #[error("empty line")]
    Empty,
}
