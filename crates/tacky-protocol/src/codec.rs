//! Codec trait and the newline-delimited text implementation.
//!
//! A "codec" (coder/decoder) converts between Rust types and what travels
//! on the wire. The session layer doesn't care HOW a line becomes a
//! [`Request`] — it just needs something implementing [`Codec`].

use crate::{ProtocolError, Reply, Request};

/// Converts inbound lines to requests and replies to outbound lines.
///
/// `Send + Sync + 'static` because one codec is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Decodes one inbound line.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the line is malformed.
    fn decode(&self, line: &str) -> Result<Request, ProtocolError>;

    /// Encodes a reply as a complete line, terminator included.
    fn encode(&self, reply: &Reply) -> String;
}

/// A [`Codec`] for `<command> <body>\n` lines.
///
/// ```rust
/// use tacky_protocol::{Codec, LineCodec, Reply};
///
/// let codec = LineCodec;
/// let request = codec.decode("name Alice\n").unwrap();
/// assert_eq!(request.body, "Alice");
///
/// let line = codec.encode(&Reply::Hello { name: request.body });
/// assert_eq!(line, "Hello Alice\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl Codec for LineCodec {
    fn decode(&self, line: &str) -> Result<Request, ProtocolError> {
        Request::parse(line)
    }

    fn encode(&self, reply: &Reply) -> String {
        format!("{reply}\n")
    }
}
