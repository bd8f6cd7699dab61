//! Outbound reply lines.

use std::fmt;

/// Every line the server sends to a client.
///
/// `Display` renders the text WITHOUT the trailing newline; the
/// [`Codec`](crate::Codec) adds the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// First line after connecting.
    Welcome,
    /// Second line after connecting: prompts for `name <text>`.
    AskName,
    /// Greeting once the display name is set.
    Hello { name: String },
    /// Sent right after the greeting, on entering the lobby.
    LobbyWelcome,
    /// Acknowledges `play`.
    Searching,
    /// Start-of-match notice naming the opponent.
    MatchStarting { opponent: String },
    /// Response to a malformed line.
    NotUnderstood,
    /// Free text produced by match logic.
    Text(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => write!(f, "Welcome to Ticky Tacky Tocky World"),
            Self::AskName => write!(f, "What's your name?"),
            Self::Hello { name } => write!(f, "Hello {name}"),
            Self::LobbyWelcome => write!(f, "Welcome to the lobby!"),
            Self::Searching => {
                write!(f, "Looking for a challenger for you...")
            }
            Self::MatchStarting { opponent } => {
                write!(f, "The match is starting with {opponent}")
            }
            Self::NotUnderstood => {
                write!(f, "Sorry, I don't understand that!")
            }
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_hello_includes_name() {
        let reply = Reply::Hello {
            name: "Alice".into(),
        };
        assert_eq!(reply.to_string(), "Hello Alice");
    }

    #[test]
    fn test_reply_match_starting_names_opponent() {
        let reply = Reply::MatchStarting {
            opponent: "Bob".into(),
        };
        assert!(reply.to_string().contains("Bob"));
    }

    #[test]
    fn test_reply_display_has_no_newline() {
        for reply in [
            Reply::Welcome,
            Reply::AskName,
            Reply::LobbyWelcome,
            Reply::Searching,
            Reply::NotUnderstood,
        ] {
            assert!(!reply.to_string().contains('\n'), "{reply:?}");
        }
    }
}
