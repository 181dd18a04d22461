//! Codec trait and the line codec used on the wire.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The transport already splits the stream into lines, so the codec only
//! has to deal with the contents of one line at a time.

use std::fmt;

use crate::ServerMessage;

/// One inbound line from a player, interpreted as a guess.
///
/// There is no separate "command" grammar: every line is a guess, and
/// anything that doesn't match the word is simply a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess(String);

impl Guess {
    /// Wraps already-decoded text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Borrows the guessed text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the guessed text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts outbound messages to line bytes and inbound lines to guesses.
///
/// Decoding cannot fail: malformed input is still a guess, just one that
/// will never match.
pub trait Codec: Send + Sync + 'static {
    /// Renders a message as the bytes of one line (no terminator).
    fn encode(&self, msg: &ServerMessage) -> Vec<u8>;

    /// Interprets the bytes of one line (no terminator) as a guess.
    fn decode(&self, line: &[u8]) -> Guess;
}

/// The plain-text codec: UTF-8 out, lossy UTF-8 in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl Codec for LineCodec {
    fn encode(&self, msg: &ServerMessage) -> Vec<u8> {
        msg.to_string().into_bytes()
    }

    fn decode(&self, line: &[u8]) -> Guess {
        // Invalid UTF-8 becomes U+FFFD, which can't match any word.
        let text = String::from_utf8_lossy(line);
        Guess::new(text.trim_end_matches(['\r', '\n']))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uses_catalogue_text() {
        let bytes = LineCodec.encode(&ServerMessage::RemainingGuesses(4));
        assert_eq!(bytes, b"Remaining guesses: 4");
    }

    #[test]
    fn test_decode_plain_line() {
        assert_eq!(LineCodec.decode(b"python").as_str(), "python");
    }

    #[test]
    fn test_decode_strips_stray_terminators() {
        assert_eq!(LineCodec.decode(b"sleep\r").as_str(), "sleep");
    }

    #[test]
    fn test_decode_keeps_case_and_inner_spaces() {
        // Matching is case-sensitive and exact, so the codec must not
        // normalize anything beyond the line terminator.
        assert_eq!(LineCodec.decode(b" Py thon").as_str(), " Py thon");
    }

    #[test]
    fn test_decode_invalid_utf8_is_still_a_guess() {
        let guess = LineCodec.decode(&[0x70, 0xff, 0x79]);
        assert_eq!(guess.as_str(), "p\u{fffd}y");
    }

    #[test]
    fn test_decode_empty_line() {
        assert_eq!(LineCodec.decode(b"").into_inner(), "");
    }
}
