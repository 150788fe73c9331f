//! Newline-framed JSON envelopes
//!
//! The engine speaks one JSON object per line. [`LineFramer`] accumulates raw
//! bytes across partial reads and only hands out complete lines; [`decode_line`]
//! turns one of those lines into an [`InboundEnvelope`]. A bad line never poisons
//! the framer, so decoding picks up again on the next line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to turn one line into an envelope.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("line longer than {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("engine reported an error: {0}")]
    Remote(String),
}

impl CodecError {
    /// Whether the line itself could not be read as JSON text
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            CodecError::Json(_) | CodecError::Utf8(_) | CodecError::LineTooLong { .. }
        )
    }
}

/// Envelopes the engine sends to the client
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEnvelope {
    /// `{"action":"create","battle_id":"<id>"}`
    Created { battle_id: String },
    /// `{"action":"message","output":"<battle log line>"}`
    Message { output: String },
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    action: Option<String>,
    battle_id: Option<String>,
    output: Option<String>,
    error: Option<serde_json::Value>,
}

/// Decode one complete line (without its terminating newline)
pub fn decode_line(line: &str) -> Result<InboundEnvelope, CodecError> {
    let raw: RawEnvelope = serde_json::from_str(line.trim())?;

    if let Some(error) = raw.error {
        let message = match error {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return Err(CodecError::Remote(message));
    }

    let action = raw
        .action
        .ok_or_else(|| CodecError::Protocol("envelope has no action".to_string()))?;

    match action.as_str() {
        "create" => {
            let battle_id = raw.battle_id.ok_or_else(|| {
                CodecError::Protocol("create acknowledgment without battle_id".to_string())
            })?;
            Ok(InboundEnvelope::Created { battle_id })
        }
        "message" => {
            let output = raw
                .output
                .ok_or_else(|| CodecError::Protocol("message without output".to_string()))?;
            Ok(InboundEnvelope::Message { output })
        }
        other => Err(CodecError::Protocol(format!("unknown action: {other}"))),
    }
}

/// Envelopes the client sends to the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum OutboundEnvelope {
    Create,
    Command { command: String, battle_id: String },
}

impl OutboundEnvelope {
    pub fn create() -> Self {
        Self::Create
    }

    pub fn command(command: impl Into<String>, battle_id: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            battle_id: battle_id.into(),
        }
    }

    /// Serialize to wire format, newline included
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Longest line accepted by default, in bytes
pub const DEFAULT_MAX_LINE: usize = 1024 * 1024;

/// Accumulates bytes until complete `\n`-terminated lines are available
///
/// Each byte is searched for a newline once. A line longer than the limit is
/// reported once and then skipped up to its newline, so one runaway line
/// cannot grow the buffer without bound.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    /// Start of the first unconsumed line
    start: usize,
    /// Bytes past `start` already known to hold no newline
    scanned: usize,
    max_line: usize,
    /// Dropping the tail of an oversized line
    discarding: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE)
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            start: 0,
            scanned: 0,
            max_line,
            discarding: false,
        }
    }

    /// Append bytes from a read
    pub fn push(&mut self, bytes: &[u8]) {
        // compact once consumed lines outweigh the held partial
        if self.start > 0 && self.start >= self.buffer.len() / 2 {
            self.buffer.drain(..self.start);
            self.start = 0;
        }
        self.buffer.extend_from_slice(bytes);
    }

    /// Take the next complete line, skipping blank ones
    pub fn next_line(&mut self) -> Option<Result<Vec<u8>, CodecError>> {
        loop {
            let unread = &self.buffer[self.start + self.scanned..];
            let Some(offset) = unread.iter().position(|&b| b == b'\n') else {
                self.scanned = self.buffer.len() - self.start;
                return self.hold_partial();
            };

            let end = self.start + self.scanned + offset;
            let mut line = self.buffer[self.start..end].to_vec();
            self.start = end + 1;
            self.scanned = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_line {
                return Some(Err(CodecError::LineTooLong {
                    limit: self.max_line,
                }));
            }
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(Ok(line));
        }
    }

    /// No newline buffered: keep the partial line unless it is already too long
    fn hold_partial(&mut self) -> Option<Result<Vec<u8>, CodecError>> {
        let partial = self.buffer.len() - self.start;
        if self.discarding || partial > self.max_line {
            self.buffer.clear();
            self.start = 0;
            self.scanned = 0;
            if !self.discarding {
                self.discarding = true;
                return Some(Err(CodecError::LineTooLong {
                    limit: self.max_line,
                }));
            }
        }
        None
    }

    /// Take every complete line currently buffered
    pub fn drain_lines(&mut self) -> Vec<Result<Vec<u8>, CodecError>> {
        std::iter::from_fn(|| self.next_line()).collect()
    }

    /// Bytes held back waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len() - self.start
    }
}

/// One framed line together with its decode outcome
#[derive(Debug)]
pub struct Decoded {
    /// Empty when the line was too long to keep
    pub line: String,
    pub result: Result<InboundEnvelope, CodecError>,
}

/// Framer and envelope decoding in one step
#[derive(Debug, Default)]
pub struct EnvelopeDecoder {
    framer: LineFramer,
}

impl EnvelopeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            framer: LineFramer::with_max_line(max_line),
        }
    }

    /// Feed bytes from the transport and decode every line they complete
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Decoded> {
        self.framer.push(bytes);
        self.framer
            .drain_lines()
            .into_iter()
            .map(|framed| match framed.map(String::from_utf8) {
                Ok(Ok(line)) => {
                    let result = decode_line(&line);
                    Decoded { line, result }
                }
                Ok(Err(e)) => Decoded {
                    line: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                    result: Err(CodecError::Utf8(e)),
                },
                Err(e) => Decoded {
                    line: String::new(),
                    result: Err(e),
                },
            })
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.framer.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_create() {
        let envelope = decode_line(r#"{"action":"create","battle_id":"abc"}"#).unwrap();
        assert_eq!(
            envelope,
            InboundEnvelope::Created {
                battle_id: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_decode_message() {
        let envelope = decode_line(r#"{"action":"message","output":"|turn|1"}"#).unwrap();
        assert_eq!(
            envelope,
            InboundEnvelope::Message {
                output: "|turn|1".to_string()
            }
        );
    }

    #[test]
    fn test_decode_remote_error() {
        let err = decode_line(r#"{"error":"no such battle"}"#).unwrap_err();
        assert!(matches!(err, CodecError::Remote(ref m) if m == "no such battle"));
    }

    #[test]
    fn test_decode_missing_action() {
        let err = decode_line(r#"{"battle_id":"abc"}"#).unwrap_err();
        assert!(matches!(err, CodecError::Protocol(_)));
        assert!(!err.is_decode());
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = decode_line(r#"{"action":"mess"#).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_framer_holds_partial_line() {
        let mut framer = LineFramer::new();
        framer.push(br#"{"action":"cre"#);
        assert!(framer.next_line().is_none());

        framer.push(b"ate\"}\n{\"act");
        assert_eq!(
            framer.next_line().unwrap().unwrap(),
            br#"{"action":"create"}"#.to_vec()
        );
        assert!(framer.next_line().is_none());
        assert_eq!(framer.pending(), 5);
    }

    #[test]
    fn test_framer_skips_blank_lines_and_carriage_returns() {
        let mut framer = LineFramer::new();
        framer.push(b"\n  \r\nfirst\r\nsecond\n");
        let lines: Vec<Vec<u8>> = framer.drain_lines().into_iter().map(Result::unwrap).collect();
        assert_eq!(lines, vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn test_framer_partial_line_across_many_pushes() {
        let mut framer = LineFramer::new();
        for _ in 0..1000 {
            framer.push(b"ab");
            assert!(framer.next_line().is_none());
        }
        framer.push(b"\n");
        assert_eq!(framer.next_line().unwrap().unwrap().len(), 2000);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_framer_drops_oversized_partial_line() {
        let mut framer = LineFramer::with_max_line(8);
        framer.push(b"0123456789");
        assert!(matches!(
            framer.next_line(),
            Some(Err(CodecError::LineTooLong { limit: 8 }))
        ));
        assert_eq!(framer.pending(), 0);

        // the rest of the runaway line is skipped without a second report
        framer.push(b"abcdefghijklmnop");
        assert!(framer.next_line().is_none());
        assert_eq!(framer.pending(), 0);

        framer.push(b"xyz\nok\n");
        assert_eq!(framer.next_line().unwrap().unwrap(), b"ok".to_vec());
        assert!(framer.next_line().is_none());
    }

    #[test]
    fn test_framer_rejects_oversized_complete_line() {
        let mut framer = LineFramer::with_max_line(4);
        framer.push(b"too long\nfine\n");
        let lines = framer.drain_lines();
        assert_eq!(lines.len(), 2);
        assert!(matches!(lines[0], Err(CodecError::LineTooLong { limit: 4 })));
        assert_eq!(lines[1].as_ref().unwrap(), &b"fine".to_vec());
    }

    #[test]
    fn test_decoder_reports_oversized_line_and_continues() {
        let mut decoder = EnvelopeDecoder::with_max_line(48);
        let long = format!("{{\"action\":\"message\",\"output\":\"{}\"}}\n", "x".repeat(64));
        let mut input = long.into_bytes();
        input.extend_from_slice(b"{\"action\":\"create\",\"battle_id\":\"a\"}\n");

        let decoded = decoder.feed(&input);
        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].result.as_ref().unwrap_err().is_decode());
        assert!(decoded[0].line.is_empty());
        assert!(decoded[1].result.is_ok());
    }

    #[test]
    fn test_decoder_isolates_corrupt_line() {
        let mut decoder = EnvelopeDecoder::new();
        let input = concat!(
            r#"{"action":"create","battle_id":"abc"}"#,
            "\n",
            r#"{"action": oops"#,
            "\n",
            r#"{"action":"message","output":"|turn|1"}"#,
            "\n"
        );
        let decoded = decoder.feed(input.as_bytes());

        assert_eq!(decoded.len(), 3);
        assert!(decoded[0].result.is_ok());
        assert!(decoded[1].result.as_ref().unwrap_err().is_decode());
        assert_eq!(decoded[1].line, r#"{"action": oops"#);
        assert!(matches!(
            decoded[2].result,
            Ok(InboundEnvelope::Message { ref output }) if output == "|turn|1"
        ));
    }

    #[test]
    fn test_decoder_invalid_utf8() {
        let mut decoder = EnvelopeDecoder::new();
        let decoded = decoder.feed(b"\xff\xfe\n");
        assert_eq!(decoded.len(), 1);
        assert!(matches!(decoded[0].result, Err(CodecError::Utf8(_))));
    }

    #[test]
    fn test_outbound_wire_format() {
        assert_eq!(
            OutboundEnvelope::create().to_line().unwrap(),
            "{\"action\":\"create\"}\n"
        );
        assert_eq!(
            OutboundEnvelope::command(">p1 move 1", "abc")
                .to_line()
                .unwrap(),
            "{\"action\":\"command\",\"command\":\">p1 move 1\",\"battle_id\":\"abc\"}\n"
        );
    }
}
