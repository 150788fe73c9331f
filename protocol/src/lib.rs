//! Wire format for the catchline battle engine.
//!
//! Every message in both directions is a single JSON object terminated by `\n`.
//! Inbound envelopes either acknowledge a battle creation, carry one line of
//! battle log output, or report an engine-side error. Battle log lines use the
//! Showdown-style `|kind|arg|arg` layout and are parsed into [`ServerMessage`].

use thiserror::Error;

pub mod client;
pub mod envelope;
pub mod server;

pub use client::{ClientCommand, PlayerSpec};
pub use envelope::{
    CodecError, DEFAULT_MAX_LINE, Decoded, EnvelopeDecoder, InboundEnvelope, LineFramer, OutboundEnvelope,
    decode_line,
};
pub use server::{
    CombatantDetails, CombatantRef, HpStatus, Player, ServerMessage, Side, Stat, Tokens,
    parse_server_message, tokenize,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty message")]
    EmptyMessage,
}
