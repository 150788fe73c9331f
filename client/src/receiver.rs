//! The read loop: transport bytes in, events out

use std::sync::Weak;

use tokio::io::{AsyncRead, AsyncReadExt};

use catchline_battle::{BattleEvent, TrackError};
use catchline_protocol::{CodecError, Decoded, EnvelopeDecoder, InboundEnvelope, parse_server_message};

use crate::log::LogEntry;
use crate::session::Shared;
use crate::state::{Phase, SessionState};

const READ_BUFFER: usize = 8 * 1024;

/// Read until the transport closes or fails, or the session is dropped.
///
/// Lines are handled strictly in arrival order. A line that cannot be decoded or
/// interpreted becomes an event of its own; only transport failures end the loop.
pub(crate) async fn run<R>(mut reader: R, shared: Weak<Shared>, max_line: usize)
where
    R: AsyncRead + Unpin,
{
    let mut decoder = EnvelopeDecoder::with_max_line(max_line);
    let mut buf = vec![0u8; READ_BUFFER];

    loop {
        let read = reader.read(&mut buf).await;
        let Some(shared) = shared.upgrade() else {
            break;
        };

        match read {
            Ok(0) => {
                tracing::error!(pending = decoder.pending(), "battle engine closed the connection");
                shared.disconnected("connection closed by the engine".to_string());
                break;
            }
            Ok(n) => {
                for decoded in decoder.feed(&buf[..n]) {
                    if shared.handle(decoded) {
                        shared.opponent_turn().await;
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read from battle engine");
                shared.disconnected(e.to_string());
                break;
            }
        }
    }
}

impl Shared {
    /// Apply one framed line and dispatch what it produced.
    ///
    /// Returns true when a turn began and the opponent should pick a move.
    fn handle(&self, decoded: Decoded) -> bool {
        let Decoded { line, result } = decoded;
        let mut events = Vec::new();
        let mut turn_began = false;

        {
            let mut state = self.state();
            match result {
                Ok(InboundEnvelope::Created { battle_id }) => {
                    events.push(state.record(LogEntry::Inbound(line)));
                    tracing::info!(battle_id = %battle_id, "battle created");
                    state.battle_id = Some(battle_id.clone());
                    if state.phase == Phase::Idle {
                        state.phase = Phase::Created;
                    }
                    events.push(BattleEvent::Created { battle_id });
                }
                Ok(InboundEnvelope::Message { output }) => {
                    for text in output.lines().filter(|l| !l.trim().is_empty()) {
                        events.push(state.record(LogEntry::Inbound(text.to_string())));
                        if let Some(event) = interpret(&mut state, text) {
                            turn_began |= matches!(event, BattleEvent::TurnAdvanced(_));
                            events.push(event);
                        }
                    }
                }
                Err(error) => {
                    if !line.is_empty() {
                        events.push(state.record(LogEntry::Inbound(line.clone())));
                    }
                    events.push(state.record(LogEntry::Note(error.to_string())));
                    events.push(fault(line, error));
                }
            }
        }

        for event in &events {
            self.handlers.dispatch(event);
        }
        turn_began && self.config.auto_opponent
    }
}

fn fault(line: String, error: CodecError) -> BattleEvent {
    match error {
        CodecError::Remote(message) => {
            tracing::warn!(error = %message, "battle engine reported an error");
            BattleEvent::RemoteError(message)
        }
        e if e.is_decode() => {
            tracing::warn!(error = %e, line = %line, "skipping undecodable line");
            BattleEvent::DecodeFailed {
                line,
                error: e.to_string(),
            }
        }
        e => {
            tracing::warn!(error = %e, line = %line, "malformed envelope");
            BattleEvent::ProtocolViolation {
                line,
                error: e.to_string(),
            }
        }
    }
}

/// Parse one battle log line and run it through the tracker
fn interpret(state: &mut SessionState, text: &str) -> Option<BattleEvent> {
    let message = match parse_server_message(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, line = text, "malformed battle message");
            return Some(BattleEvent::ProtocolViolation {
                line: text.to_string(),
                error: e.to_string(),
            });
        }
    };

    match state.tracker.apply(&message) {
        Ok(event) => {
            if let Some(event) = &event {
                state.observe(event);
            }
            event
        }
        Err(TrackError::UnknownCombatant(ident)) => {
            tracing::warn!(ident = %ident, line = text, "message names an unknown combatant");
            Some(BattleEvent::UnknownCombatant {
                ident,
                line: text.to_string(),
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, line = text, "message could not be applied");
            Some(BattleEvent::ProtocolViolation {
                line: text.to_string(),
                error: e.to_string(),
            })
        }
    }
}
