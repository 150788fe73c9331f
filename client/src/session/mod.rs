//! The battle session: one connection, one battle

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use catchline_battle::capture::{RngRolls, ShakeRoll};
use catchline_battle::{
    Ball, BattleEvent, CaptureInput, CaptureOutcome, Catalog, CatchContext, CombatantId,
    EventKind, Player, Roster, Status, Tracker, attempt_capture, choose_opponent_move,
};
use catchline_protocol::{ClientCommand, OutboundEnvelope, PlayerSpec};
use catchline_team::{pack_team, team_layout};

use crate::config::{Encounter, SessionConfig};
use crate::connection::{self, Connection};
use crate::error::{IntentError, SessionError};
use crate::handler::{Handler, Handlers, SubscriptionId};
use crate::intent;
use crate::log::LogEntry;
use crate::receiver;
use crate::state::{Phase, SessionState, Snapshot};

#[cfg(test)]
mod tests;

/// State shared between the public handle and the read loop
pub(crate) struct Shared {
    pub(crate) config: SessionConfig,
    catalog: Arc<dyn Catalog>,
    connection: Connection,
    state: Mutex<SessionState>,
    pub(crate) handlers: Handlers,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    /// Never held across an `.await` or while handlers run
    pub(crate) fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, events: &[BattleEvent]) {
        for event in events {
            self.handlers.dispatch(event);
        }
    }

    /// Encode a battle command and send it under the assigned battle id
    async fn send_command(&self, command: ClientCommand) -> Result<(), SessionError> {
        let battle_id = self.state().command_target()?;
        let text = command.to_protocol_string();
        let envelope = OutboundEnvelope::command(text.clone(), battle_id);
        self.transmit(&envelope, text).await
    }

    /// The command is logged before it hits the wire, so a reply can never
    /// appear ahead of it in the log
    async fn transmit(&self, envelope: &OutboundEnvelope, text: String) -> Result<(), SessionError> {
        let logged = || {
            let event = self.state().record(LogEntry::Outbound(text.clone()));
            self.emit(&[event]);
        };
        if let Err(e) = self.connection.send(envelope, logged).await {
            if let SessionError::Io(io) = &e {
                tracing::error!(error = %io, command = %text, "failed to write to battle engine");
                self.disconnected(io.to_string());
            }
            return Err(e);
        }
        tracing::debug!(command = %text, "sent");
        Ok(())
    }

    /// Move to `Disconnected` once and tell every subscriber
    pub(crate) fn disconnected(&self, reason: String) {
        let events = {
            let mut state = self.state();
            if state.phase == Phase::Disconnected {
                return;
            }
            state.phase = Phase::Disconnected;
            let note = state.record(LogEntry::Note(format!("disconnected: {reason}")));
            [note, BattleEvent::ConnectionLost(reason)]
        };
        self.emit(&events);
    }

    /// Pick and send the opponent's move for the turn that just began
    pub(crate) async fn opponent_turn(&self) {
        let choice = {
            let state = self.state();
            let opponent = state.tracker.active(Player::P2);
            if state.tracker.is_ended() || opponent.is_fainted() {
                return;
            }
            choose_opponent_move(opponent, self.catalog.as_ref(), &mut rand::thread_rng())
        };

        match choice {
            Some(index) => {
                let command = ClientCommand::Move {
                    player: Player::P2,
                    index,
                };
                if let Err(e) = self.send_command(command).await {
                    tracing::warn!(error = %e, "failed to send opponent move");
                }
            }
            None => tracing::debug!("opponent has no usable move"),
        }
    }
}

impl Drop for Shared {
    /// The read loop only holds a weak reference, so it would otherwise sit on
    /// the transport until the engine sends something
    fn drop(&mut self) {
        let reader = self
            .reader
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reader) = reader {
            tracing::debug!("session dropped, stopping read loop");
            reader.abort();
        }
    }
}

/// Handle to a running battle session
///
/// Cheap to clone; every clone drives the same connection. Events are delivered
/// on the session's read loop task, in the order the engine sent the lines.
/// Dropping the last clone stops the read loop and closes the transport.
///
/// ```ignore
/// let session = BattleSession::connect(config, catalog, player, opponent).await?;
/// session.subscribe(EventKind::TurnAdvanced, |event| println!("{event:?}"));
/// session.create().await?;
/// ```
#[derive(Clone)]
pub struct BattleSession {
    shared: Arc<Shared>,
}

impl BattleSession {
    /// Connect to the engine at `config.host:config.port`
    pub async fn connect(
        config: SessionConfig,
        catalog: Arc<dyn Catalog>,
        player: Roster,
        opponent: Roster,
    ) -> anyhow::Result<Self> {
        let stream = connection::open(&config.address()).await?;
        Ok(Self::from_stream(stream, config, catalog, player, opponent))
    }

    /// Run a session over any byte stream; spawns the read loop on the current runtime
    pub fn from_stream<S>(
        stream: S,
        config: SessionConfig,
        catalog: Arc<dyn Catalog>,
        player: Roster,
        opponent: Roster,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (connection, reader) = Connection::split(stream);
        let tracker = Tracker::new(
            Arc::clone(&catalog),
            player,
            opponent,
            config.player_name.clone(),
        );
        let shared = Arc::new(Shared {
            config,
            catalog,
            connection,
            state: Mutex::new(SessionState::new(tracker)),
            handlers: Handlers::default(),
            reader: Mutex::new(None),
        });

        let task = tokio::spawn(receiver::run(
            reader,
            Arc::downgrade(&shared),
            shared.config.max_line_bytes,
        ));
        *shared.reader.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);

        Self { shared }
    }

    /// Ask the engine for a new battle; the id arrives as a `Created` event
    pub async fn create(&self) -> Result<(), SessionError> {
        if self.phase() == Phase::Disconnected {
            return Err(SessionError::ConnectionLost);
        }
        tracing::info!("requesting a new battle");
        self.shared
            .transmit(&OutboundEnvelope::create(), "create".to_string())
            .await
    }

    pub async fn start(&self) -> Result<(), SessionError> {
        let command = ClientCommand::Start {
            format: self.shared.config.format.clone(),
        };
        self.shared.send_command(command).await?;

        let mut state = self.shared.state();
        if state.phase == Phase::Created {
            state.phase = Phase::Started;
        }
        Ok(())
    }

    /// Submit both packed teams under the configured names
    pub async fn send_teams(&self) -> Result<(), SessionError> {
        let (player_team, opponent_team) = {
            let state = self.shared.state();
            state.command_target()?;
            let tracker = &state.tracker;
            (
                pack_team(tracker.roster(Player::P1).members()).map_err(IntentError::from)?,
                pack_team(tracker.roster(Player::P2).members()).map_err(IntentError::from)?,
            )
        };

        let config = &self.shared.config;
        for (player, name, team) in [
            (Player::P1, &config.player_name, player_team),
            (Player::P2, &config.opponent_name, opponent_team),
        ] {
            let spec = PlayerSpec {
                name: name.clone(),
                team,
            };
            self.shared
                .send_command(ClientCommand::Player { player, spec })
                .await?;
        }
        Ok(())
    }

    /// Lead with each side's active member, the rest in roster order
    pub async fn send_layouts(&self) -> Result<(), SessionError> {
        let layouts = {
            let state = self.shared.state();
            state.command_target()?;
            [Player::P1, Player::P2].map(|player| {
                let roster = state.tracker.roster(player);
                (player, team_layout(roster.len(), roster.active_index()))
            })
        };

        for (player, order) in layouts {
            let command = ClientCommand::TeamOrder { player, order };
            self.shared.send_command(command).await?;
        }
        Ok(())
    }

    /// `index` is 1-based
    pub async fn select_move(&self, index: usize) -> Result<(), SessionError> {
        {
            let state = self.shared.state();
            state.command_target()?;
            intent::check_move(state.tracker.roster(Player::P1), index)?;
        }
        self.shared
            .send_command(ClientCommand::Move {
                player: Player::P1,
                index,
            })
            .await
    }

    pub async fn switch(&self, id: &CombatantId) -> Result<(), SessionError> {
        {
            let state = self.shared.state();
            state.command_target()?;
            intent::check_switch(state.tracker.roster(Player::P1), id)?;
        }
        self.shared
            .send_command(ClientCommand::Switch {
                player: Player::P1,
                ident: id.to_string(),
            })
            .await
    }

    /// Throw a ball at the opposing active combatant
    pub async fn catch(&self, ball: Ball) -> Result<CaptureOutcome, SessionError> {
        let mut rolls = RngRolls(StdRng::from_entropy());
        self.catch_with(ball, &mut rolls).await
    }

    /// [`Self::catch`] with an explicit source of shake draws.
    ///
    /// The `Catch` event is raised before `>capture p2a` (success) or
    /// `>p1 pass` (escape) is sent.
    pub async fn catch_with(
        &self,
        ball: Ball,
        rolls: &mut impl ShakeRoll,
    ) -> Result<CaptureOutcome, SessionError> {
        let config = &self.shared.config;
        if config.encounter == Encounter::Trainer {
            return Err(SessionError::TrainerBattle);
        }

        let (outcome, events) = {
            let mut state = self.shared.state();
            state.command_target()?;

            let tracker = &state.tracker;
            let attacker = tracker.active(Player::P1);
            let target = tracker.active(Player::P2);
            let context = CatchContext {
                turn: tracker.turn(),
                terrain: config.terrain,
            };
            let input = CaptureInput {
                attacker_max_hp: attacker.max_hp(),
                target_hp: target.health(),
                target_max_hp: target.max_hp(),
                catch_rate: target.catch_rate,
                ball_modifier: ball.modifier(&context),
                status_modifier: Status::capture_modifier(target.status),
                rate_multiplier: config.catch_rate_multiplier,
                turn: context.turn,
            };
            let outcome = attempt_capture(&input, rolls);

            tracing::info!(
                %ball,
                success = outcome.success,
                shakes = outcome.shakes,
                "capture attempt"
            );
            let note = state.record(LogEntry::Note(format!(
                "threw a {ball}: {} shake(s), {}",
                outcome.shakes,
                if outcome.success { "caught" } else { "broke free" }
            )));
            let event = BattleEvent::Catch {
                success: outcome.success,
                ball,
                shakes: outcome.shakes,
            };
            (outcome, [note, event])
        };
        self.shared.emit(&events);

        let command = if outcome.success {
            ClientCommand::Capture { target: Player::P2 }
        } else {
            ClientCommand::Pass { player: Player::P1 }
        };
        self.shared.send_command(command).await?;
        Ok(outcome)
    }

    pub async fn pass(&self) -> Result<(), SessionError> {
        self.shared
            .send_command(ClientCommand::Pass { player: Player::P1 })
            .await
    }

    /// Send command text as is, under the current battle id
    pub async fn send_raw_command(&self, command: impl Into<String>) -> Result<(), SessionError> {
        self.shared
            .send_command(ClientCommand::Raw(command.into()))
            .await
    }

    /// Stop the read loop and close the connection
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        let reader = self
            .shared
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reader) = reader {
            reader.abort();
        }
        if self.phase() == Phase::Disconnected {
            return Ok(());
        }

        tracing::info!(battle_id = ?self.battle_id(), "disconnecting");
        let result = self.shared.connection.shutdown().await;
        self.shared.disconnected("closed by client".to_string());
        result.map_err(SessionError::from)
    }

    /// Run `handler` for every event of `kind`
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&BattleEvent) + Send + Sync + 'static,
    {
        self.shared.handlers.subscribe(kind, Arc::new(handler))
    }

    /// Run `handler` for every event
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&BattleEvent) + Send + Sync + 'static,
    {
        self.shared.handlers.subscribe_all(Arc::new(handler))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.handlers.unsubscribe(id)
    }

    /// Events of `kind`, forwarded to a channel the caller drains at its own pace
    pub fn channel(&self, kind: EventKind) -> mpsc::UnboundedReceiver<BattleEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let forward: Handler = Arc::new(move |event: &BattleEvent| {
            let _ = tx.send(event.clone());
        });
        self.shared.handlers.subscribe(kind, forward);
        rx
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.state().snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.shared.state().phase
    }

    pub fn battle_id(&self) -> Option<String> {
        self.shared.state().battle_id.clone()
    }

    /// Every inbound line, outbound command and local note so far
    pub fn log(&self) -> Vec<LogEntry> {
        self.shared.state().log.entries().to_vec()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }
}
