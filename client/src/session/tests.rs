use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};
use tokio::time::timeout;

use catchline_battle::capture::ScriptedRolls;
use catchline_battle::{Combatant, MemoryCatalog, MoveSlot, StatTable};

use super::*;

const WAIT: Duration = Duration::from_secs(2);

/// The engine side of an in-memory connection
struct Engine {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl Engine {
    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn message(&mut self, output: &str) {
        let line = serde_json::json!({ "action": "message", "output": output }).to_string();
        self.send(&line).await;
    }

    async fn expect_line(&mut self) -> String {
        timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for a command")
            .unwrap()
            .expect("connection closed")
    }

    async fn expect_command(&mut self) -> String {
        let line = self.expect_line().await;
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["action"], "command");
        assert_eq!(value["battle_id"], "abc");
        value["command"].as_str().unwrap().to_string()
    }
}

fn rosters() -> (Roster, Roster) {
    let mut lead = Combatant::new("Foo", "pikachu", 5, StatTable::splat(50));
    lead.moves = vec![MoveSlot::new("Thunder Shock", 30), MoveSlot::new("Growl", 40)];
    let bench = Combatant::new("Bar", "eevee", 5, StatTable::splat(50));

    let mut wild = Combatant::new("Wild", "rattata", 3, StatTable::splat(40));
    wild.catch_rate = 255 / 2;
    wild.moves = vec![MoveSlot::new("Tackle", 35)];

    (
        Roster::new(vec![lead, bench]).unwrap(),
        Roster::new(vec![wild]).unwrap(),
    )
}

fn quiet_config() -> SessionConfig {
    SessionConfig {
        auto_opponent: false,
        ..SessionConfig::default()
    }
}

fn start(config: SessionConfig) -> (BattleSession, Engine) {
    let (player, opponent) = rosters();
    start_with(config, player, opponent)
}

fn start_with(config: SessionConfig, player: Roster, opponent: Roster) -> (BattleSession, Engine) {
    let (client, server) = tokio::io::duplex(16 * 1024);
    let session = BattleSession::from_stream(
        client,
        config,
        Arc::new(MemoryCatalog::default()),
        player,
        opponent,
    );
    let (read, writer) = tokio::io::split(server);
    let engine = Engine {
        lines: BufReader::new(read).lines(),
        writer,
    };
    (session, engine)
}

/// Every event except raw log lines, in dispatch order
fn events(session: &BattleSession) -> mpsc::UnboundedReceiver<BattleEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    session.subscribe_all(move |event| {
        if event.kind() != EventKind::Log {
            let _ = tx.send(event.clone());
        }
    });
    rx
}

async fn next(rx: &mut mpsc::UnboundedReceiver<BattleEvent>) -> BattleEvent {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

/// Create a battle and wait for the engine's acknowledgment
async fn created(config: SessionConfig) -> (BattleSession, Engine, mpsc::UnboundedReceiver<BattleEvent>) {
    let (session, mut engine) = start(config);
    let mut rx = events(&session);

    session.create().await.unwrap();
    assert_eq!(engine.expect_line().await, r#"{"action":"create"}"#);
    engine.send(r#"{"action":"create","battle_id":"abc"}"#).await;
    assert_eq!(
        next(&mut rx).await,
        BattleEvent::Created {
            battle_id: "abc".to_string()
        }
    );
    (session, engine, rx)
}

#[tokio::test]
async fn test_create_then_turn() {
    let (session, mut engine, mut rx) = created(quiet_config()).await;
    assert_eq!(session.phase(), Phase::Created);
    assert_eq!(session.battle_id().as_deref(), Some("abc"));

    engine.message("|turn|1").await;
    assert_eq!(next(&mut rx).await, BattleEvent::TurnAdvanced(1));
    assert_eq!(session.phase(), Phase::InProgress);
    assert_eq!(session.snapshot().turn, 1);
}

#[tokio::test]
async fn test_commands_before_create_are_not_ready() {
    let (session, mut engine) = start(quiet_config());

    assert!(matches!(session.select_move(1).await, Err(SessionError::NotReady)));
    assert!(matches!(session.start().await, Err(SessionError::NotReady)));
    assert!(matches!(session.pass().await, Err(SessionError::NotReady)));
    assert!(matches!(
        session.catch(Ball::Poke).await,
        Err(SessionError::NotReady)
    ));

    // nothing reached the wire before this
    session.create().await.unwrap();
    assert_eq!(engine.expect_line().await, r#"{"action":"create"}"#);
}

#[tokio::test]
async fn test_bad_line_does_not_stop_the_stream() {
    let (_session, mut engine, mut rx) = created(quiet_config()).await;

    engine.message("|turn|1").await;
    engine.send("{this is not json").await;
    engine.send(r#"{"action":"dance"}"#).await;
    engine.send(r#"{"error":"no such battle"}"#).await;
    engine.message("|turn|2").await;

    assert_eq!(next(&mut rx).await, BattleEvent::TurnAdvanced(1));
    assert!(matches!(
        next(&mut rx).await,
        BattleEvent::DecodeFailed { line, .. } if line == "{this is not json"
    ));
    assert!(matches!(
        next(&mut rx).await,
        BattleEvent::ProtocolViolation { .. }
    ));
    assert_eq!(
        next(&mut rx).await,
        BattleEvent::RemoteError("no such battle".to_string())
    );
    assert_eq!(next(&mut rx).await, BattleEvent::TurnAdvanced(2));
}

#[tokio::test]
async fn test_unknown_combatant_leaves_state_alone() {
    let (session, mut engine, mut rx) = created(quiet_config()).await;
    let before = session.snapshot();

    engine.message("|switch|p1a: Ghost|Gengar, L50|100/100").await;
    engine.message("|-damage|p1a: Foo|10/20").await;

    assert_eq!(
        next(&mut rx).await,
        BattleEvent::UnknownCombatant {
            ident: "Ghost".to_string(),
            line: "|switch|p1a: Ghost|Gengar, L50|100/100".to_string(),
        }
    );
    assert_eq!(before.player.health(), before.player.max_hp());

    let BattleEvent::Damaged { subject, .. } = next(&mut rx).await else {
        panic!("expected damage");
    };
    assert_eq!(subject.id.as_str(), "Foo");
    assert_eq!(session.snapshot().player.id.as_str(), "Foo");
}

#[tokio::test]
async fn test_outbound_wire_format() {
    let (session, mut engine, _rx) = created(quiet_config()).await;

    session.start().await.unwrap();
    assert_eq!(
        engine.expect_command().await,
        r#">start {"format":"nationaldexag"}"#
    );
    assert_eq!(session.phase(), Phase::Started);

    session.send_layouts().await.unwrap();
    assert_eq!(engine.expect_command().await, ">p1 team 12");
    assert_eq!(engine.expect_command().await, ">p2 team 1");

    session.send_teams().await.unwrap();
    let p1 = engine.expect_command().await;
    assert!(p1.starts_with(r#">player p1 {"name":"player","team":"pikachu|Foo|"#));
    assert!(p1.contains("]eevee|Bar|"));
    let p2 = engine.expect_command().await;
    assert!(p2.starts_with(r#">player p2 {"name":"opponent","team":"rattata|Wild|"#));

    session.select_move(2).await.unwrap();
    assert_eq!(engine.expect_command().await, ">p1 move 2");

    session.switch(&"Bar".into()).await.unwrap();
    assert_eq!(engine.expect_command().await, ">p1 switch Bar");

    session.pass().await.unwrap();
    assert_eq!(engine.expect_command().await, ">p1 pass");

    session.send_raw_command(">forcewin p1").await.unwrap();
    assert_eq!(engine.expect_command().await, ">forcewin p1");

    let outbound: Vec<String> = session
        .log()
        .into_iter()
        .filter_map(|entry| match entry {
            LogEntry::Outbound(text) => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(outbound.first().map(String::as_str), Some("create"));
    assert_eq!(outbound.last().map(String::as_str), Some(">forcewin p1"));
}

#[tokio::test]
async fn test_invalid_intents_fail_locally() {
    let (session, mut engine, _rx) = created(quiet_config()).await;

    assert!(matches!(
        session.select_move(3).await,
        Err(SessionError::InvalidIntent(IntentError::MoveOutOfRange {
            index: 3,
            available: 2
        }))
    ));
    assert!(matches!(
        session.switch(&"Foo".into()).await,
        Err(SessionError::InvalidIntent(IntentError::AlreadyActive(_)))
    ));
    assert!(matches!(
        session.switch(&"Nobody".into()).await,
        Err(SessionError::InvalidIntent(IntentError::UnknownSwitchTarget(_)))
    ));

    session.pass().await.unwrap();
    assert_eq!(engine.expect_command().await, ">p1 pass");
}

#[tokio::test]
async fn test_auto_opponent_moves_on_turn() {
    let (_session, mut engine, mut rx) = created(SessionConfig::default()).await;

    engine.message("|turn|1").await;
    assert_eq!(next(&mut rx).await, BattleEvent::TurnAdvanced(1));
    assert_eq!(engine.expect_command().await, ">p2 move 1");
}

#[tokio::test]
async fn test_catch_success_captures() {
    let (session, mut engine, mut rx) = created(quiet_config()).await;

    let outcome = session
        .catch_with(Ball::Great, &mut ScriptedRolls::new([0, 0, 0, 0]))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CaptureOutcome {
            success: true,
            shakes: 4
        }
    );
    assert_eq!(
        next(&mut rx).await,
        BattleEvent::Catch {
            success: true,
            ball: Ball::Great,
            shakes: 4
        }
    );
    assert_eq!(engine.expect_command().await, ">capture p2a");
}

#[tokio::test]
async fn test_catch_escape_passes() {
    let (session, mut engine, mut rx) = created(quiet_config()).await;

    let outcome = session
        .catch_with(Ball::Poke, &mut ScriptedRolls::new([0, 65535]))
        .await
        .unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.shakes, 1);
    assert!(matches!(
        next(&mut rx).await,
        BattleEvent::Catch { success: false, shakes: 1, .. }
    ));
    assert_eq!(engine.expect_command().await, ">p1 pass");
}

#[tokio::test]
async fn test_trainer_battle_refuses_capture() {
    let config = SessionConfig {
        encounter: Encounter::Trainer,
        ..quiet_config()
    };
    let (session, mut engine, _rx) = created(config).await;

    assert!(matches!(
        session.catch(Ball::Master).await,
        Err(SessionError::TrainerBattle)
    ));
    assert!(
        !session
            .log()
            .iter()
            .any(|entry| entry.text().contains("capture"))
    );

    session.pass().await.unwrap();
    assert_eq!(engine.expect_command().await, ">p1 pass");
}

#[tokio::test]
async fn test_win_ends_battle() {
    let (session, mut engine, mut rx) = created(quiet_config()).await;

    engine.message("|turn|1\n|win|player").await;
    assert_eq!(next(&mut rx).await, BattleEvent::TurnAdvanced(1));
    assert_eq!(
        next(&mut rx).await,
        BattleEvent::Ended {
            won: true,
            winner: "player".to_string()
        }
    );
    assert_eq!(session.phase(), Phase::Ended);

    // still connected until the caller says otherwise
    session.pass().await.unwrap();
    assert_eq!(engine.expect_command().await, ">p1 pass");
}

#[tokio::test]
async fn test_engine_hangup_is_connection_lost() {
    let (session, engine, mut rx) = created(quiet_config()).await;
    drop(engine);

    assert!(matches!(
        next(&mut rx).await,
        BattleEvent::ConnectionLost(_)
    ));
    assert_eq!(session.phase(), Phase::Disconnected);
    assert!(matches!(
        session.select_move(1).await,
        Err(SessionError::ConnectionLost)
    ));
    assert!(matches!(
        session.create().await,
        Err(SessionError::ConnectionLost)
    ));
}

#[tokio::test]
async fn test_disconnect() {
    let (session, _engine, mut rx) = created(quiet_config()).await;

    session.disconnect().await.unwrap();
    assert!(matches!(
        next(&mut rx).await,
        BattleEvent::ConnectionLost(_)
    ));
    assert_eq!(session.phase(), Phase::Disconnected);
    session.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_channel_by_kind() {
    let (session, mut engine, _rx) = created(quiet_config()).await;
    let mut turns = session.channel(EventKind::TurnAdvanced);

    engine.message("|move|p1a: Foo|Growl|p2a: Wild").await;
    engine.message("|turn|7").await;

    assert_eq!(next(&mut turns).await, BattleEvent::TurnAdvanced(7));
}

#[tokio::test]
async fn test_command_logged_before_immediate_reply() {
    let (session, mut engine) = start(quiet_config());
    let mut rx = events(&session);

    let replier = tokio::spawn(async move {
        let line = engine.expect_line().await;
        engine.send(r#"{"action":"create","battle_id":"abc"}"#).await;
        (line, engine)
    });

    session.create().await.unwrap();
    assert!(matches!(next(&mut rx).await, BattleEvent::Created { .. }));
    let (line, _engine) = replier.await.unwrap();
    assert_eq!(line, r#"{"action":"create"}"#);

    let log = session.log();
    let sent = log
        .iter()
        .position(|entry| *entry == LogEntry::Outbound("create".to_string()))
        .expect("create not logged");
    let ack = log
        .iter()
        .position(|entry| matches!(entry, LogEntry::Inbound(line) if line.contains("abc")))
        .expect("ack not logged");
    assert!(sent < ack, "{log:?}");
}

#[tokio::test]
async fn test_oversized_line_is_skipped() {
    let config = SessionConfig {
        max_line_bytes: 64,
        ..quiet_config()
    };
    let (_session, mut engine, mut rx) = created(config).await;

    engine.message(&format!("|c|opponent|{}", "a".repeat(200))).await;
    engine.message("|turn|1").await;

    assert!(matches!(
        next(&mut rx).await,
        BattleEvent::DecodeFailed { line, .. } if line.is_empty()
    ));
    assert_eq!(next(&mut rx).await, BattleEvent::TurnAdvanced(1));
}

#[tokio::test]
async fn test_dropping_session_closes_transport() {
    let (session, mut engine) = start(quiet_config());
    let other = session.clone();

    drop(session);
    session_still_open(&other, &mut engine).await;

    drop(other);
    let closed = timeout(WAIT, engine.lines.next_line())
        .await
        .expect("transport left open after the session was dropped");
    assert!(matches!(closed, Ok(None)));
}

async fn session_still_open(session: &BattleSession, engine: &mut Engine) {
    session.create().await.unwrap();
    assert_eq!(engine.expect_line().await, r#"{"action":"create"}"#);
}

#[tokio::test]
async fn test_layout_leads_with_first_healthy_member() {
    let (player, opponent) = rosters();
    let mut members = player.members().to_vec();
    members[0].set_health(0);
    let player = Roster::new(members).unwrap();

    let (session, mut engine) = start_with(quiet_config(), player, opponent);
    let mut rx = events(&session);
    session.create().await.unwrap();
    engine.expect_line().await;
    engine.send(r#"{"action":"create","battle_id":"abc"}"#).await;
    assert!(matches!(next(&mut rx).await, BattleEvent::Created { .. }));

    session.send_teams().await.unwrap();
    let p1 = engine.expect_command().await;
    assert!(p1.starts_with(r#">player p1 {"name":"player","team":"pikachu|Foo|"#));
    engine.expect_command().await;

    session.send_layouts().await.unwrap();
    assert_eq!(engine.expect_command().await, ">p1 team 21");
    assert_eq!(engine.expect_command().await, ">p2 team 1");
    assert_eq!(session.snapshot().player.id.as_str(), "Bar");
}
