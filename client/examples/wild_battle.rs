//! Wild Battle Example
//!
//! Connects to a local battle engine, fights a wild Rattata for a turn and then
//! throws balls until it is caught, breaks free for good, or the battle ends.
//!
//! Set CATCHLINE_CATALOG to a catalog JSON file to use real data.

use std::sync::Arc;

use anyhow::{Context, Result};
use catchline_battle::{Catalog, Combatant, MemoryCatalog, Roster};
use catchline_client::{Ball, BattleEvent, BattleSession, EventKind, SessionConfig};

const BUILTIN_CATALOG: &str = r#"{
    "species": [
        {"id": "pikachu", "name": "Pikachu", "types": ["Electric"], "catch_rate": 190,
         "base_stats": {"hp": 35, "atk": 55, "def": 40, "spa": 50, "spd": 50, "spe": 90},
         "abilities": ["Static"]},
        {"id": "rattata", "name": "Rattata", "types": ["Normal"], "catch_rate": 255,
         "base_stats": {"hp": 30, "atk": 56, "def": 35, "spa": 25, "spd": 35, "spe": 72},
         "abilities": ["Run Away"]}
    ],
    "moves": [
        {"id": "thundershock", "name": "Thunder Shock", "type": "Electric", "power": 40, "pp": 30},
        {"id": "tackle", "name": "Tackle", "type": "Normal", "power": 40, "pp": 35},
        {"id": "tailwhip", "name": "Tail Whip", "type": "Normal", "pp": 30}
    ]
}"#;

fn load_catalog() -> Result<MemoryCatalog> {
    let json = match std::env::var("CATCHLINE_CATALOG") {
        Ok(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        Err(_) => BUILTIN_CATALOG.to_string(),
    };
    MemoryCatalog::from_json(&json).context("parsing catalog")
}

fn spawn(catalog: &MemoryCatalog, species: &str, level: u8, moves: &[&str]) -> Result<Combatant> {
    let data = catalog
        .species(species)
        .with_context(|| format!("unknown species {species}"))?;
    let moves = moves
        .iter()
        .map(|m| catalog.move_data(m).with_context(|| format!("unknown move {m}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(Combatant::spawn(data, level, &moves))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let catalog = load_catalog()?;
    let player = Roster::new(vec![spawn(&catalog, "pikachu", 10, &["thundershock"])?])?;
    let opponent = Roster::new(vec![spawn(&catalog, "rattata", 4, &["tackle", "tailwhip"])?])?;

    let session = BattleSession::connect(
        SessionConfig::default(),
        Arc::new(catalog),
        player,
        opponent,
    )
    .await?;

    session.subscribe(EventKind::Log, |event| {
        if let BattleEvent::Log(line) = event {
            println!("{line}");
        }
    });
    let mut created = session.channel(EventKind::Created);
    let mut turns = session.channel(EventKind::TurnAdvanced);
    let mut ended = session.channel(EventKind::Ended);
    let mut lost = session.channel(EventKind::ConnectionLost);

    session.create().await?;
    created.recv().await.context("no battle created")?;
    session.start().await?;
    session.send_teams().await?;
    session.send_layouts().await?;

    loop {
        tokio::select! {
            Some(BattleEvent::TurnAdvanced(turn)) = turns.recv() => {
                if turn == 1 {
                    session.select_move(1).await?;
                    continue;
                }
                let outcome = session.catch(Ball::Poke).await?;
                println!("ball shook {} time(s)", outcome.shakes);
            }
            Some(event) = ended.recv() => {
                println!("{event:?}");
                break;
            }
            Some(event) = lost.recv() => {
                println!("{event:?}");
                return Ok(());
            }
            else => break,
        }
    }

    session.disconnect().await?;
    Ok(())
}
