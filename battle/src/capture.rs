//! Capture rate calculation with simulated ball shakes
//!
//! `a = ((3 * max - 2 * current) * rate * ball * status) / (3 * max)`, scaled by a
//! global multiplier. At 255 or more the catch is certain; otherwise each of up to
//! four shakes passes when a uniform draw in `[0, 65535]` is below
//! `b = 1048560 / sqrt(sqrt(16711680 / a))`.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MAX_SHAKES: u8 = 4;
const ROLL_MAX: u32 = 65535;

/// Where the wild encounter happens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Grass,
    Fishing,
}

/// Battle facts a ball may take into account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchContext {
    pub turn: u32,
    pub terrain: Terrain,
}

type BallStrategy = fn(&CatchContext) -> f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ball {
    Poke,
    Great,
    Ultra,
    Master,
    Quick,
    Dive,
}

fn flat<const TENTHS: u32>(_: &CatchContext) -> f64 {
    f64::from(TENTHS) / 10.0
}

fn quick(ctx: &CatchContext) -> f64 {
    if ctx.turn == 1 { 5.0 } else { 1.0 }
}

fn dive(ctx: &CatchContext) -> f64 {
    if ctx.terrain == Terrain::Fishing {
        3.5
    } else {
        1.0
    }
}

/// Ball kind, packed-set id and modifier strategy
const BALLS: [(Ball, &str, BallStrategy); 6] = [
    (Ball::Poke, "pokeball", flat::<10>),
    (Ball::Great, "greatball", flat::<15>),
    (Ball::Ultra, "ultraball", flat::<20>),
    (Ball::Master, "masterball", flat::<2550>),
    (Ball::Quick, "quickball", quick),
    (Ball::Dive, "diveball", dive),
];

impl Ball {
    pub const ALL: [Ball; 6] = [
        Ball::Poke,
        Ball::Great,
        Ball::Ultra,
        Ball::Master,
        Ball::Quick,
        Ball::Dive,
    ];

    fn entry(&self) -> &'static (Ball, &'static str, BallStrategy) {
        // every variant has exactly one row
        &BALLS[*self as usize]
    }

    /// Catch-rate multiplier for this ball in the given situation
    pub fn modifier(&self, ctx: &CatchContext) -> f64 {
        (self.entry().2)(ctx)
    }

    pub fn id(&self) -> &'static str {
        self.entry().1
    }

    pub fn from_id(id: &str) -> Option<Self> {
        BALLS
            .iter()
            .find(|(_, name, _)| name.eq_ignore_ascii_case(id.trim()))
            .map(|(ball, _, _)| *ball)
    }
}

impl std::fmt::Display for Ball {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Source of shake draws, uniform in `[0, 65535]`
pub trait ShakeRoll {
    fn roll(&mut self) -> u32;
}

/// Draws from any `rand` generator
#[derive(Debug, Clone)]
pub struct RngRolls<R: Rng>(pub R);

impl<R: Rng> ShakeRoll for RngRolls<R> {
    fn roll(&mut self) -> u32 {
        self.0.gen_range(0..=ROLL_MAX)
    }
}

/// Fixed sequence of draws; once exhausted every draw fails its shake
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls(VecDeque<u32>);

impl ScriptedRolls {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self(rolls.into_iter().collect())
    }
}

impl ShakeRoll for ScriptedRolls {
    fn roll(&mut self) -> u32 {
        self.0.pop_front().unwrap_or(ROLL_MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureInput {
    pub attacker_max_hp: u32,
    pub target_hp: u32,
    pub target_max_hp: u32,
    pub catch_rate: u8,
    pub ball_modifier: f64,
    pub status_modifier: f64,
    /// Global tuning knob applied to `a`
    pub rate_multiplier: f64,
    pub turn: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub success: bool,
    /// Shakes passed before the first failure (0..=4)
    pub shakes: u8,
}

impl CaptureOutcome {
    const CERTAIN: Self = Self {
        success: true,
        shakes: MAX_SHAKES,
    };
    const ESCAPED: Self = Self {
        success: false,
        shakes: 0,
    };
}

/// The modified catch rate `a`; 0 when the target has no health pool
pub fn catch_value(input: &CaptureInput) -> f64 {
    if input.target_max_hp == 0 {
        return 0.0;
    }
    let max = f64::from(input.target_max_hp);
    let current = f64::from(input.target_hp.min(input.target_max_hp));
    let a = ((3.0 * max - 2.0 * current)
        * f64::from(input.catch_rate)
        * input.ball_modifier
        * input.status_modifier)
        / (3.0 * max);
    a * input.rate_multiplier
}

/// Shake threshold `b` for a catch value below 255
pub fn shake_threshold(a: f64) -> f64 {
    1_048_560.0 / (16_711_680.0 / a).sqrt().sqrt()
}

pub fn attempt_capture(input: &CaptureInput, rolls: &mut impl ShakeRoll) -> CaptureOutcome {
    if input.catch_rate == u8::MAX && input.ball_modifier >= 1.0 {
        return CaptureOutcome::CERTAIN;
    }

    let a = catch_value(input);
    tracing::debug!(
        a,
        turn = input.turn,
        attacker_max_hp = input.attacker_max_hp,
        "capture attempt"
    );
    if a >= 255.0 {
        return CaptureOutcome::CERTAIN;
    }
    if a.is_nan() || a <= 0.0 {
        return CaptureOutcome::ESCAPED;
    }

    let b = shake_threshold(a);
    let mut shakes = 0;
    while shakes < MAX_SHAKES && f64::from(rolls.roll()) < b {
        shakes += 1;
    }

    CaptureOutcome {
        success: shakes == MAX_SHAKES,
        shakes,
    }
}
