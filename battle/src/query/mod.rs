//! Query helpers for battle decision making

mod move_choice;

pub use move_choice::{SHUFFLE_CHANCE, choose_opponent_move, effective_power};
