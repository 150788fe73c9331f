//! Battle state tracking from server messages

mod tracker;
mod updater;

pub use tracker::Tracker;
