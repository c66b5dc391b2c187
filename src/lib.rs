//! Melody Tiles - a falling-tiles rhythm game
//!
//! Core modules:
//! - `engine`: Deterministic gameplay core (tile field, hit resolution, progression)
//! - `view`: Read-only projection of tile state to visual classes
//! - `audio`: Note playback engines (wasm only)
//! - `haptics`: Best-effort vibration cues (wasm only)
//! - `settings`: Player preferences
//! - `highscores`: Local leaderboard

pub mod engine;
pub mod highscores;
pub mod settings;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod haptics;

pub use highscores::HighScores;
pub use settings::{AudioEngineKind, Settings};

/// Game configuration constants
pub mod consts {
    /// Number of tap columns across the play field
    pub const COLUMN_COUNT: u8 = 4;
    /// Height of one tile row (px)
    pub const TILE_HEIGHT: f32 = 80.0;
    /// Visible play field height (px)
    pub const FIELD_HEIGHT: f32 = 640.0;
    /// Extra distance past the field bottom before a row is retired
    /// (one tile height so rows fully exit the visible area first)
    pub const RETIRE_MARGIN: f32 = 80.0;

    /// Fall speed at session start (px/s)
    pub const BASE_FALL_SPEED: f32 = 200.0;
    /// Seconds between speed-ramp steps
    pub const SPEED_STEP_SECS: f64 = 10.0;
    /// Speed multiplier gained per ramp step (+20%)
    pub const SPEED_STEP_FACTOR: f32 = 0.2;

    /// Score awarded per successful tap
    pub const SCORE_PER_HIT: u32 = 10;
    /// Lives at session start
    pub const START_LIVES: u8 = 1;
}

/// Width of one column for a field of the given total width
#[inline]
pub fn column_width(field_width: f32) -> f32 {
    field_width / consts::COLUMN_COUNT as f32
}
