//! Game state and progression
//!
//! `GameState` is the single source of truth for a session. Nothing outside
//! the engine mutates it; the shell reads it once per frame to draw and
//! drains the event queue to drive audio/haptics.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::melody;
use crate::consts::*;

/// Interaction state of a tile row. One-way: `Pending` transitions at most
/// once to `Tapped` or `Missed`, then the row is immutable until retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileStatus {
    Pending,
    Tapped,
    Missed,
}

/// Overall session status. `Playing` is the only state in which the loop
/// advances and taps are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Mounted, waiting for the first interaction
    Idle,
    /// Active gameplay
    Playing,
    /// Externally paused (tab hidden, menu open)
    Paused,
    /// Lives exhausted
    GameOver,
    /// Melody fully reconstructed
    Won,
}

/// Haptic cue intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    Light,
    Medium,
    Heavy,
}

/// Side effects produced by state transitions, drained by the shell.
/// Dispatch failures never feed back into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Sound a note on the active audio engine
    PlayNote(&'static str),
    /// Fire a haptic cue
    Haptic(Haptic),
    /// Difficulty/timbre tier changed (new level)
    LevelChanged(u8),
    /// The full melody was played through
    MelodyCompleted,
    /// Lives reached zero
    GameOver,
}

/// One horizontal slice of the play field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileRow {
    /// Unique, monotonically increasing, never reused
    pub id: u32,
    /// Offset of the row's top edge from the field top (px); only grows
    pub y: f32,
    /// The column holding the tappable tile
    pub active_column: u8,
    pub status: TileStatus,
}

impl TileRow {
    /// Whether a field-relative y coordinate lands in this row's band
    pub fn band_contains(&self, y: f32) -> bool {
        y >= self.y && y <= self.y + TILE_HEIGHT
    }
}

fn unseeded_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed (spawn columns are deterministic per seed)
    pub seed: u64,
    #[serde(skip, default = "unseeded_rng")]
    rng: Pcg32,
    /// Remaining lives; 0 means the run is over
    pub lives: u8,
    pub score: u32,
    pub status: GameStatus,
    /// Cursor into the fallback note cycle (used once the melody is done)
    pub note_index: usize,
    /// Cursor into the primary melody
    pub melody_index: usize,
    pub melody_completed: bool,
    /// Difficulty/timbre tier (1..=3); never regresses within a session
    pub current_level: u8,
    /// Times the full melody has been played through
    pub completed_melodies: u32,
    /// Live rows, ordered top to bottom (newest spawn first)
    pub tile_rows: Vec<TileRow>,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_id: u32,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

/// The deterministic opening layout: seven rows filling the field,
/// spaced one tile height apart.
fn seed_rows() -> Vec<TileRow> {
    const SEED_COLUMNS: [u8; 7] = [0, 1, 3, 2, 1, 0, 0];
    SEED_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, &col)| TileRow {
            id: i as u32 + 1,
            y: i as f32 * TILE_HEIGHT,
            active_column: col,
            status: TileStatus::Pending,
        })
        .collect()
}

impl GameState {
    /// Create a fresh session in `Idle`, with the seed row layout in place
    pub fn new(seed: u64) -> Self {
        let rows = seed_rows();
        let next_id = rows.len() as u32 + 1;
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            lives: START_LIVES,
            score: 0,
            status: GameStatus::Idle,
            note_index: 0,
            melody_index: 0,
            melody_completed: false,
            current_level: 1,
            completed_melodies: 0,
            tile_rows: rows,
            time_ticks: 0,
            next_id,
            events: Vec::new(),
        }
    }

    /// Begin play from `Idle`
    pub fn start(&mut self) {
        if self.status == GameStatus::Idle {
            self.status = GameStatus::Playing;
        }
    }

    /// External pause (tab hidden, menu). Only valid while `Playing`.
    pub fn pause(&mut self) {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Paused;
        }
    }

    /// Resume from `Paused`
    pub fn resume(&mut self) {
        if self.status == GameStatus::Paused {
            self.status = GameStatus::Playing;
        }
    }

    /// Continue past a win; the fallback note cycle takes over from here
    /// and no further `Won` transitions occur.
    pub fn keep_playing(&mut self) {
        if self.status == GameStatus::Won {
            self.status = GameStatus::Playing;
        }
    }

    /// Restore the identical initial state (seed row layout, lives, score,
    /// cursors) and go straight to `Playing`. Valid from any state.
    pub fn reset(&mut self, seed: u64) {
        *self = Self::new(seed);
        self.status = GameStatus::Playing;
    }

    /// Allocate a row id
    pub(crate) fn next_tile_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uniformly random spawn column
    pub(crate) fn random_column(&mut self) -> u8 {
        self.rng.random_range(0..COLUMN_COUNT)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Melody phrase boundaries fully crossed so far
    pub fn completed_phrases(&self) -> usize {
        self.melody_index / melody::PHRASE_LEN
    }
}
