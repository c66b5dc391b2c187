//! Deterministic game engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time arrives as explicit frame timestamps, never read from a clock
//! - Seeded RNG only
//! - No rendering or platform dependencies
//! - State mutates only through the transition functions in `resolve`,
//!   `tick` and the `GameState` methods

pub mod clock;
pub mod field;
pub mod input;
pub mod melody;
pub mod resolve;
pub mod state;
pub mod tick;

pub use clock::FrameClock;
pub use input::{FieldRect, TapPoint, map_pointer};
pub use resolve::{TapOutcome, resolve_tap};
pub use state::{GameEvent, GameState, GameStatus, Haptic, TileRow, TileStatus};
pub use tick::tick;
