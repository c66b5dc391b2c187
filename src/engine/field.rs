//! Tile field: spawn, advance, retire
//!
//! Rows fall at the speed the clock dictates, leave through the bottom,
//! and are replaced from the top one at a time. Per-tick order is
//! advance -> retire -> spawn so a retired slot and a fresh spawn can't
//! collide within one frame.

use super::state::{GameState, TileRow, TileStatus};
use crate::consts::*;

/// Move every row down by `speed * dt`
pub fn advance(rows: &mut [TileRow], speed: f32, dt: f32) {
    for row in rows.iter_mut() {
        row.y += speed * dt;
    }
}

/// Drop rows that have fully left the field (past the retire margin)
pub fn retire_offscreen(rows: &mut Vec<TileRow>) {
    rows.retain(|row| row.y <= FIELD_HEIGHT + RETIRE_MARGIN);
}

/// Spawn a single row above the field when the leading edge has entered
/// the visible area (or the field is empty). Returns the new row's id.
///
/// Never spawns more than one row per call; spacing stays at exactly one
/// tile height, which keeps hit-testing unambiguous.
pub fn spawn_if_needed(state: &mut GameState) -> Option<u32> {
    let topmost_y = state.tile_rows.iter().map(|r| r.y).reduce(f32::min);

    let spawn_y = match topmost_y {
        None => -TILE_HEIGHT,
        Some(y) if y >= 0.0 => y - TILE_HEIGHT,
        Some(_) => return None,
    };

    let id = state.next_tile_id();
    let active_column = state.random_column();
    state.tile_rows.insert(
        0,
        TileRow {
            id,
            y: spawn_y,
            active_column,
            status: TileStatus::Pending,
        },
    );
    Some(id)
}
