//! Per-frame simulation step
//!
//! One call per host frame callback while the session is live. The tick
//! runs advance -> retire -> spawn in that order and nothing else; input
//! resolution happens separately (and never concurrently, the host is
//! single-threaded per frame).

use super::field;
use super::state::{GameState, GameStatus};

/// Advance the field by one frame. No-op unless `Playing`.
pub fn tick(state: &mut GameState, dt: f32, speed: f32) {
    if state.status != GameStatus::Playing {
        return;
    }

    field::advance(&mut state.tile_rows, speed, dt);
    field::retire_offscreen(&mut state.tile_rows);
    field::spawn_if_needed(state);

    state.time_ticks += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start();
        state
    }

    #[test]
    fn test_tick_advances_rows() {
        let mut state = playing_state(3);
        let y_before: Vec<f32> = state.tile_rows.iter().map(|r| r.y).collect();
        tick(&mut state, 0.1, 200.0);
        for (row, y0) in state.tile_rows.iter().rev().zip(y_before.iter().rev()) {
            assert_eq!(row.y, y0 + 20.0);
        }
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_tick_noop_unless_playing() {
        for status in [
            GameStatus::Idle,
            GameStatus::Paused,
            GameStatus::GameOver,
            GameStatus::Won,
        ] {
            let mut state = GameState::new(3);
            state.status = status;
            let rows_before = state.tile_rows.clone();
            tick(&mut state, 0.1, 200.0);
            assert_eq!(state.tile_rows, rows_before);
            assert_eq!(state.time_ticks, 0);
        }
    }

    #[test]
    fn test_at_most_one_spawn_per_tick() {
        let mut state = playing_state(3);
        // Huge dt: everything flies off the bottom at once
        tick(&mut state, 100.0, 200.0);
        // All seed rows retired, exactly one fresh row spawned at the top
        assert_eq!(state.tile_rows.len(), 1);
        assert_eq!(state.tile_rows[0].y, -TILE_HEIGHT);
        assert!(state.tile_rows[0].id >= 8);
    }

    #[test]
    fn test_retire_happens_before_spawn() {
        let mut state = playing_state(3);
        // Park one row just past the retire threshold and none visible
        state.tile_rows.clear();
        state.tile_rows.push(crate::engine::TileRow {
            id: 1,
            y: FIELD_HEIGHT + RETIRE_MARGIN + 1.0,
            active_column: 0,
            status: crate::engine::TileStatus::Pending,
        });
        tick(&mut state, 0.0, 200.0);
        // The stale row is gone and the spawn saw an empty field
        assert_eq!(state.tile_rows.len(), 1);
        assert_eq!(state.tile_rows[0].y, -TILE_HEIGHT);
    }

    #[test]
    fn test_steady_state_spacing_stays_one_tile() {
        let mut state = playing_state(3);
        for _ in 0..600 {
            tick(&mut state, 1.0 / 60.0, BASE_FALL_SPEED);
        }
        let mut ys: Vec<f32> = state.tile_rows.iter().map(|r| r.y).collect();
        ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in ys.windows(2) {
            assert!(
                (pair[1] - pair[0] - TILE_HEIGHT).abs() < 0.1,
                "rows drifted apart: {pair:?}"
            );
        }
    }

    proptest! {
        /// Row positions never decrease across ticks while Playing
        #[test]
        fn prop_positions_non_decreasing(
            seed in 0u64..1000,
            dts in proptest::collection::vec(0.0f32..0.25, 1..120),
        ) {
            let mut state = playing_state(seed);
            for dt in dts {
                let before: Vec<(u32, f32)> =
                    state.tile_rows.iter().map(|r| (r.id, r.y)).collect();
                tick(&mut state, dt, BASE_FALL_SPEED);
                for (id, y0) in before {
                    if let Some(row) = state.tile_rows.iter().find(|r| r.id == id) {
                        prop_assert!(row.y >= y0);
                    }
                }
            }
        }

        /// Ticks never grow the field by more than one row, and never
        /// leave a retired row behind
        #[test]
        fn prop_spawn_and_retire_bounds(
            seed in 0u64..1000,
            dts in proptest::collection::vec(0.0f32..0.25, 1..120),
        ) {
            let mut state = playing_state(seed);
            for dt in dts {
                let len_before = state.tile_rows.len();
                tick(&mut state, dt, BASE_FALL_SPEED);
                prop_assert!(state.tile_rows.len() <= len_before + 1);
                for row in &state.tile_rows {
                    prop_assert!(row.y <= FIELD_HEIGHT + RETIRE_MARGIN);
                }
            }
        }
    }
}
