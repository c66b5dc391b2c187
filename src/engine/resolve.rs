//! Tap resolution
//!
//! Every tap classifies as exactly one of HIT, MISS, or IGNORE:
//! - HIT: a pending tile in the tapped column under the tap
//! - MISS: the tap landed on some row's band inside the field, but not
//!   on its pending active tile (wrong column, or already resolved)
//! - IGNORE: dead space between rows, or beside the field entirely
//!
//! The three-way split matters: taps in empty space must not cost lives.

use super::input::TapPoint;
use super::melody;
use super::state::{GameEvent, GameState, GameStatus, Haptic, TileStatus};
use crate::consts::*;

/// Classification of a resolved tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Hit { row_id: u32 },
    Miss { row_id: u32 },
    Ignore,
}

/// Resolve a mapped tap against the current field and apply the resulting
/// transition. No-op outside `Playing`.
pub fn resolve_tap(state: &mut GameState, tap: TapPoint) -> TapOutcome {
    if state.status != GameStatus::Playing {
        return TapOutcome::Ignore;
    }

    let hit = state
        .tile_rows
        .iter()
        .find(|r| {
            i32::from(r.active_column) == tap.column
                && r.status == TileStatus::Pending
                && r.band_contains(tap.y)
        })
        .map(|r| r.id);
    if let Some(row_id) = hit {
        apply_hit(state, row_id);
        return TapOutcome::Hit { row_id };
    }

    let in_field = tap.column >= 0 && tap.column < i32::from(COLUMN_COUNT);
    if in_field {
        let offending = state
            .tile_rows
            .iter()
            .find(|r| r.band_contains(tap.y))
            .map(|r| r.id);
        if let Some(row_id) = offending {
            apply_miss(state, row_id);
            return TapOutcome::Miss { row_id };
        }
    }

    TapOutcome::Ignore
}

/// Mark the tile tapped, advance the note cursor, score, and cue effects
fn apply_hit(state: &mut GameState, row_id: u32) {
    if let Some(row) = state.tile_rows.iter_mut().find(|r| r.id == row_id) {
        row.status = TileStatus::Tapped;
    }
    let note = advance_note_cursor(state);
    state.score += SCORE_PER_HIT;
    state.push_event(GameEvent::PlayNote(note));
    state.push_event(GameEvent::Haptic(Haptic::Medium));
}

/// Pick the note for this hit and move the layered cursor forward.
///
/// While the melody runs, phrase boundaries drive the level milestones
/// and exhausting it wins the run in the same transition. Afterwards the
/// short fallback cycle loops forever.
fn advance_note_cursor(state: &mut GameState) -> &'static str {
    if !state.melody_completed && state.melody_index < melody::MELODY.len() {
        let note = melody::MELODY[state.melody_index];
        state.melody_index += 1;

        if state.melody_index % melody::PHRASE_LEN == 0 {
            let level = melody::level_for_completed_phrases(state.completed_phrases());
            if level > state.current_level {
                state.current_level = level;
                state.push_event(GameEvent::LevelChanged(level));
            }
        }

        if state.melody_index == melody::MELODY.len() {
            state.melody_completed = true;
            state.completed_melodies += 1;
            state.status = GameStatus::Won;
            state.push_event(GameEvent::MelodyCompleted);
        }
        note
    } else {
        let note = melody::FALLBACK_NOTES[state.note_index % melody::FALLBACK_NOTES.len()];
        state.note_index = (state.note_index + 1) % melody::FALLBACK_NOTES.len();
        note
    }
}

/// Mark the row under the tap (if it can still transition), take a life,
/// and end the run when none remain
fn apply_miss(state: &mut GameState, row_id: u32) {
    if let Some(row) = state
        .tile_rows
        .iter_mut()
        .find(|r| r.id == row_id && r.status == TileStatus::Pending)
    {
        row.status = TileStatus::Missed;
    }
    state.lives = state.lives.saturating_sub(1);
    state.push_event(GameEvent::Haptic(Haptic::Heavy));
    if state.lives == 0 {
        state.status = GameStatus::GameOver;
        state.push_event(GameEvent::GameOver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::TileRow;

    fn playing_state() -> GameState {
        let mut state = GameState::new(7);
        state.start();
        state
    }

    fn tap(column: i32, y: f32) -> TapPoint {
        TapPoint { column, y }
    }

    #[test]
    fn test_hit_on_active_pending_tile() {
        let mut state = playing_state();
        // Seed row 1: y 0, active column 0
        let outcome = resolve_tap(&mut state, tap(0, 10.0));
        assert_eq!(outcome, TapOutcome::Hit { row_id: 1 });
        assert_eq!(state.score, 10);
        assert_eq!(state.tile_rows[0].status, TileStatus::Tapped);
        assert_eq!(state.melody_index, 1);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PlayNote(melody::MELODY[0])));
        assert!(events.contains(&GameEvent::Haptic(Haptic::Medium)));
    }

    #[test]
    fn test_wrong_column_over_row_is_miss() {
        let mut state = playing_state();
        // Row 1's band, but column 2 (active is 0); one life, so game over
        let outcome = resolve_tap(&mut state, tap(2, 10.0));
        assert_eq!(outcome, TapOutcome::Miss { row_id: 1 });
        assert_eq!(state.lives, 0);
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.tile_rows[0].status, TileStatus::Missed);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Haptic(Haptic::Heavy)));
        assert!(events.contains(&GameEvent::GameOver));
    }

    #[test]
    fn test_dead_space_is_ignored() {
        let mut state = playing_state();
        let before = state.clone();
        // Above every row: no band up there
        let outcome = resolve_tap(&mut state, tap(1, -50.0));
        assert_eq!(outcome, TapOutcome::Ignore);
        assert_eq!(state.lives, before.lives);
        assert_eq!(state.score, before.score);
        assert_eq!(state.tile_rows, before.tile_rows);
    }

    #[test]
    fn test_outside_field_is_ignored() {
        let mut state = playing_state();
        for column in [-1, 4, 17] {
            let outcome = resolve_tap(&mut state, tap(column, 10.0));
            assert_eq!(outcome, TapOutcome::Ignore);
        }
        assert_eq!(state.lives, START_LIVES);
    }

    #[test]
    fn test_resolver_noop_unless_playing() {
        for status in [
            GameStatus::Idle,
            GameStatus::Paused,
            GameStatus::GameOver,
            GameStatus::Won,
        ] {
            let mut state = GameState::new(7);
            state.status = status;
            let outcome = resolve_tap(&mut state, tap(0, 10.0));
            assert_eq!(outcome, TapOutcome::Ignore);
            assert_eq!(state.score, 0);
        }
    }

    #[test]
    fn test_tapped_tile_cannot_resolve_twice() {
        let mut state = playing_state();
        state.lives = 3;
        resolve_tap(&mut state, tap(0, 10.0));
        assert_eq!(state.tile_rows[0].status, TileStatus::Tapped);

        // Same spot again: rule 1 no longer matches, the band does
        let outcome = resolve_tap(&mut state, tap(0, 10.0));
        assert_eq!(outcome, TapOutcome::Miss { row_id: 1 });
        // One-way transition: the row stays Tapped
        assert_eq!(state.tile_rows[0].status, TileStatus::Tapped);
        assert_eq!(state.lives, 2);
    }

    /// Drive a full melody worth of hits, one fresh pending row each time
    fn hit_n_times(state: &mut GameState, n: usize) {
        for i in 0..n {
            state.tile_rows = vec![TileRow {
                id: 100 + i as u32,
                y: 0.0,
                active_column: 0,
                status: TileStatus::Pending,
            }];
            let outcome = resolve_tap(state, tap(0, 10.0));
            assert!(matches!(outcome, TapOutcome::Hit { .. }), "hit {i} failed");
        }
    }

    #[test]
    fn test_level_milestones_on_phrase_boundaries() {
        let mut state = playing_state();
        hit_n_times(&mut state, 7);
        assert_eq!(state.current_level, 1);

        hit_n_times(&mut state, 1);
        assert_eq!(state.current_level, 2);
        assert!(state.drain_events().contains(&GameEvent::LevelChanged(2)));

        hit_n_times(&mut state, 8);
        assert_eq!(state.current_level, 3);

        // No tier past 3
        hit_n_times(&mut state, 8);
        assert_eq!(state.current_level, 3);
    }

    #[test]
    fn test_full_melody_wins_atomically() {
        let mut state = playing_state();
        hit_n_times(&mut state, melody::MELODY.len());
        assert!(state.melody_completed);
        assert_eq!(state.completed_melodies, 1);
        assert_eq!(state.status, GameStatus::Won);
        assert_eq!(state.melody_index, melody::MELODY.len());
        assert_eq!(state.score, melody::MELODY.len() as u32 * SCORE_PER_HIT);
        assert!(state.drain_events().contains(&GameEvent::MelodyCompleted));
    }

    #[test]
    fn test_fallback_cycle_after_win() {
        let mut state = playing_state();
        hit_n_times(&mut state, melody::MELODY.len());
        state.keep_playing();
        state.drain_events();

        // Two full fallback cycles; the cursor wraps and nothing re-wins
        for i in 0..(melody::FALLBACK_NOTES.len() * 2) {
            state.tile_rows = vec![TileRow {
                id: 500 + i as u32,
                y: 0.0,
                active_column: 1,
                status: TileStatus::Pending,
            }];
            resolve_tap(&mut state, tap(1, 10.0));
            let expected = melody::FALLBACK_NOTES[i % melody::FALLBACK_NOTES.len()];
            assert!(
                state.drain_events().contains(&GameEvent::PlayNote(expected)),
                "fallback note {i}"
            );
        }
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.completed_melodies, 1);
        assert_eq!(state.note_index, 0);
    }

    #[test]
    fn test_lives_zero_and_status_change_are_atomic() {
        let mut state = playing_state();
        state.lives = 2;
        resolve_tap(&mut state, tap(2, 10.0));
        assert_eq!(state.lives, 1);
        assert_eq!(state.status, GameStatus::Playing);

        // Second miss lands on row 2's band (row 1 already Missed keeps
        // its band too, but marking skips resolved rows)
        resolve_tap(&mut state, tap(3, 90.0));
        assert_eq!(state.lives, 0);
        assert_eq!(state.status, GameStatus::GameOver);
    }
}
