//! Best-effort haptic cues via the Vibration API
//!
//! Missing capability (desktop browsers, iOS Safari) is a silent no-op;
//! game logic never depends on whether the buzz happened.

use crate::engine::Haptic;

/// Fire a single impact cue
pub fn impact(intensity: Haptic) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let millis = match intensity {
        Haptic::Light => 10,
        Haptic::Medium => 25,
        Haptic::Heavy => 60,
    };
    // Returns false when unsupported or blocked; either way we move on
    let _ = window.navigator().vibrate_with_duration(millis);
}
