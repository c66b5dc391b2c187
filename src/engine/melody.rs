//! Melody tables and note math
//!
//! The primary melody is the Ode to Joy theme in C major, laid out as
//! 8 phrases of 8 notes. Crossing phrase boundaries drives the level
//! progression; exhausting the melody wins the run. After that, hits
//! draw from a short repeating note cycle.

/// Notes per phrase
pub const PHRASE_LEN: usize = 8;
/// Phrases in the full melody
pub const PHRASE_COUNT: usize = 8;

/// The full melody, one note per successful tap
pub const MELODY: [&str; PHRASE_LEN * PHRASE_COUNT] = [
    // Phrase 1
    "E4", "E4", "F4", "G4", "G4", "F4", "E4", "D4",
    // Phrase 2
    "C4", "C4", "D4", "E4", "E4", "D4", "D4", "D4",
    // Phrase 3
    "E4", "E4", "F4", "G4", "G4", "F4", "E4", "D4",
    // Phrase 4
    "C4", "C4", "D4", "E4", "D4", "C4", "C4", "C4",
    // Phrase 5
    "D4", "D4", "E4", "C4", "D4", "E4", "F4", "E4",
    // Phrase 6
    "C4", "D4", "E4", "F4", "E4", "D4", "C4", "D4",
    // Phrase 7
    "E4", "E4", "F4", "G4", "G4", "F4", "E4", "D4",
    // Phrase 8
    "C4", "C4", "D4", "E4", "D4", "C4", "C4", "C4",
];

/// Repeating cycle played once the melody is exhausted
pub const FALLBACK_NOTES: [&str; 7] = ["C4", "D4", "E4", "F4", "G4", "A4", "B4"];

/// Highest difficulty/timbre tier
pub const MAX_LEVEL: u8 = 3;

/// Level for a number of fully completed phrases.
///
/// Milestones: finishing phrase 1 reaches level 2, finishing phrase 2
/// reaches level 3. Levels never regress, so callers take the max with
/// the current level.
pub fn level_for_completed_phrases(phrases: usize) -> u8 {
    match phrases {
        0 => 1,
        1 => 2,
        _ => MAX_LEVEL,
    }
}

/// Frequency in Hz for a note name like "C4" or "F#3".
///
/// Returns `None` for anything that doesn't parse; playback treats that
/// as a skipped note rather than an error.
pub fn note_frequency(note: &str) -> Option<f32> {
    let mut chars = note.chars();
    let letter = chars.next()?;
    let mut semitone: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest: String = chars.collect();
    let octave_str = if let Some(stripped) = rest.strip_prefix('#') {
        semitone += 1;
        stripped
    } else if let Some(stripped) = rest.strip_prefix('b') {
        semitone -= 1;
        stripped
    } else {
        rest.as_str()
    };

    let octave: i32 = octave_str.parse().ok()?;
    let midi = 12 * (octave + 1) + semitone;
    Some(440.0 * 2.0_f32.powf((midi - 69) as f32 / 12.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melody_shape() {
        assert_eq!(MELODY.len(), PHRASE_LEN * PHRASE_COUNT);
        for note in MELODY {
            assert!(note_frequency(note).is_some(), "unparseable note {note}");
        }
        for note in FALLBACK_NOTES {
            assert!(note_frequency(note).is_some());
        }
    }

    #[test]
    fn test_level_milestones() {
        assert_eq!(level_for_completed_phrases(0), 1);
        assert_eq!(level_for_completed_phrases(1), 2);
        assert_eq!(level_for_completed_phrases(2), 3);
        // No tier past 3, however far the melody goes
        assert_eq!(level_for_completed_phrases(7), 3);
        assert_eq!(level_for_completed_phrases(PHRASE_COUNT), MAX_LEVEL);
    }

    #[test]
    fn test_note_frequency() {
        assert!((note_frequency("A4").unwrap() - 440.0).abs() < 0.01);
        assert!((note_frequency("C4").unwrap() - 261.63).abs() < 0.05);
        assert!((note_frequency("B4").unwrap() - 493.88).abs() < 0.05);
        // Sharps and flats
        assert!((note_frequency("F#3").unwrap() - 185.0).abs() < 0.05);
        assert_eq!(note_frequency("Gb4"), note_frequency("F#4"));
        // Garbage
        assert_eq!(note_frequency("H4"), None);
        assert_eq!(note_frequency(""), None);
        assert_eq!(note_frequency("C"), None);
    }
}
