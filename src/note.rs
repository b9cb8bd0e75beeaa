//! Equal-tempered note naming for detected frequencies (A4 = 440 Hz = MIDI 69).
use std::fmt;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Converts a frequency in Hz to a [MIDI](https://en.wikipedia.org/wiki/MIDI) note number (with a fractional part).
pub fn freq_to_midi_note(freq: f64) -> f64 {
    69.0 + 12.0 * (freq / 440.0).log2()
}

/// Frequency in Hz of a (possibly fractional) MIDI note number.
pub fn midi_note_to_freq(note: f64) -> f64 {
    440.0 * 2f64.powf((note - 69.0) / 12.0)
}

/// Nearest whole MIDI note. Exact quarter tones go to the even note.
fn nearest_midi_note(note: f64) -> i32 {
    note.round_ties_even() as i32
}

/// The nearest equal-tempered note to a frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Pitch class and octave, e.g. `A4` or `C#3`.
    pub name: String,
    pub midi: i32,
    /// Signed distance from `midi` in cents, within [-50, 50].
    pub cents: f64,
}

impl Note {
    /// `None` for frequencies that are not finite and positive.
    pub fn from_frequency(frequency: f64) -> Option<Self> {
        if !(frequency > 0.0 && frequency.is_finite()) {
            return None;
        }

        let exact = freq_to_midi_note(frequency);
        let midi = nearest_midi_note(exact);
        let octave = midi.div_euclid(12) - 1;
        let pitch_class = NOTE_NAMES[midi.rem_euclid(12) as usize];

        Some(Note {
            name: format!("{}{}", pitch_class, octave),
            midi,
            cents: 100.0 * (exact - midi as f64),
        })
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:+.1} cents)", self.name, self.cents)
    }
}
