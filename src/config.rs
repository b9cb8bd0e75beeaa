//! Tunable constants and the configuration structs built from them.
//!
//! The thresholds are empirical: they are exposed for tuning, not derived.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PitchError, Result};

/// Minimum NSDF value for a peak to be considered.
pub const DEFAULT_THRESHOLD: f64 = 0.1;
/// A first peak at least this clear is taken as the fundamental without
/// looking at later peaks.
pub const STRONG_CLARITY: f64 = 0.8;
/// Frames below this clarity are ignored when picking a dominant pitch.
pub const DEFAULT_MIN_CLARITY: f64 = 0.5;
pub const DEFAULT_FRAME_LENGTH: usize = 2048;
pub const DEFAULT_HOP_LENGTH: usize = 512;
pub const DEFAULT_MIN_FREQUENCY: f64 = 50.0;
pub const DEFAULT_MAX_FREQUENCY: f64 = 2000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub threshold: f64,
    pub strong_clarity: f64,
    /// Frames with an RMS strictly below this are reported as having no
    /// pitch. Zero disables the gate.
    pub power_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            threshold: DEFAULT_THRESHOLD,
            strong_clarity: STRONG_CLARITY,
            power_threshold: 0.0,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(PitchError::InvalidThreshold(self.threshold));
        }
        if !(self.strong_clarity > 0.0 && self.strong_clarity <= 1.0) {
            return Err(PitchError::InvalidStrongClarity(self.strong_clarity));
        }
        if !(self.power_threshold >= 0.0) {
            return Err(PitchError::InvalidPowerThreshold(self.power_threshold));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub frame_length: usize,
    pub hop_length: usize,
    /// Lowest accepted frequency in Hz, inclusive.
    pub min_frequency: f64,
    /// Highest accepted frequency in Hz, inclusive.
    pub max_frequency: f64,
    pub detector: DetectorConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            frame_length: DEFAULT_FRAME_LENGTH,
            hop_length: DEFAULT_HOP_LENGTH,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            detector: DetectorConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Default tracking parameters restricted to the range of `instrument`.
    pub fn for_instrument(instrument: Instrument) -> Self {
        let (min_frequency, max_frequency) = instrument.frequency_range();
        TrackerConfig {
            min_frequency,
            max_frequency,
            ..TrackerConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_length == 0 {
            return Err(PitchError::InvalidFrameLength);
        }
        if self.hop_length == 0 {
            return Err(PitchError::InvalidHopLength);
        }
        let (min, max) = (self.min_frequency, self.max_frequency);
        if !(min >= 0.0 && min <= max) {
            return Err(PitchError::InvalidFrequencyRange { min, max });
        }
        self.detector.validate()
    }
}

/// Instruments with a known playing range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Guitar,
    Bouzouki,
}

impl Instrument {
    pub const ALL: [Instrument; 2] = [Instrument::Guitar, Instrument::Bouzouki];

    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Guitar => "Guitar (Standard)",
            Instrument::Bouzouki => "Bouzouki (6 or 8 string)",
        }
    }

    /// Accepted `(min, max)` frequency in Hz, slightly wider than the
    /// instrument's lowest and highest notes.
    pub fn frequency_range(&self) -> (f64, f64) {
        match self {
            // E2 to E6
            Instrument::Guitar => (75.0, 1400.0),
            // C3 to F4
            Instrument::Bouzouki => (110.0, 360.0),
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Instrument::Guitar => "guitar",
            Instrument::Bouzouki => "bouzouki",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Instrument {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self> {
        Instrument::ALL
            .iter()
            .copied()
            .find(|instrument| instrument.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PitchError::UnknownInstrument(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(TrackerConfig::default().validate(), Ok(()));
        assert_eq!(DetectorConfig::default().threshold, 0.1);
        assert_eq!(DetectorConfig::default().strong_clarity, 0.8);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = TrackerConfig {
            frame_length: 0,
            ..TrackerConfig::default()
        };
        assert_eq!(config.validate(), Err(PitchError::InvalidFrameLength));

        let config = TrackerConfig {
            hop_length: 0,
            ..TrackerConfig::default()
        };
        assert_eq!(config.validate(), Err(PitchError::InvalidHopLength));

        let config = TrackerConfig {
            min_frequency: 500.0,
            max_frequency: 100.0,
            ..TrackerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(PitchError::InvalidFrequencyRange {
                min: 500.0,
                max: 100.0
            })
        );

        let config = DetectorConfig {
            threshold: 1.5,
            ..DetectorConfig::default()
        };
        assert_eq!(config.validate(), Err(PitchError::InvalidThreshold(1.5)));
    }

    #[test]
    fn instrument_profiles() {
        let config = TrackerConfig::for_instrument(Instrument::Bouzouki);
        assert_eq!((config.min_frequency, config.max_frequency), (110.0, 360.0));
        assert_eq!(config.frame_length, DEFAULT_FRAME_LENGTH);

        assert_eq!("Guitar".parse::<Instrument>(), Ok(Instrument::Guitar));
        assert_eq!(
            "banjo".parse::<Instrument>(),
            Err(PitchError::UnknownInstrument("banjo".into()))
        );
        assert_eq!(Instrument::Guitar.to_string(), "guitar");
    }
}
