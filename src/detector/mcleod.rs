use crate::config::DetectorConfig;
use crate::detector::internals::pitch_from_nsdf;
use crate::detector::internals::DetectorInternals;
use crate::detector::internals::Estimate;
use crate::detector::PitchDetector;
use crate::error::{PitchError, Result};
use crate::float::{lit, to_f64, Float};
use crate::utils::buffer::rms;

/// Smallest frame that can hold a peak with a neighbour on each side.
pub const MIN_FRAME_SIZE: usize = 3;

pub struct McLeodDetector<T>
where
    T: Float,
{
    internals: DetectorInternals<T>,
    strong_clarity: T,
    power_threshold: T,
}

impl<T> McLeodDetector<T>
where
    T: Float,
{
    /// Build a detector for frames of `size` samples using the default
    /// strong-clarity constant and no power gate.
    pub fn new(size: usize) -> Result<Self> {
        Self::with_config(size, &DetectorConfig::default())
    }

    /// Build a detector taking `strong_clarity` and `power_threshold` from
    /// `config`. The config's `threshold` is left to the caller of `get_pitch`.
    pub fn with_config(size: usize, config: &DetectorConfig) -> Result<Self> {
        if size < MIN_FRAME_SIZE {
            return Err(PitchError::FrameTooShort(size));
        }
        config.validate()?;

        Ok(McLeodDetector {
            internals: DetectorInternals::new(size),
            strong_clarity: lit(config.strong_clarity),
            power_threshold: lit(config.power_threshold),
        })
    }

    /// Write the NSDF of `signal` to `result`. Both must be `size()` long.
    pub fn nsdf(&self, signal: &[T], result: &mut [T]) -> Result<()> {
        self.check_size(signal.len())?;
        self.check_size(result.len())?;
        self.internals.normalized_square_difference(signal, result);
        Ok(())
    }

    fn check_size(&self, actual: usize) -> Result<()> {
        if actual != self.internals.size {
            return Err(PitchError::FrameLengthMismatch {
                expected: self.internals.size,
                actual,
            });
        }
        Ok(())
    }
}

impl<T> PitchDetector<T> for McLeodDetector<T>
where
    T: Float,
{
    fn get_pitch(&self, signal: &[T], sample_rate: usize, threshold: T) -> Result<Estimate<T>> {
        self.check_size(signal.len())?;
        if sample_rate == 0 {
            return Err(PitchError::InvalidSampleRate);
        }
        if !(threshold > T::zero() && threshold < T::one()) {
            return Err(PitchError::InvalidThreshold(to_f64(threshold)));
        }

        if self.power_threshold > T::zero() && rms(signal) < self.power_threshold {
            log::trace!("frame below power threshold {}", self.power_threshold);
            return Ok(Estimate::NoPitch);
        }

        let mut nsdf_ref = self.internals.buffers.get_real_buffer();
        let nsdf = &mut nsdf_ref[..signal.len()];
        self.internals.normalized_square_difference(signal, nsdf);

        Ok(pitch_from_nsdf(
            nsdf,
            sample_rate,
            threshold,
            self.strong_clarity,
        ))
    }

    fn size(&self) -> usize {
        self.internals.size
    }
}

/// One-shot detection on a single frame with the default configuration.
/// Prefer a [`McLeodDetector`] when analysing many frames of the same length.
pub fn detect_pitch<T: Float>(
    signal: &[T],
    sample_rate: usize,
    threshold: T,
) -> Result<Estimate<T>> {
    McLeodDetector::new(signal.len())?.get_pitch(signal, sample_rate, threshold)
}
