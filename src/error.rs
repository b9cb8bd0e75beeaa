use thiserror::Error;

/// Caller contract violations. Frames without a detectable pitch are not
/// errors; they are reported as [`Estimate::NoPitch`](crate::Estimate::NoPitch).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PitchError {
    #[error("frame has {0} samples, at least 3 are required")]
    FrameTooShort(usize),

    #[error("frame has {actual} samples but the detector was built for {expected}")]
    FrameLengthMismatch { expected: usize, actual: usize },

    #[error("sample rate must be positive")]
    InvalidSampleRate,

    #[error("frame length must be positive")]
    InvalidFrameLength,

    #[error("hop length must be positive")]
    InvalidHopLength,

    #[error("threshold {0} is outside the open interval (0, 1)")]
    InvalidThreshold(f64),

    #[error("strong clarity {0} is outside the interval (0, 1]")]
    InvalidStrongClarity(f64),

    #[error("power threshold {0} must be non-negative")]
    InvalidPowerThreshold(f64),

    #[error("frequency range [{min}, {max}] is invalid")]
    InvalidFrequencyRange { min: f64, max: f64 },

    #[error("unknown instrument \"{0}\"")]
    UnknownInstrument(String),

    #[error("series lengths differ: {frequencies} frequencies, {clarities} clarities")]
    MismatchedSeries { frequencies: usize, clarities: usize },
}

pub type Result<T> = std::result::Result<T, PitchError>;
