use crate::detector::internals::Estimate;
use crate::error::Result;
use crate::float::Float;

pub mod internals;
pub mod mcleod;

pub trait PitchDetector<T>
where
    T: Float,
{
    /// Estimate the pitch of one frame. `threshold` is the minimum NSDF value a
    /// peak must exceed to be considered and must lie in `(0, 1)`.
    fn get_pitch(&self, signal: &[T], sample_rate: usize, threshold: T) -> Result<Estimate<T>>;

    /// Number of samples per frame this detector accepts.
    fn size(&self) -> usize;
}
