use std::sync::Arc;

use rustfft::{Fft, FftPlanner};

use crate::float::{lit, Float};
use crate::utils::buffer::{
    copy_complex_to_real, copy_real_to_complex, modulus_squared, square_prefix_sum, BufferPool,
};
use crate::utils::peak::{choose_peak, correct_peak, detect_peaks};

/// Substituted for a zero energy term so silent frames produce a zero NSDF
/// instead of dividing by zero.
pub const ENERGY_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch<T>
where
    T: Float,
{
    pub frequency: T,
    pub clarity: T,
}

/// Outcome of analysing a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate<T>
where
    T: Float,
{
    Detected(Pitch<T>),
    NoPitch,
}

impl<T: Float> Estimate<T> {
    pub fn pitch(self) -> Option<Pitch<T>> {
        match self {
            Estimate::Detected(pitch) => Some(pitch),
            Estimate::NoPitch => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, Estimate::Detected(_))
    }
}

impl<T: Float> From<Option<Pitch<T>>> for Estimate<T> {
    fn from(pitch: Option<Pitch<T>>) -> Self {
        pitch.map_or(Estimate::NoPitch, Estimate::Detected)
    }
}

/// FFT plans and scratch buffers for frames of one fixed length.
/// Planning is done once; buffers come from a locked `BufferPool`, so the
/// internals can be shared between threads analysing frames of that length.
pub struct DetectorInternals<T>
where
    T: Float,
{
    pub size: usize,
    pub fft_size: usize,
    scratch_size: usize,
    forward: Arc<dyn Fft<T>>,
    inverse: Arc<dyn Fft<T>>,
    pub buffers: BufferPool<T>,
}

impl<T> DetectorInternals<T>
where
    T: Float,
{
    /// Plan for frames of `size` samples. The FFT length is the smallest power
    /// of two that is at least `2 * size`, so the circular correlation does not wrap.
    pub fn new(size: usize) -> Self {
        let fft_size = (2 * size).max(1).next_power_of_two();

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let scratch_size = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        log::debug!(
            "planned NSDF internals: frame size {}, fft size {}, scratch {}",
            size,
            fft_size,
            scratch_size
        );

        DetectorInternals {
            size,
            fft_size,
            scratch_size,
            forward,
            inverse,
            buffers: BufferPool::new(fft_size.max(scratch_size)),
        }
    }

    /// Compute r(tau) = sum_j x_j * x_{j+tau} for every lag of `signal` into `result`
    /// through the frequency domain.
    pub fn autocorrelation(&self, signal: &[T], result: &mut [T]) {
        assert_eq!(signal.len(), self.size);
        assert!(result.len() >= self.size);

        let (mut signal_ref, mut scratch_ref) = (
            self.buffers.get_complex_buffer(),
            self.buffers.get_complex_buffer(),
        );
        let signal_complex = &mut signal_ref[..self.fft_size];
        let scratch = &mut scratch_ref[..self.scratch_size];

        copy_real_to_complex(signal, signal_complex);
        self.forward.process_with_scratch(signal_complex, scratch);
        modulus_squared(signal_complex);
        self.inverse.process_with_scratch(signal_complex, scratch);
        // rustfft leaves both transforms unnormalized.
        let normalization = T::one() / lit(self.fft_size as f64);
        copy_complex_to_real(signal_complex, &mut result[..self.size], normalization);
    }

    /// Write the NSDF of `signal` to `result[..signal.len()]`.
    pub fn normalized_square_difference(&self, signal: &[T], result: &mut [T]) {
        let size = signal.len();
        let (mut prefix_ref, mut energy_ref) = (
            self.buffers.get_real_buffer(),
            self.buffers.get_real_buffer(),
        );
        let energy = &mut energy_ref[..size];

        self.autocorrelation(signal, result);
        m_of_tau(signal, &mut prefix_ref[..size + 1], energy);
        combine_nsdf(&mut result[..size], energy);
    }
}

/// Compute the autocorrelation of `signal` by direct summation. O(n^2); used as
/// the reference for the FFT path.
pub fn autocorrelation_direct<T: Float>(signal: &[T], result: &mut [T]) {
    assert!(result.len() >= signal.len());
    let n = signal.len();
    for (tau, r) in result[..n].iter_mut().enumerate() {
        *r = signal[..n - tau]
            .iter()
            .zip(&signal[tau..])
            .map(|(&a, &b)| a * b)
            .sum();
    }
}

/// Compute m(tau) = sum_{j=0}^{n-1-tau} x_j^2 + sum_{j=tau}^{n-1} x_j^2 for all lags,
/// using `prefix` (at least `n + 1` long) as scratch for the running energy.
pub fn m_of_tau<T: Float>(signal: &[T], prefix: &mut [T], result: &mut [T]) {
    let n = signal.len();
    assert!(result.len() >= n);

    square_prefix_sum(signal, prefix);
    let total = prefix[n];
    for (tau, m) in result[..n].iter_mut().enumerate() {
        *m = prefix[n - tau] + (total - prefix[tau]);
    }
}

/// Turn `autocorr` into the NSDF in place: nsdf(tau) = 2 r(tau) / m(tau).
fn combine_nsdf<T: Float>(autocorr: &mut [T], energy: &[T]) {
    let two = lit::<T>(2.0);
    let epsilon = lit::<T>(ENERGY_EPSILON);
    autocorr.iter_mut().zip(energy).for_each(|(r, &m)| {
        let m = if m == T::zero() { epsilon } else { m };
        *r = two * *r / m;
    });
}

/// NSDF computed entirely by direct summation.
pub fn normalized_square_difference_direct<T: Float>(signal: &[T]) -> Vec<T> {
    let n = signal.len();
    let mut result = vec![T::zero(); n];
    let mut prefix = vec![T::zero(); n + 1];
    let mut energy = vec![T::zero(); n];
    autocorrelation_direct(signal, &mut result);
    m_of_tau(signal, &mut prefix, &mut energy);
    combine_nsdf(&mut result, &energy);
    result
}

/// Run peak picking, fundamental selection and parabolic refinement on an NSDF.
pub fn pitch_from_nsdf<T>(
    nsdf: &[T],
    sample_rate: usize,
    threshold: T,
    strong_clarity: T,
) -> Estimate<T>
where
    T: Float,
{
    let peaks = detect_peaks(nsdf, threshold);
    let Some(peak) = choose_peak(&peaks, strong_clarity) else {
        return Estimate::NoPitch;
    };

    let lag = correct_peak(peak.index, nsdf);
    if lag <= T::zero() {
        return Estimate::NoPitch;
    }

    Estimate::Detected(Pitch {
        frequency: lit::<T>(sample_rate as f64) / lag,
        clarity: peak.value,
    })
}
