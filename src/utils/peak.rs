use rustfft::num_traits::Float as NumFloat;

use crate::float::{lit, Float};

/// A strict local maximum of the NSDF above the detection threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak<T> {
    pub index: usize,
    pub value: T,
}

/// Collect the positive, strict local maxima of `nsdf` whose value exceeds
/// `threshold`, in order of increasing lag. Lag 0 and the last lag can never
/// be reported since they lack a neighbour on one side.
pub fn detect_peaks<T: Float>(nsdf: &[T], threshold: T) -> Vec<Peak<T>> {
    nsdf.windows(3)
        .enumerate()
        .filter_map(|(i, win)| {
            let (left, value, right) = (win[0], win[1], win[2]);
            let is_peak =
                value > threshold && value > T::zero() && value > left && value > right;
            is_peak.then(|| Peak {
                index: i + 1,
                value,
            })
        })
        .collect()
}

/// Pick the peak most likely to be the fundamental. A strong first peak wins
/// outright, since later peaks at multiples of its lag are subharmonics that can
/// score marginally higher. Otherwise the highest peak wins, the lowest lag
/// breaking ties.
pub fn choose_peak<T: Float>(peaks: &[Peak<T>], strong_clarity: T) -> Option<Peak<T>> {
    let first = *peaks.first()?;
    if first.value >= strong_clarity {
        return Some(first);
    }
    Some(peaks[1..].iter().fold(first, |best, &peak| {
        if peak.value > best.value {
            peak
        } else {
            best
        }
    }))
}

/// Refine the lag of the peak at `index` by fitting a parabola through it and
/// its two neighbours. Returns `index` unchanged at the edges of `data` or when
/// the parabola is flat.
pub fn correct_peak<T: Float>(index: usize, data: &[T]) -> T {
    let center = lit::<T>(index as f64);
    if index == 0 || index + 1 >= data.len() {
        return center;
    }

    let (left, mid, right) = (data[index - 1], data[index], data[index + 1]);
    let denominator = left - lit::<T>(2.0) * mid + right;
    if NumFloat::abs(denominator) < lit(1e-10) {
        return center;
    }

    center + lit::<T>(0.5) * (left - right) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(index: usize, value: f64) -> Peak<f64> {
        Peak { index, value }
    }

    #[test]
    fn peaks_are_strict_local_maxima_above_threshold() {
        let nsdf = [1.0, 0.2, 0.5, 0.3, 0.3, 0.05, 0.08, 0.0, 0.9, 0.9, 0.1];
        let peaks = detect_peaks(&nsdf, 0.1);
        // 0.08 is below the threshold and the 0.9 plateau is not strict.
        assert_eq!(peaks, vec![peak(2, 0.5)]);
    }

    #[test]
    fn peaks_never_include_the_edges() {
        let nsdf = [1.0, 0.2, 0.6, 0.4, 0.95];
        let peaks = detect_peaks(&nsdf, 0.1);
        assert_eq!(peaks, vec![peak(2, 0.6)]);

        let rising = [0.0, 0.3, 0.99];
        assert!(detect_peaks(&rising, 0.1).is_empty());
    }

    #[test]
    fn negative_peaks_are_ignored() {
        let nsdf = [1.0, -0.9, -0.5, -0.9, 0.0];
        assert!(detect_peaks(&nsdf, 0.1).is_empty());
    }

    #[test]
    fn strong_first_peak_is_preferred() {
        let peaks = [peak(100, 0.85), peak(200, 0.95)];
        assert_eq!(choose_peak(&peaks, 0.8), Some(peak(100, 0.85)));
    }

    #[test]
    fn weak_first_peak_falls_back_to_maximum() {
        let peaks = [peak(50, 0.4), peak(100, 0.7), peak(200, 0.7)];
        assert_eq!(choose_peak(&peaks, 0.8), Some(peak(100, 0.7)));
    }

    #[test]
    fn no_peaks_no_choice() {
        assert_eq!(choose_peak::<f64>(&[], 0.8), None);
    }

    #[test]
    fn parabolic_peak_correction() {
        // y = 4 - (x - 2.25)^2 sampled at 1, 2, 3
        let data: Vec<f64> = (0..5).map(|x| 4.0 - (x as f64 - 2.25).powi(2)).collect();
        let refined = correct_peak(2, &data);
        assert!((refined - 2.25).abs() < 1e-12);
    }

    #[test]
    fn correction_is_a_no_op_at_edges_and_on_flat_data() {
        let data = [0.5, 0.7, 0.2];
        assert_eq!(correct_peak(0, &data), 0.0);
        assert_eq!(correct_peak(2, &data), 2.0);

        let flat = [0.5, 0.5, 0.5];
        assert_eq!(correct_peak(1, &flat), 1.0);
    }
}
