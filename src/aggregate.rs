//! Reduction of a pitch time series to a single representative pitch.
use std::cmp::Ordering;

use crate::error::{PitchError, Result};
use crate::float::{lit, Float};

/// Pick the dominant pitch of a series.
///
/// Entries with a missing (or NaN) frequency are skipped. When `clarities` is
/// given, entries with a missing clarity or a clarity below `min_clarity` are
/// skipped as well and the result is the clarity-weighted median, which is
/// always one of the input frequencies. Without clarities the plain median is
/// returned. `None` means no entry survived the filtering.
pub fn dominant_pitch<T: Float>(
    frequencies: &[Option<T>],
    clarities: Option<&[Option<T>]>,
    min_clarity: T,
) -> Result<Option<T>> {
    if let Some(clarities) = clarities {
        if clarities.len() != frequencies.len() {
            return Err(PitchError::MismatchedSeries {
                frequencies: frequencies.len(),
                clarities: clarities.len(),
            });
        }
    }
    Ok(dominant_pitch_aligned(frequencies, clarities, min_clarity))
}

/// Same as [`dominant_pitch`] for series already known to be index-aligned.
pub(crate) fn dominant_pitch_aligned<T: Float>(
    frequencies: &[Option<T>],
    clarities: Option<&[Option<T>]>,
    min_clarity: T,
) -> Option<T> {
    match clarities {
        Some(clarities) => {
            let mut pairs: Vec<(T, T)> = frequencies
                .iter()
                .zip(clarities)
                .filter_map(|(&frequency, &clarity)| {
                    let (frequency, clarity) = (present(frequency)?, present(clarity)?);
                    (clarity >= min_clarity).then(|| (frequency, clarity))
                })
                .collect();
            weighted_median(&mut pairs)
        }
        None => {
            let mut values: Vec<T> = frequencies.iter().filter_map(|&f| present(f)).collect();
            median(&mut values)
        }
    }
}

fn present<T: Float>(value: Option<T>) -> Option<T> {
    value.filter(|v| !v.is_nan())
}

fn by_value<T: Float>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Weighted median of `(value, weight)` pairs: after sorting by value, the first
/// value whose cumulative weight reaches half of the total weight.
/// Sorts `pairs` in place.
pub fn weighted_median<T: Float>(pairs: &mut [(T, T)]) -> Option<T> {
    pairs.sort_by(|a, b| by_value(&a.0, &b.0));

    let half = pairs.iter().map(|&(_, weight)| weight).sum::<T>() / lit(2.0);
    let mut cumulative = T::zero();
    for &(value, weight) in pairs.iter() {
        cumulative = cumulative + weight;
        if cumulative >= half {
            return Some(value);
        }
    }
    pairs.last().map(|&(value, _)| value)
}

/// Median of `values`, averaging the two middle values for an even count.
/// Sorts `values` in place.
pub fn median<T: Float>(values: &mut [T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(by_value);

    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / lit(2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_median_takes_first_index_reaching_half() {
        // cumulative weights 1, 2, 3, 4 against a half total of 2
        let mut pairs = vec![(300.0, 1.0), (100.0, 1.0), (400.0, 1.0), (200.0, 1.0)];
        assert_eq!(weighted_median(&mut pairs), Some(200.0));
    }

    #[test]
    fn weighted_median_follows_the_weights() {
        let mut pairs = vec![(100.0, 0.1), (200.0, 0.1), (440.0, 0.9)];
        assert_eq!(weighted_median(&mut pairs), Some(440.0));
    }

    #[test]
    fn median_averages_even_counts() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median::<f64>(&mut []), None);
    }

    #[test]
    fn all_missing_is_undetermined() {
        let frequencies: [Option<f64>; 3] = [None, None, Some(f64::NAN)];
        assert_eq!(dominant_pitch(&frequencies, None, 0.5), Ok(None));
    }

    #[test]
    fn all_unclear_is_undetermined() {
        let frequencies = [Some(220.0), Some(221.0)];
        let clarities = [Some(0.3), Some(0.49)];
        assert_eq!(dominant_pitch(&frequencies, Some(&clarities[..]), 0.5), Ok(None));
    }

    #[test]
    fn low_clarity_entries_are_dropped() {
        let frequencies = [Some(110.0), Some(220.0), Some(221.0), None, Some(880.0)];
        let clarities = [Some(0.99), Some(0.9), Some(0.95), None, None];
        assert_eq!(
            dominant_pitch(&frequencies, Some(&clarities[..]), 0.92),
            Ok(Some(110.0))
        );
        assert_eq!(
            dominant_pitch(&frequencies, Some(&clarities[..]), 0.5),
            Ok(Some(220.0))
        );
    }

    #[test]
    fn unweighted_median_without_clarities() {
        let frequencies = [Some(100.0), None, Some(200.0)];
        assert_eq!(dominant_pitch(&frequencies, None, 0.5), Ok(Some(150.0)));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let frequencies = [Some(100.0), Some(200.0)];
        let clarities = [Some(1.0)];
        assert_eq!(
            dominant_pitch(&frequencies, Some(&clarities[..]), 0.5),
            Err(PitchError::MismatchedSeries {
                frequencies: 2,
                clarities: 1
            })
        );
    }
}
