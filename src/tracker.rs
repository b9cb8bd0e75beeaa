//! Sliding-window pitch tracking over a signal longer than one frame.
use std::num::NonZeroUsize;
use std::thread;

use crate::aggregate::dominant_pitch_aligned;
use crate::config::TrackerConfig;
use crate::detector::internals::Pitch;
use crate::detector::mcleod::McLeodDetector;
use crate::detector::PitchDetector;
use crate::error::{PitchError, Result};
use crate::float::{lit, Float};

/// Number of whole frames of `frame_length` samples, `hop_length` apart, that
/// fit in a signal of `signal_length` samples.
pub fn frame_count(signal_length: usize, frame_length: usize, hop_length: usize) -> usize {
    if frame_length == 0 || hop_length == 0 || signal_length < frame_length {
        return 0;
    }
    1 + (signal_length - frame_length) / hop_length
}

/// Per-frame pitch over time. The three sequences are index-aligned: entry `k`
/// describes the frame starting at `times()[k]` seconds. Frames without a pitch
/// in the accepted range have both frequency and clarity missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PitchTrack<T>
where
    T: Float,
{
    frequencies: Vec<Option<T>>,
    clarities: Vec<Option<T>>,
    times: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint<T>
where
    T: Float,
{
    pub time: T,
    pub pitch: Option<Pitch<T>>,
}

impl<T: Float> PitchTrack<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        PitchTrack {
            frequencies: Vec::with_capacity(capacity),
            clarities: Vec::with_capacity(capacity),
            times: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, time: T, pitch: Option<Pitch<T>>) {
        self.frequencies.push(pitch.map(|p| p.frequency));
        self.clarities.push(pitch.map(|p| p.clarity));
        self.times.push(time);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn frequencies(&self) -> &[Option<T>] {
        &self.frequencies
    }

    pub fn clarities(&self) -> &[Option<T>] {
        &self.clarities
    }

    pub fn times(&self) -> &[T] {
        &self.times
    }

    pub fn points(&self) -> impl Iterator<Item = TrackPoint<T>> + '_ {
        self.times
            .iter()
            .zip(self.frequencies.iter().zip(&self.clarities))
            .map(|(&time, (&frequency, &clarity))| TrackPoint {
                time,
                pitch: frequency
                    .zip(clarity)
                    .map(|(frequency, clarity)| Pitch { frequency, clarity }),
            })
    }

    /// Clarity-weighted median of the frames at least `min_clarity` clear, or
    /// `None` if there are none.
    pub fn dominant_pitch(&self, min_clarity: T) -> Option<T> {
        dominant_pitch_aligned(&self.frequencies, Some(self.clarities.as_slice()), min_clarity)
    }
}

impl<T: Float> FromIterator<TrackPoint<T>> for PitchTrack<T> {
    fn from_iter<I: IntoIterator<Item = TrackPoint<T>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut track = PitchTrack::with_capacity(iter.size_hint().0);
        iter.for_each(|point| track.push(point.time, point.pitch));
        track
    }
}

/// Runs a detector over successive frames of a signal. Frames are analysed
/// independently; nothing is smoothed across frames.
pub struct FrameTracker<T, D = McLeodDetector<T>>
where
    T: Float,
{
    detector: D,
    hop_length: usize,
    threshold: T,
    min_frequency: T,
    max_frequency: T,
}

impl<T: Float> FrameTracker<T> {
    /// Build a tracker with a [`McLeodDetector`] sized to `config.frame_length`.
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        config.validate()?;
        let detector = McLeodDetector::with_config(config.frame_length, &config.detector)?;
        Self::with_detector(detector, config)
    }
}

impl<T, D> FrameTracker<T, D>
where
    T: Float,
    D: PitchDetector<T>,
{
    /// Build a tracker around an existing detector, whose size must match
    /// `config.frame_length`.
    pub fn with_detector(detector: D, config: &TrackerConfig) -> Result<Self> {
        config.validate()?;
        if detector.size() != config.frame_length {
            return Err(PitchError::FrameLengthMismatch {
                expected: detector.size(),
                actual: config.frame_length,
            });
        }

        Ok(FrameTracker {
            detector,
            hop_length: config.hop_length,
            threshold: lit(config.detector.threshold),
            min_frequency: lit(config.min_frequency),
            max_frequency: lit(config.max_frequency),
        })
    }

    pub fn frame_length(&self) -> usize {
        self.detector.size()
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Analyse every whole frame of `signal`. A signal shorter than one frame
    /// gives an empty track.
    pub fn track(&self, signal: &[T], sample_rate: usize) -> Result<PitchTrack<T>> {
        let count = self.frames_in(signal, sample_rate)?;
        let track = (0..count)
            .map(|k| self.analyze_frame(signal, sample_rate, k))
            .collect::<Result<PitchTrack<T>>>()?;

        self.log_summary(&track);
        Ok(track)
    }

    /// Like [`track`](Self::track), with the frames split into contiguous chunks
    /// analysed on up to `workers` scoped threads sharing this tracker. The
    /// result is identical to the sequential one.
    pub fn track_parallel(
        &self,
        signal: &[T],
        sample_rate: usize,
        workers: NonZeroUsize,
    ) -> Result<PitchTrack<T>>
    where
        D: Sync,
    {
        let count = self.frames_in(signal, sample_rate)?;
        if count == 0 || workers.get() == 1 {
            return self.track(signal, sample_rate);
        }

        let chunk_length = (count + workers.get() - 1) / workers.get();
        log::debug!(
            "tracking {} frames in chunks of {} on {} workers",
            count,
            chunk_length,
            workers
        );

        let chunks: Vec<Result<Vec<TrackPoint<T>>>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..count)
                .step_by(chunk_length)
                .map(|start| {
                    let end = (start + chunk_length).min(count);
                    scope.spawn(move || {
                        (start..end)
                            .map(|k| self.analyze_frame(signal, sample_rate, k))
                            .collect::<Result<Vec<_>>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });

        let mut track = PitchTrack::with_capacity(count);
        for chunk in chunks {
            chunk?
                .into_iter()
                .for_each(|point| track.push(point.time, point.pitch));
        }

        self.log_summary(&track);
        Ok(track)
    }

    fn frames_in(&self, signal: &[T], sample_rate: usize) -> Result<usize> {
        if sample_rate == 0 {
            return Err(PitchError::InvalidSampleRate);
        }
        Ok(frame_count(signal.len(), self.frame_length(), self.hop_length))
    }

    fn analyze_frame(&self, signal: &[T], sample_rate: usize, k: usize) -> Result<TrackPoint<T>> {
        let start = k * self.hop_length;
        let frame = &signal[start..start + self.frame_length()];
        let time = lit::<T>(start as f64) / lit(sample_rate as f64);

        let pitch = self
            .detector
            .get_pitch(frame, sample_rate, self.threshold)?
            .pitch()
            .filter(|p| p.frequency >= self.min_frequency && p.frequency <= self.max_frequency);

        if pitch.is_none() {
            log::trace!("frame {} at {}s: no pitch in range", k, time);
        }
        Ok(TrackPoint { time, pitch })
    }

    fn log_summary(&self, track: &PitchTrack<T>) {
        log::debug!(
            "tracked {} frames, {} with a pitch",
            track.len(),
            track.frequencies().iter().filter(|f| f.is_some()).count()
        );
    }
}
