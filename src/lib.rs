//! # McLeod Pitch
//! *mcleod_pitch* estimates the fundamental frequency of a monophonic signal
//! with the McLeod Pitch Method (MPM), frame by frame or over a whole recording.
//!
//! # Pipeline
//! For each frame the normalized square difference function (NSDF) is
//! computed with an FFT, its positive peaks are collected, the fundamental is
//! chosen among them and its lag refined by parabolic interpolation.
//!
//!   * [McLeodDetector][detector::mcleod::McLeodDetector] analyses single frames.
//!   * [FrameTracker][tracker::FrameTracker] slides a detector over a signal.
//!   * [dominant_pitch][aggregate::dominant_pitch] reduces a track to one pitch.
//!
//! # Examples
//! ```
//! use mcleod_pitch::detector::mcleod::McLeodDetector;
//! use mcleod_pitch::detector::PitchDetector;
//! use mcleod_pitch::Estimate;
//!
//! const SAMPLE_RATE: usize = 44100;
//! const SIZE: usize = 1024;
//! const THRESHOLD: f64 = 0.1;
//!
//! // Signal coming from some source (microphone, generated, etc...)
//! let dt = 1.0 / SAMPLE_RATE as f64;
//! let freq = 300.0;
//! let signal: Vec<f64> = (0..SIZE)
//!     .map(|x| (2.0 * std::f64::consts::PI * x as f64 * dt * freq).sin())
//!     .collect();
//!
//! let detector = McLeodDetector::new(SIZE).unwrap();
//!
//! match detector.get_pitch(&signal, SAMPLE_RATE, THRESHOLD).unwrap() {
//!     Estimate::Detected(pitch) => {
//!         println!("Frequency: {}, Clarity: {}", pitch.frequency, pitch.clarity)
//!     }
//!     Estimate::NoPitch => println!("No pitch"),
//! }
//! ```
//!
//! Tracking a longer signal:
//! ```
//! use mcleod_pitch::config::{TrackerConfig, DEFAULT_MIN_CLARITY};
//! use mcleod_pitch::tracker::FrameTracker;
//!
//! let signal: Vec<f32> = (0..48000)
//!     .map(|i| (2.0 * std::f32::consts::PI * 196.0 * i as f32 / 48000.0).sin())
//!     .collect();
//!
//! let tracker = FrameTracker::new(&TrackerConfig::default()).unwrap();
//! let track = tracker.track(&signal, 48000).unwrap();
//! let pitch = track.dominant_pitch(DEFAULT_MIN_CLARITY as f32).unwrap();
//! assert!((pitch - 196.0).abs() < 1.0);
//! ```

pub use detector::internals::{Estimate, Pitch};
pub use error::PitchError;

pub mod aggregate;
pub mod config;
pub mod detector;
pub mod error;
pub mod float;
pub mod note;
pub mod tracker;
pub mod utils;
