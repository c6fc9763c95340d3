//! # tts-player-cpal
//!
//! cpal output backend for tts-player.
//!
//! Provides:
//! - `CpalEngine` — `PlaybackEngine` on the host's default output device
//!   (feature `output`)
//! - `StreamClock` — engine clock that only advances while the stream runs
//! - `voice` — the device-independent output callback
//!
//! ## Platform Requirements
//! - Linux: ALSA development headers (`libasound2-dev`) for the `output` feature
//! - Windows/macOS: no extra setup
//!
//! ## Usage
//! ```ignore
//! use tts_player_cpal::CpalEngine;
//! use tts_player_core::{PlaybackConfiguration, PlaybackController};
//!
//! let engine = CpalEngine::default_device().unwrap();
//! let mut controller = PlaybackController::new(engine, PlaybackConfiguration::default()).unwrap();
//! controller.load(&payload).unwrap();
//! controller.play().unwrap();
//! ```

pub mod clock;
#[cfg(feature = "output")]
pub mod cpal_engine;
pub mod voice;

pub use clock::StreamClock;
#[cfg(feature = "output")]
pub use cpal_engine::CpalEngine;
