//! Pointer-driven "smoke reveal" overlay and the small ambient effects that
//! sit around it: a twinkling star mask and a playback waveform.
//!
//! Everything here is plain CPU state advanced once per frame by the host;
//! the binary in `src/bin/main.rs` wires it into an `eframe` window.

pub mod audio;
pub mod brush;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod mask;
pub mod particle;
pub mod stars;
pub mod waveform;

pub use audio::{AudioState, SharedAudio};
pub use color::Rgba;
pub use config::Config;
pub use engine::{EngineSettings, RevealEngine, RevealState};
pub use error::{Error, Result};
pub use particle::Particle;
pub use stars::{StarField, StarSettings};
pub use waveform::{Waveform, WaveformSettings};
