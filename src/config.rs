//! TOML configuration. Every field has a default, so a missing file or a
//! file with only a couple of keys is fine.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    color::Rgba,
    engine::EngineSettings,
    error::{Error, Result},
    stars::StarSettings,
    waveform::WaveformSettings,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub overlay: OverlayConfig,
    pub particles: ParticleConfig,
    pub stars: StarConfig,
    pub waveform: WaveformConfig,
    pub audio: AudioConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Smoke Reveal".to_owned(),
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub color: Rgba,
    pub heal_alpha: f32,
    pub resolution_scale: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            color: Rgba::BLACK,
            heal_alpha: engine.heal_alpha,
            resolution_scale: engine.resolution_scale,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub friction: f32,
    pub drift_per_move: usize,
    pub explosion_count: usize,
    pub reveal_delay_ms: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            friction: engine.friction,
            drift_per_move: engine.drift_per_move,
            explosion_count: engine.explosion_count,
            reveal_delay_ms: engine.reveal_delay.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub grid_spacing: f32,
    pub star_size: f32,
    pub mask_color: Rgba,
    pub base_opacity: f32,
    pub peak_opacity: f32,
    pub twinkle_speed: f32,
    pub twinkle_chance: f64,
}

impl Default for StarConfig {
    fn default() -> Self {
        let stars = StarSettings::default();
        Self {
            grid_spacing: stars.grid_spacing,
            star_size: stars.star_size,
            mask_color: stars.mask_color,
            base_opacity: stars.base_opacity,
            peak_opacity: stars.peak_opacity,
            twinkle_speed: stars.twinkle_speed,
            twinkle_chance: stars.twinkle_chance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    pub width: f32,
    pub height: f32,
    pub step: f32,
    pub phase_speed: f32,
    pub frequency: f32,
    pub amplitude_ratio: f32,
    pub ease: f32,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        let wave = WaveformSettings::default();
        Self {
            width: wave.width,
            height: wave.height,
            step: wave.step,
            phase_speed: wave.phase_speed,
            frequency: wave.frequency,
            amplitude_ratio: wave.amplitude_ratio,
            ease: wave.ease,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub tracks: Vec<PathBuf>,
    pub autoplay: bool,
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&source)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        let defaults = EngineSettings::default();
        let scale = if self.overlay.resolution_scale > 0.0 {
            self.overlay.resolution_scale.min(1.0)
        } else {
            log::warn!(
                "resolution_scale {} is not positive, using {}",
                self.overlay.resolution_scale,
                defaults.resolution_scale
            );
            defaults.resolution_scale
        };

        EngineSettings {
            friction: self.particles.friction,
            heal_alpha: self.overlay.heal_alpha,
            drift_per_move: self.particles.drift_per_move,
            explosion_count: self.particles.explosion_count,
            reveal_delay: Duration::from_millis(self.particles.reveal_delay_ms),
            resolution_scale: scale,
        }
    }

    pub fn star_settings(&self) -> StarSettings {
        let defaults = StarSettings::default();
        let stars = &self.stars;
        let chance = if (0.0..=1.0).contains(&stars.twinkle_chance) {
            stars.twinkle_chance
        } else {
            log::warn!(
                "twinkle_chance {} is not a probability, using {}",
                stars.twinkle_chance,
                defaults.twinkle_chance
            );
            defaults.twinkle_chance
        };

        StarSettings {
            grid_spacing: stars.grid_spacing,
            star_size: stars.star_size,
            mask_color: stars.mask_color,
            base_opacity: stars.base_opacity,
            peak_opacity: stars.peak_opacity,
            twinkle_speed: stars.twinkle_speed,
            twinkle_chance: chance,
        }
    }

    pub fn waveform_settings(&self) -> WaveformSettings {
        let wave = &self.waveform;
        WaveformSettings {
            width: wave.width,
            height: wave.height,
            step: wave.step,
            phase_speed: wave.phase_speed,
            frequency: wave.frequency,
            amplitude_ratio: wave.amplitude_ratio,
            ease: wave.ease,
        }
    }
}
