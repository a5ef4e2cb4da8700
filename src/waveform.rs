//! The little sine line that shows whether the background track is playing.

use cgmath::{Vector2, vec2};

use crate::color::Rgba;

pub const PLAYING_COLOR: Rgba = Rgba::rgb(0xa2, 0x59, 0xeb);
pub const IDLE_COLOR: Rgba = Rgba::WHITE;

#[derive(Clone, Debug, PartialEq)]
pub struct WaveformSettings {
    pub width: f32,
    pub height: f32,
    /// Horizontal distance between polyline vertices.
    pub step: f32,
    pub phase_speed: f32,
    pub frequency: f32,
    /// Peak amplitude as a fraction of `height` while playing.
    pub amplitude_ratio: f32,
    /// Fraction of the remaining amplitude gap closed each frame.
    pub ease: f32,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 24.0,
            step: 6.0,
            phase_speed: 0.03,
            frequency: 2.0,
            amplitude_ratio: 0.2,
            ease: 0.1,
        }
    }
}

pub struct Waveform {
    settings: WaveformSettings,
    phase: f32,
    amplitude: f32,
}

impl Waveform {
    pub fn new(settings: WaveformSettings) -> Self {
        Self {
            settings,
            phase: 0.0,
            amplitude: 0.0,
        }
    }

    pub fn settings(&self) -> &WaveformSettings {
        &self.settings
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn target_amplitude(&self, playing: bool) -> f32 {
        if playing {
            self.settings.height * self.settings.amplitude_ratio
        } else {
            0.0
        }
    }

    pub fn update(&mut self, playing: bool) {
        self.phase += self.settings.phase_speed;
        let target = self.target_amplitude(playing);
        self.amplitude += (target - self.amplitude) * self.settings.ease.clamp(0.0, 1.0);
        if (target - self.amplitude).abs() < 1e-3 {
            self.amplitude = target;
        }
    }

    /// Polyline in local coordinates, `(0, 0)` at the top left of the box.
    pub fn points(&self) -> Vec<Vector2<f32>> {
        let WaveformSettings {
            width,
            height,
            step,
            frequency,
            ..
        } = self.settings;
        let mid = height / 2.0;

        let mut points = vec![vec2(0.0, mid)];
        if step <= 0.0 {
            return points;
        }
        let samples = (width / step).floor().max(0.0) as usize;
        points.extend((0..=samples).map(|i| {
            let x = i as f32 * step;
            vec2(x, mid + (x * frequency + self.phase).sin() * self.amplitude)
        }));
        points
    }

    pub fn color(playing: bool) -> Rgba {
        if playing { PLAYING_COLOR } else { IDLE_COLOR }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn idle_wave_is_flat() {
        let mut wave = Waveform::new(WaveformSettings::default());
        wave.update(false);
        let points = wave.points();
        // leading move-to plus x = 0, 6, ..., 96
        assert_eq!(points.len(), 18);
        assert!(points.iter().all(|p| p.y == 12.0));
        assert_eq!(points.last().map(|p| p.x), Some(96.0));
    }

    #[test]
    fn amplitude_eases_toward_target() {
        let mut wave = Waveform::new(WaveformSettings::default());
        let target = wave.target_amplitude(true);
        assert!((target - 4.8).abs() < 1e-6);

        let mut last = 0.0;
        for _ in 0..20 {
            wave.update(true);
            assert!(wave.amplitude() > last);
            assert!(wave.amplitude() <= target);
            last = wave.amplitude();
        }
        for _ in 0..200 {
            wave.update(true);
        }
        assert_eq!(wave.amplitude(), target);

        for _ in 0..200 {
            wave.update(false);
        }
        assert_eq!(wave.amplitude(), 0.0);
    }

    #[test]
    fn playing_wave_stays_inside_its_box() {
        let mut wave = Waveform::new(WaveformSettings::default());
        for _ in 0..300 {
            wave.update(true);
        }
        let points = wave.points();
        assert!(points.iter().any(|p| p.y != 12.0));
        assert!(points.iter().all(|p| (0.0..=24.0).contains(&p.y)));
    }

    #[test]
    fn phase_advances_every_frame() {
        let mut wave = Waveform::new(WaveformSettings::default());
        for _ in 0..10 {
            wave.update(false);
        }
        assert!((wave.phase() - 0.3).abs() < 1e-5);
    }

    #[test]
    fn stroke_color_tracks_playback() {
        assert_eq!(Waveform::color(true), PLAYING_COLOR);
        assert_eq!(Waveform::color(false), Rgba::WHITE);
    }
}
