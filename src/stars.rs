//! A tinted mask with a regular grid of faint stars, a handful of which
//! slowly swell and fade at any moment.

use cgmath::{Vector2, vec2};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::color::Rgba;

#[derive(Clone, Debug, PartialEq)]
pub struct StarSettings {
    pub grid_spacing: f32,
    pub star_size: f32,
    pub mask_color: Rgba,
    pub base_opacity: f32,
    pub peak_opacity: f32,
    /// Opacity change per frame while twinkling.
    pub twinkle_speed: f32,
    /// Per star, per frame.
    pub twinkle_chance: f64,
}

impl Default for StarSettings {
    fn default() -> Self {
        Self {
            grid_spacing: 50.0,
            star_size: 2.0,
            mask_color: Rgba::rgba(0, 0, 0, 153),
            base_opacity: 0.1,
            peak_opacity: 0.6,
            twinkle_speed: 0.005,
            twinkle_chance: 0.00005,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub position: Vector2<f32>,
    pub opacity: f32,
    pub target_opacity: f32,
    pub twinkling: bool,
}

pub struct StarField {
    settings: StarSettings,
    width: f32,
    height: f32,
    stars: Vec<Star>,
    rng: StdRng,
}

impl StarField {
    pub fn new(settings: StarSettings, width: f32, height: f32) -> Self {
        Self::with_rng(settings, width, height, StdRng::from_entropy())
    }

    pub fn with_rng(settings: StarSettings, width: f32, height: f32, rng: StdRng) -> Self {
        let mut field = Self {
            settings,
            width,
            height,
            stars: Vec::new(),
            rng,
        };
        field.populate();
        field
    }

    pub fn settings(&self) -> &StarSettings {
        &self.settings
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn populate(&mut self) {
        self.stars.clear();
        let spacing = self.settings.grid_spacing;
        if spacing <= 0.0 {
            log::warn!("star grid spacing {spacing} is not positive, no stars drawn");
            return;
        }

        let base = self.settings.base_opacity;
        let columns = (self.width / spacing).ceil().max(0.0) as usize;
        let rows = (self.height / spacing).ceil().max(0.0) as usize;
        self.stars.reserve(columns * rows);
        for column in 0..columns {
            for row in 0..rows {
                let x = column as f32 * spacing + spacing / 2.0;
                let y = row as f32 * spacing + spacing / 2.0;
                self.stars.push(Star {
                    position: vec2(x, y),
                    opacity: base,
                    target_opacity: base,
                    twinkling: false,
                });
            }
        }
    }

    /// Throws the old grid away and lays out a new one for the new size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.populate();
        log::debug!("star field rebuilt with {} stars", self.stars.len());
    }

    /// Advances every star by one frame.
    pub fn update(&mut self) {
        let StarSettings {
            base_opacity,
            peak_opacity,
            twinkle_speed,
            twinkle_chance,
            ..
        } = self.settings;
        // gen_bool panics on NaN
        let chance = if twinkle_chance.is_finite() {
            twinkle_chance.clamp(0.0, 1.0)
        } else {
            0.0
        };

        for star in &mut self.stars {
            if !star.twinkling && self.rng.gen_bool(chance) {
                star.twinkling = true;
                star.target_opacity = peak_opacity;
            }

            if !star.twinkling {
                continue;
            }

            if star.opacity < star.target_opacity {
                star.opacity += twinkle_speed;
                if star.opacity >= star.target_opacity {
                    star.target_opacity = base_opacity;
                }
            } else if star.opacity > star.target_opacity {
                star.opacity -= twinkle_speed;
                if star.opacity <= base_opacity {
                    star.opacity = base_opacity;
                    star.twinkling = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(settings: StarSettings, width: f32, height: f32) -> StarField {
        StarField::with_rng(settings, width, height, StdRng::seed_from_u64(5))
    }

    #[test]
    fn grid_is_centred_in_cells() {
        let field = field(StarSettings::default(), 120.0, 60.0);
        let positions: Vec<_> = field.stars().iter().map(|s| (s.position.x, s.position.y)).collect();
        assert_eq!(
            positions,
            vec![(25.0, 25.0), (25.0, 75.0), (75.0, 25.0), (75.0, 75.0), (125.0, 25.0), (125.0, 75.0)]
        );
        assert!(field.stars().iter().all(|s| s.opacity == 0.1 && !s.twinkling));
    }

    #[test]
    fn resize_replaces_the_whole_grid() {
        let mut field = field(StarSettings::default(), 1000.0, 1000.0);
        assert_eq!(field.stars().len(), 400);

        field.resize(200.0, 100.0);
        assert_eq!(field.size(), (200.0, 100.0));
        assert_eq!(field.stars().len(), 8);
        assert!(field.stars().iter().all(|s| s.position.x < 200.0 && s.position.y < 100.0));
    }

    #[test]
    fn twinkle_rises_to_peak_and_settles_back() {
        let settings = StarSettings {
            twinkle_chance: 1.0,
            twinkle_speed: 0.1,
            ..StarSettings::default()
        };
        let mut field = field(settings, 50.0, 50.0);

        let mut peak = 0.0f32;
        let mut frames = 0;
        loop {
            field.update();
            frames += 1;
            let star = field.stars()[0];
            peak = peak.max(star.opacity);
            if !star.twinkling {
                assert_eq!(star.opacity, 0.1);
                break;
            }
            assert!(frames < 100, "twinkle never finished");
        }
        assert!(peak >= 0.6 - 1e-4);
        assert!(peak < 0.6 + 0.1 + 1e-4);
    }

    #[test]
    fn zero_chance_never_twinkles() {
        let settings = StarSettings {
            twinkle_chance: 0.0,
            ..StarSettings::default()
        };
        let mut field = field(settings, 500.0, 500.0);
        for _ in 0..100 {
            field.update();
        }
        assert!(field.stars().iter().all(|s| !s.twinkling && s.opacity == 0.1));
    }

    #[test]
    fn nan_chance_never_twinkles() {
        let settings = StarSettings {
            twinkle_chance: f64::NAN,
            ..StarSettings::default()
        };
        let mut field = field(settings, 200.0, 200.0);
        for _ in 0..10 {
            field.update();
        }
        assert!(field.stars().iter().all(|s| !s.twinkling));
    }

    #[test]
    fn degenerate_spacing_yields_no_stars() {
        let settings = StarSettings {
            grid_spacing: 0.0,
            ..StarSettings::default()
        };
        assert!(field(settings, 100.0, 100.0).stars().is_empty());
    }
}
