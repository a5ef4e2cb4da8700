//! The overlay surface the smoke is carved out of.
//!
//! Every fill uses the same overlay color, so only coverage is stored: one
//! alpha value per pixel. Healing is a source-over fill, erasing is a
//! destination-out stamp of the brush.

use cgmath::Vector2;
use rayon::prelude::*;

use crate::{brush::Brush, color::Rgba};

/// Coverage below half an 8-bit step is treated as a clean hole.
const ERASED: f32 = 1.0 / 512.0;

/// One brush impression in mask pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stamp {
    pub center: Vector2<f32>,
    pub size: f32,
    pub rotation: f32,
    pub alpha: f32,
}

/// Precomputed per-frame data for a stamp so rows don't redo the trig.
struct Footprint {
    center: Vector2<f32>,
    inv_size: f32,
    cos: f32,
    sin: f32,
    alpha: f32,
    min: Vector2<f32>,
    max: Vector2<f32>,
}

impl Footprint {
    fn new(stamp: &Stamp) -> Self {
        // a rotated square never leaves the circle through its corners
        let reach = stamp.size * std::f32::consts::FRAC_1_SQRT_2;
        Self {
            center: stamp.center,
            inv_size: 1.0 / stamp.size,
            cos: stamp.rotation.cos(),
            sin: stamp.rotation.sin(),
            alpha: stamp.alpha.min(1.0),
            min: stamp.center - Vector2::new(reach, reach),
            max: stamp.center + Vector2::new(reach, reach),
        }
    }

    fn brush_coords(&self, px: f32, py: f32) -> (f32, f32) {
        let dx = px - self.center.x;
        let dy = py - self.center.y;
        let lx = dx * self.cos + dy * self.sin;
        let ly = dy * self.cos - dx * self.sin;
        (lx * self.inv_size + 0.5, ly * self.inv_size + 0.5)
    }
}

pub struct Mask {
    width: usize,
    height: usize,
    alpha: Vec<f32>,
}

impl Mask {
    /// A fully opaque mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![1.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.is_empty()
    }

    pub fn alpha_at(&self, x: usize, y: usize) -> f32 {
        self.alpha[y * self.width + x]
    }

    /// Mean coverage, 1.0 for a fully opaque mask.
    pub fn coverage(&self) -> f32 {
        if self.alpha.is_empty() {
            return 0.0;
        }
        self.alpha.iter().sum::<f32>() / self.alpha.len() as f32
    }

    /// Reallocates at the new size, opaque again.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.alpha.clear();
        self.alpha.resize(width * height, 1.0);
    }

    /// Source-over fill of the overlay color at `amount` opacity.
    pub fn heal(&mut self, amount: f32) {
        let amount = amount.clamp(0.0, 1.0);
        self.alpha
            .par_iter_mut()
            .for_each(|a| *a = amount + *a * (1.0 - amount));
    }

    /// Destination-out composite of `brush` at every stamp.
    ///
    /// Destination-out only ever multiplies coverage by `1 - s`, so stamps
    /// commute and each row can be processed independently.
    pub fn erase(&mut self, brush: &Brush, stamps: &[Stamp]) {
        if self.is_empty() || brush.size() == 0 {
            return;
        }

        let footprints: Vec<_> = stamps
            .iter()
            .filter(|s| s.alpha > 0.0 && s.size > 0.0)
            .map(Footprint::new)
            .collect();
        if footprints.is_empty() {
            return;
        }

        let width = self.width;
        self.alpha
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let py = y as f32 + 0.5;
                for fp in footprints.iter().filter(|fp| fp.min.y <= py && py <= fp.max.y) {
                    let x0 = fp.min.x.floor().max(0.0) as usize;
                    let x1 = (fp.max.x.ceil().max(0.0) as usize).min(width);
                    for (x, a) in row.iter_mut().enumerate().take(x1).skip(x0) {
                        if *a == 0.0 {
                            continue;
                        }
                        let (u, v) = fp.brush_coords(x as f32 + 0.5, py);
                        let s = brush.sample(u, v) * fp.alpha;
                        if s <= 0.0 {
                            continue;
                        }
                        *a *= 1.0 - s;
                        if *a <= ERASED {
                            *a = 0.0;
                        }
                    }
                }
            });
    }

    /// Writes the mask as straight RGBA8 pixels of `color`.
    pub fn write_rgba(&self, color: Rgba, out: &mut Vec<u8>) {
        out.clear();
        out.resize(self.alpha.len() * 4, 0);
        let base = color.alpha();
        out.par_chunks_exact_mut(4)
            .zip(self.alpha.par_iter())
            .for_each(|(px, a)| {
                px[0] = color.r;
                px[1] = color.g;
                px[2] = color.b;
                px[3] = (a * base * 255.0).round() as u8;
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{SeedableRng, rngs::StdRng};

    fn brush() -> Brush {
        Brush::generate(&mut StdRng::seed_from_u64(42))
    }

    #[test]
    fn new_mask_is_opaque() {
        let mask = Mask::new(8, 4);
        assert_eq!(mask.coverage(), 1.0);
        assert_eq!(mask.alpha_at(7, 3), 1.0);
    }

    #[test]
    fn heal_is_source_over() {
        let mut mask = Mask::new(2, 2);
        mask.alpha.iter_mut().for_each(|a| *a = 0.0);
        mask.heal(0.08);
        assert!((mask.alpha_at(0, 0) - 0.08).abs() < 1e-6);
        mask.heal(0.08);
        assert!((mask.alpha_at(1, 1) - (0.08 + 0.08 * 0.92)).abs() < 1e-6);
    }

    #[test]
    fn repeated_healing_converges_to_opaque() {
        let mut mask = Mask::new(4, 4);
        mask.alpha.iter_mut().for_each(|a| *a = 0.0);
        // about a second and a half at 60 fps
        for _ in 0..90 {
            mask.heal(20.0 / 255.0);
        }
        assert!(mask.coverage() > 0.99);
    }

    #[test]
    fn erase_cuts_a_hole_only_near_the_stamp() {
        let mut mask = Mask::new(200, 200);
        let stamp = Stamp {
            center: Vector2::new(50.0, 50.0),
            size: 60.0,
            rotation: 0.3,
            alpha: 1.0,
        };
        mask.erase(&brush(), &[stamp]);

        assert!(mask.alpha_at(50, 50) < 1.0);
        assert_eq!(mask.alpha_at(150, 150), 1.0);
        assert_eq!(mask.alpha_at(199, 0), 1.0);
        assert!(mask.alpha.iter().all(|a| (0.0..=1.0).contains(a)));
    }

    #[test]
    fn faint_pixels_outside_the_brush_are_left_alone() {
        let mut mask = Mask::new(100, 100);
        // inside the stamp's bounding box, past the brush's corner
        mask.alpha[90 * 100 + 90] = 0.001;
        let stamp = Stamp {
            center: Vector2::new(50.0, 50.0),
            size: 60.0,
            rotation: 0.0,
            alpha: 1.0,
        };
        mask.erase(&brush(), &[stamp]);
        assert_eq!(mask.alpha_at(90, 90), 0.001);
    }

    #[test]
    fn erase_order_does_not_matter() {
        let brush = brush();
        let a = Stamp {
            center: Vector2::new(20.0, 20.0),
            size: 40.0,
            rotation: 0.0,
            alpha: 0.7,
        };
        let b = Stamp {
            center: Vector2::new(30.0, 25.0),
            size: 50.0,
            rotation: 1.2,
            alpha: 0.4,
        };

        let mut forward = Mask::new(64, 64);
        forward.erase(&brush, &[a, b]);
        let mut backward = Mask::new(64, 64);
        backward.erase(&brush, &[b]);
        backward.erase(&brush, &[a]);

        for (x, y) in forward.alpha.iter().zip(&backward.alpha) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn transparent_or_offscreen_stamps_are_ignored() {
        let mut mask = Mask::new(32, 32);
        let brush = brush();
        mask.erase(
            &brush,
            &[
                Stamp { center: Vector2::new(16.0, 16.0), size: 30.0, rotation: 0.0, alpha: 0.0 },
                Stamp { center: Vector2::new(16.0, 16.0), size: 30.0, rotation: 0.0, alpha: -0.2 },
                Stamp { center: Vector2::new(-500.0, 900.0), size: 30.0, rotation: 0.0, alpha: 1.0 },
            ],
        );
        assert_eq!(mask.coverage(), 1.0);
    }

    #[test]
    fn empty_mask_is_a_no_op() {
        let mut mask = Mask::new(0, 0);
        mask.heal(0.5);
        mask.erase(
            &brush(),
            &[Stamp { center: Vector2::new(0.0, 0.0), size: 10.0, rotation: 0.0, alpha: 1.0 }],
        );
        assert!(mask.is_empty());
        assert_eq!(mask.coverage(), 0.0);
    }

    #[test]
    fn resize_resets_to_opaque() {
        let mut mask = Mask::new(4, 4);
        mask.alpha.iter_mut().for_each(|a| *a = 0.25);
        mask.resize(6, 3);
        assert_eq!((mask.width(), mask.height()), (6, 3));
        assert_eq!(mask.coverage(), 1.0);
    }

    #[test]
    fn rgba_carries_overlay_color_and_coverage() {
        let mut mask = Mask::new(2, 1);
        mask.alpha[1] = 0.5;
        let mut out = Vec::new();
        mask.write_rgba(Rgba::rgb(17, 34, 51), &mut out);
        assert_eq!(out, vec![17, 34, 51, 255, 17, 34, 51, 128]);
    }
}
