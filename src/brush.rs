//! Soft "cloud puff" stamp used to erase the overlay.
//!
//! The texture is a square alpha grid built once from a few dozen overlapping
//! radial gradients, then only ever sampled.

use rand::Rng;

pub const BRUSH_SIZE: usize = 300;
const PUFF_COUNT: usize = 30;

/// Alpha gradient stops as `(offset, alpha)`, interpolated linearly.
const GRADIENT: [(f32, f32); 3] = [(0.0, 0.4), (0.5, 0.2), (1.0, 0.0)];

pub struct Brush {
    size: usize,
    alpha: Vec<f32>,
}

fn gradient_alpha(t: f32) -> f32 {
    if t >= 1.0 {
        return 0.0;
    }
    let mut previous = GRADIENT[0];
    for &stop in &GRADIENT[1..] {
        if t <= stop.0 {
            let span = (t - previous.0) / (stop.0 - previous.0);
            return previous.1 + (stop.1 - previous.1) * span;
        }
        previous = stop;
    }
    0.0
}

impl Brush {
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        Self::generate_sized(rng, BRUSH_SIZE)
    }

    pub fn generate_sized<R: Rng>(rng: &mut R, size: usize) -> Self {
        let mut alpha = vec![0.0f32; size * size];
        let center = size as f32 * 0.5;
        let jitter = size as f32 * 0.4;

        for _ in 0..PUFF_COUNT {
            let radius = rng.gen_range(20.0..80.0f32);
            let cx = center + rng.gen_range(-0.5..0.5f32) * jitter;
            let cy = center + rng.gen_range(-0.5..0.5f32) * jitter;

            let x0 = (cx - radius).floor().max(0.0) as usize;
            let y0 = (cy - radius).floor().max(0.0) as usize;
            let x1 = ((cx + radius).ceil() as usize).min(size);
            let y1 = ((cy + radius).ceil() as usize).min(size);

            for y in y0..y1 {
                for x in x0..x1 {
                    let dx = x as f32 + 0.5 - cx;
                    let dy = y as f32 + 0.5 - cy;
                    let t = (dx * dx + dy * dy).sqrt() / radius;
                    let texel = &mut alpha[y * size + x];
                    // additive, like the "lighter" composite op
                    *texel = (*texel + gradient_alpha(t)).min(1.0);
                }
            }
        }

        log::debug!("generated {size}x{size} smoke brush from {PUFF_COUNT} puffs");
        Self { size, alpha }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn texel(&self, x: usize, y: usize) -> f32 {
        self.alpha[y * self.size + x]
    }

    /// Bilinear sample at normalized coordinates; zero outside `[0, 1)`.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        if self.size == 0 || !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return 0.0;
        }

        let last = self.size - 1;
        let fx = (u * self.size as f32 - 0.5).max(0.0);
        let fy = (v * self.size as f32 - 0.5).max(0.0);
        let x0 = (fx as usize).min(last);
        let y0 = (fy as usize).min(last);
        let x1 = (x0 + 1).min(last);
        let y1 = (y0 + 1).min(last);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.texel(x0, y0) * (1.0 - tx) + self.texel(x1, y0) * tx;
        let bottom = self.texel(x0, y1) * (1.0 - tx) + self.texel(x1, y1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}
