use std::f32::consts::TAU;

use cgmath::{Vector2, vec2};
use rand::Rng;

use crate::mask::Stamp;

/// A single puff of smoke.
///
/// Lifetime is governed by two independent clocks: `life` runs down by
/// `decay` every frame and `size` runs up by `growth`. Whichever finishes
/// first retires the particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub size: f32,
    pub max_size: f32,
    pub rotation: f32,
    pub spin: f32,
    pub life: f32,
    pub decay: f32,
    pub growth: f32,
}

impl Particle {
    /// Slow puff left behind by the pointer.
    pub fn drift<R: Rng>(rng: &mut R, origin: Vector2<f32>) -> Self {
        Self {
            position: origin,
            velocity: vec2(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            size: rng.gen_range(20.0..60.0),
            max_size: rng.gen_range(120.0..200.0),
            rotation: rng.gen_range(0.0..TAU),
            spin: rng.gen_range(-0.05..0.05),
            life: 1.0,
            decay: rng.gen_range(0.005..0.015),
            growth: rng.gen_range(1.0..2.5),
        }
    }

    /// Fast shockwave puff. `max_size` is the viewport width so it keeps
    /// growing until it has swept the screen.
    pub fn explosion<R: Rng>(rng: &mut R, origin: Vector2<f32>, max_size: f32) -> Self {
        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(10.0..30.0f32);
        Self {
            position: origin,
            velocity: vec2(angle.cos(), angle.sin()) * speed,
            size: rng.gen_range(80.0..130.0),
            max_size,
            rotation: rng.gen_range(0.0..TAU),
            spin: rng.gen_range(-0.05..0.05),
            life: 1.0,
            decay: 0.005,
            growth: 30.0,
        }
    }

    /// Advances one frame. Velocity is damped after it has moved the puff.
    pub fn integrate(&mut self, friction: f32) {
        self.position += self.velocity;
        self.size += self.growth;
        self.rotation += self.spin;
        self.life -= self.decay;
        self.velocity *= friction;
    }

    pub fn is_spent(&self) -> bool {
        self.life <= 0.0 || self.size >= self.max_size
    }

    /// The brush impression for this frame, mapped into a mask that is
    /// `scale` times the viewport resolution.
    pub fn stamp(&self, scale: f32) -> Stamp {
        Stamp {
            center: self.position * scale,
            size: self.size * scale,
            rotation: self.rotation,
            alpha: self.life,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn drift_particles_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let p = Particle::drift(&mut rng, vec2(10.0, 20.0));
            assert_eq!(p.position, vec2(10.0, 20.0));
            assert!(p.velocity.x.abs() <= 1.0 && p.velocity.y.abs() <= 1.0);
            assert!((20.0..60.0).contains(&p.size));
            assert!((120.0..200.0).contains(&p.max_size));
            assert!((0.005..0.015).contains(&p.decay));
            assert!((1.0..2.5).contains(&p.growth));
            assert_eq!(p.life, 1.0);
        }
    }

    #[test]
    fn explosion_particles_are_fast_and_unbounded() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let p = Particle::explosion(&mut rng, vec2(0.0, 0.0), 1920.0);
            let speed = p.velocity.magnitude();
            assert!((9.999..30.001).contains(&speed), "speed {speed}");
            assert!((80.0..130.0).contains(&p.size));
            assert_eq!(p.max_size, 1920.0);
            assert_eq!(p.decay, 0.005);
            assert_eq!(p.growth, 30.0);
        }
    }

    #[test]
    fn integrate_moves_before_damping() {
        let mut p = Particle::drift(&mut StdRng::seed_from_u64(9), vec2(0.0, 0.0));
        p.velocity = vec2(2.0, -4.0);
        p.integrate(0.95);
        assert_eq!(p.position, vec2(2.0, -4.0));
        assert!((p.velocity - vec2(1.9, -3.8)).magnitude() < 1e-6);
    }

    #[test]
    fn stamp_scales_geometry_but_not_rotation() {
        let mut p = Particle::drift(&mut StdRng::seed_from_u64(9), vec2(100.0, 50.0));
        p.size = 40.0;
        p.life = 0.6;
        let stamp = p.stamp(0.5);
        assert_eq!(stamp.center, vec2(50.0, 25.0));
        assert_eq!(stamp.size, 20.0);
        assert_eq!(stamp.rotation, p.rotation);
        assert_eq!(stamp.alpha, 0.6);
    }
}
