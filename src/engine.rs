//! The smoke reveal engine: an opaque overlay that the pointer perforates
//! with short-lived smoke puffs, until a click blows it away for good.

use std::{sync::Arc, time::Duration};

use cgmath::vec2;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    brush::Brush,
    mask::{Mask, Stamp},
    particle::Particle,
};

/// The engine is one-way: once revealed it never conceals again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    Concealed,
    Revealed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    /// Per-frame velocity multiplier.
    pub friction: f32,
    /// Opacity of the per-frame overlay fill that closes old holes.
    pub heal_alpha: f32,
    pub drift_per_move: usize,
    pub explosion_count: usize,
    /// Time between the breach click and the reveal.
    pub reveal_delay: Duration,
    /// Mask resolution relative to the viewport.
    pub resolution_scale: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            friction: 0.95,
            heal_alpha: 20.0 / 255.0,
            drift_per_move: 3,
            explosion_count: 100,
            reveal_delay: Duration::from_millis(800),
            resolution_scale: 0.5,
        }
    }
}

pub struct RevealEngine {
    settings: EngineSettings,
    particles: Vec<Particle>,
    brush: Arc<Brush>,
    mask: Mask,
    viewport: (f32, f32),
    state: RevealState,
    pending_reveal: Option<Duration>,
    stamps: Vec<Stamp>,
    rng: StdRng,
}

fn mask_dimension(extent: f32, scale: f32) -> usize {
    (extent.max(0.0) * scale).ceil() as usize
}

impl RevealEngine {
    pub fn new(settings: EngineSettings, width: f32, height: f32) -> Self {
        Self::with_rng(settings, width, height, StdRng::from_entropy())
    }

    /// Builds an engine whose brush and particles come from `rng`, which
    /// makes runs reproducible.
    pub fn with_rng(settings: EngineSettings, width: f32, height: f32, mut rng: StdRng) -> Self {
        let brush = Arc::new(Brush::generate(&mut rng));
        let scale = settings.resolution_scale;
        let mask = Mask::new(mask_dimension(width, scale), mask_dimension(height, scale));
        log::info!(
            "smoke overlay mounted at {width}x{height} (mask {}x{})",
            mask.width(),
            mask.height()
        );

        Self {
            settings,
            particles: Vec::new(),
            brush,
            mask,
            viewport: (width, height),
            state: RevealState::Concealed,
            pending_reveal: None,
            stamps: Vec::new(),
            rng,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_revealed(&self) -> bool {
        self.state == RevealState::Revealed
    }

    /// True between a breach click and the reveal it schedules.
    pub fn breach_pending(&self) -> bool {
        self.pending_reveal.is_some()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn brush(&self) -> &Arc<Brush> {
        &self.brush
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    /// Appends `count` particles centred on `(x, y)` in viewport pixels.
    pub fn spawn_particles(&mut self, x: f32, y: f32, count: usize, is_explosion: bool) {
        let origin = vec2(x, y);
        let max_size = self.viewport.0;
        let rng = &mut self.rng;
        self.particles.extend((0..count).map(|_| {
            if is_explosion {
                Particle::explosion(rng, origin, max_size)
            } else {
                Particle::drift(rng, origin)
            }
        }));
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.is_revealed() {
            return;
        }
        self.spawn_particles(x, y, self.settings.drift_per_move, false);
    }

    /// Fires a shockwave at `(x, y)`. The first one also arms the reveal;
    /// later clicks during the countdown only add smoke.
    ///
    /// Returns `false` if the overlay is already revealed.
    pub fn on_click(&mut self, x: f32, y: f32) -> bool {
        if self.is_revealed() {
            return false;
        }
        self.spawn_particles(x, y, self.settings.explosion_count, true);
        if self.pending_reveal.is_none() {
            self.pending_reveal = Some(self.settings.reveal_delay);
            log::info!("breach at ({x:.0}, {y:.0}), revealing in {:?}", self.settings.reveal_delay);
        }
        true
    }

    /// Runs the reveal timer forward by `dt` of host time. Returns `true` on
    /// the frame the overlay flips to revealed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(remaining) = self.pending_reveal else {
            return false;
        };

        match remaining.checked_sub(dt) {
            Some(left) if !left.is_zero() => {
                self.pending_reveal = Some(left);
                false
            }
            _ => {
                self.pending_reveal = None;
                self.state = RevealState::Revealed;
                log::info!("overlay revealed");
                true
            }
        }
    }

    /// One animation frame: heal, integrate and erase, then cull.
    pub fn step(&mut self) {
        if !self.is_revealed() {
            self.mask.heal(self.settings.heal_alpha);
        }

        let friction = self.settings.friction;
        let scale = self.settings.resolution_scale;
        self.stamps.clear();
        for particle in &mut self.particles {
            particle.integrate(friction);
            self.stamps.push(particle.stamp(scale));
        }
        self.mask.erase(&self.brush, &self.stamps);

        self.particles.retain(|p| !p.is_spent());
    }

    /// Timer then frame, in host order.
    pub fn frame(&mut self, dt: Duration) -> bool {
        let revealed = self.advance(dt);
        self.step();
        revealed
    }

    /// Reallocates the overlay for a new viewport. Live particles keep their
    /// old coordinates.
    pub fn resize(&mut self, width: f32, height: f32) {
        if (width, height) == self.viewport {
            return;
        }
        let scale = self.settings.resolution_scale;
        self.viewport = (width, height);
        self.mask
            .resize(mask_dimension(width, scale), mask_dimension(height, scale));
        log::info!("smoke overlay resized to {width}x{height}");
    }
}
