//! Verlet confetti burst

use glam::Vec3;
use rand::Rng;

/// Random spread around the hit point
const SPAWN_SPREAD: f32 = 0.1;
/// Lifespan lost per second
const LIFESPAN_DECAY: f32 = 0.8;
/// Subtracted from each particle's vertical acceleration every update
const GRAVITY_STEP: f32 = 0.2;

/// Palette (sRGB, 0xRRGGBB)
pub const COLORS: [u32; 6] = [0xf4d35e, 0xee964b, 0xf95738, 0x0d3b66, 0x83c5be, 0xffffff];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfettiParticle {
    pub position: Vec3,
    pub previous: Vec3,
    pub acceleration: Vec3,
    /// 1 at spawn, dead at 0
    pub lifespan: f32,
    /// Index into `COLORS`
    pub color: usize,
}

impl ConfettiParticle {
    pub fn is_alive(&self) -> bool {
        self.lifespan > 0.0
    }
}

/// Fixed-size particle pool, re-seeded on every burst
#[derive(Debug, Clone, Default)]
pub struct Confetti {
    particles: Vec<ConfettiParticle>,
}

impl Confetti {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particles(&self) -> &[ConfettiParticle] {
        &self.particles
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// Spawn `count` particles at `origin`, replacing any previous burst
    pub fn explode<R: Rng + ?Sized>(&mut self, origin: Vec3, count: usize, rng: &mut R) {
        self.particles.clear();
        self.particles.extend((0..count).map(|i| {
            let position = origin
                + Vec3::new(
                    rng.random_range(-SPAWN_SPREAD..SPAWN_SPREAD),
                    rng.random_range(-SPAWN_SPREAD..SPAWN_SPREAD),
                    rng.random_range(-SPAWN_SPREAD..SPAWN_SPREAD),
                );
            ConfettiParticle {
                position,
                previous: position,
                acceleration: Vec3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-0.5..0.5),
                    rng.random_range(-0.5..0.5),
                ),
                lifespan: 1.0,
                color: i % COLORS.len(),
            }
        }));
    }

    pub fn update(&mut self, dt: f32) {
        for p in self.particles.iter_mut().filter(|p| p.is_alive()) {
            p.acceleration.y -= GRAVITY_STEP;
            let velocity = p.position - p.previous;
            p.previous = p.position;
            p.position += velocity + p.acceleration * dt * dt;
            p.lifespan = (p.lifespan - LIFESPAN_DECAY * dt).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_spawns_near_origin() {
        let mut confetti = Confetti::new();
        let origin = Vec3::new(0.0, 1.0, 0.0);
        confetti.explode(origin, 200, &mut Pcg32::seed_from_u64(1));
        assert_eq!(confetti.alive_count(), 200);
        assert!(confetti
            .particles()
            .iter()
            .all(|p| (p.position - origin).abs().max_element() <= SPAWN_SPREAD));
    }

    #[test]
    fn test_particles_fall_and_die() {
        let mut confetti = Confetti::new();
        confetti.explode(Vec3::ZERO, 10, &mut Pcg32::seed_from_u64(2));
        let start: f32 = confetti.particles().iter().map(|p| p.position.y).sum();

        for _ in 0..30 {
            confetti.update(1.0 / 60.0);
        }
        let later: f32 = confetti.particles().iter().map(|p| p.position.y).sum();
        assert!(later < start);

        for _ in 0..60 {
            confetti.update(1.0 / 60.0);
        }
        assert_eq!(confetti.alive_count(), 0);
    }

    #[test]
    fn test_new_burst_replaces_old() {
        let mut confetti = Confetti::new();
        let mut rng = Pcg32::seed_from_u64(3);
        confetti.explode(Vec3::ZERO, 50, &mut rng);
        confetti.explode(Vec3::ONE, 20, &mut rng);
        assert_eq!(confetti.particles().len(), 20);
    }
}
