use eframe::egui::{Color32, Vec2, vec2};
use rand::Rng;

const MAX_PARTICLES: usize = 1_500;
const DRAG: f32 = 0.94;
const GRAVITY: f32 = 0.06;

#[derive(Clone, Debug)]
pub(in crate::app) struct Particle {
    pub(in crate::app) position: Vec2,
    pub(in crate::app) velocity: Vec2,
    pub(in crate::app) age: u32,
    pub(in crate::app) max_age: u32,
    pub(in crate::app) color: Color32,
    pub(in crate::app) size: f32,
}

impl Particle {
    pub(in crate::app) fn remaining(&self) -> f32 {
        if self.max_age == 0 {
            return 0.0;
        }
        1.0 - (self.age as f32 / self.max_age as f32).clamp(0.0, 1.0)
    }

    fn is_expired(&self) -> bool {
        self.age >= self.max_age
    }
}

#[derive(Default)]
pub(in crate::app) struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub(in crate::app) fn spawn_burst<R: Rng>(
        &mut self,
        origin: Vec2,
        color: Color32,
        radius: f32,
        rng: &mut R,
    ) {
        let count = (radius * 0.4).clamp(14.0, 32.0) as usize;
        let top_speed = 3.0 + radius * 0.05;

        for _ in 0..count {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let direction = vec2(angle.cos(), angle.sin());
            let offset = radius * rng.gen_range(0.3..1.0);
            self.particles.push(Particle {
                position: origin + direction * offset,
                velocity: direction * rng.gen_range(1.5..top_speed),
                age: 0,
                max_age: rng.gen_range(32..56),
                color,
                size: rng.gen_range(2.0..(3.0 + radius * 0.06)),
            });
        }

        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(..excess);
        }
    }

    pub(in crate::app) fn advance(&mut self) {
        for particle in &mut self.particles {
            particle.position += particle.velocity;
            particle.velocity = particle.velocity * DRAG + vec2(0.0, GRAVITY);
            particle.age += 1;
        }
        self.particles.retain(|particle| !particle.is_expired());
    }

    pub(in crate::app) fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    #[cfg(test)]
    pub(in crate::app) fn len(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub(in crate::app) fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub(in crate::app) fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn burst_starts_around_origin_and_fully_retires() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut field = ParticleField::default();
        let origin = vec2(300.0, 200.0);
        field.spawn_burst(origin, Color32::RED, 50.0, &mut rng);

        assert_eq!(field.len(), 20);
        let near_origin = |p: &Particle| (p.position - origin).length() <= 50.0 + 1e-3;
        let fresh = |p: &Particle| p.color == Color32::RED && p.remaining() == 1.0;
        assert!(field.iter().all(near_origin));
        assert!(field.iter().all(fresh));

        for _ in 0..31 {
            field.advance();
        }
        assert_eq!(field.len(), 20);

        for _ in 0..25 {
            field.advance();
        }
        assert!(field.is_empty());
    }

    #[test]
    fn particles_fade_as_they_age() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = ParticleField::default();
        field.spawn_burst(Vec2::ZERO, Color32::GREEN, 10.0, &mut rng);
        assert_eq!(field.len(), 14);

        field.advance();
        let fading = |p: &Particle| p.remaining() < 1.0 && p.remaining() > 0.9;
        assert!(field.iter().all(fading));
    }

    #[test]
    fn field_is_capped() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::default();
        for _ in 0..100 {
            field.spawn_burst(Vec2::ZERO, Color32::WHITE, 100.0, &mut rng);
        }
        assert_eq!(field.len(), MAX_PARTICLES);
    }
}
