// extensions/particle.rs
//
// Fixed-capacity particle pools recycled in place.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Remaining life in [0, 1]; dead at or below zero.
    pub life: f32,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity, life: 1.0 }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO)
    }
}

/// Advance one particle by `dt`: integrate velocity, apply gravity, burn life.
#[inline]
pub fn step(p: &mut Particle, dt: f32, gravity: Vec3, decay: f32) {
    p.velocity += gravity * dt;
    p.position += p.velocity * dt;
    p.life -= decay * dt;
}

/// Axis-aligned bounds particles must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Pool of particles whose length never changes after construction.
#[derive(Debug, Clone)]
pub struct ParticleSet {
    particles: Vec<Particle>,
    pub gravity: Vec3,
    pub decay: f32,
    pub bounds: Option<Aabb>,
}

impl ParticleSet {
    pub fn new(capacity: usize, mut spawn: impl FnMut(usize) -> Particle) -> Self {
        Self {
            particles: (0..capacity).map(&mut spawn).collect(),
            gravity: Vec3::ZERO,
            decay: 0.0,
            bounds: None,
        }
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Step every particle, then overwrite dead or escaped ones with
    /// `respawn(index, old)`. Returns how many were recycled.
    pub fn update(&mut self, dt: f32, mut respawn: impl FnMut(usize, &Particle) -> Particle) -> usize {
        let mut recycled = 0;
        for (i, p) in self.particles.iter_mut().enumerate() {
            step(p, dt, self.gravity, self.decay);
            let escaped = self.bounds.map_or(false, |b| !b.contains(p.position));
            if !p.is_alive() || escaped {
                *p = respawn(i, p);
                recycled += 1;
            }
        }
        recycled
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Copy positions into a vertex buffer, up to the shorter length.
    pub fn write_positions(&self, out: &mut [Vec3]) {
        for (dst, p) in out.iter_mut().zip(&self.particles) {
            *dst = p.position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_applies_gravity_and_decay() {
        let mut p = Particle::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        step(&mut p, 0.5, Vec3::new(0.0, -2.0, 0.0), 2.0);
        assert_eq!(p.velocity, Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(p.position, Vec3::new(0.5, -0.5, 0.0));
        assert_eq!(p.life, 0.0);
        assert!(!p.is_alive());
    }

    #[test]
    fn recycling_keeps_capacity() {
        let mut set = ParticleSet::new(50, |_| Particle::new(Vec3::new(0.0, 20.0, 0.0), Vec3::new(0.0, -10.0, 0.0)))
            .with_bounds(Aabb::new(Vec3::splat(-30.0), Vec3::new(30.0, 25.0, 30.0)));
        let mut total = 0;
        for _ in 0..600 {
            total += set.update(1.0 / 60.0, |_, _| Particle::new(Vec3::new(0.0, 20.0, 0.0), Vec3::new(0.0, -10.0, 0.0)));
            assert_eq!(set.len(), 50);
        }
        assert!(total >= 50);
        assert!(set.particles().iter().all(|p| p.position.y >= -30.0));
    }

    #[test]
    fn dead_particles_respawn() {
        let mut set = ParticleSet::new(3, |_| Particle::default()).with_decay(2.0);
        let recycled = set.update(1.0, |i, _| Particle::new(Vec3::splat(i as f32), Vec3::ZERO));
        assert_eq!(recycled, 3);
        assert_eq!(set.particles()[2].position, Vec3::splat(2.0));
        assert_eq!(set.particles()[2].life, 1.0);
    }
}
