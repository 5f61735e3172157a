//! Helix: a hundred colored spheres on a rising spiral, bobbing and pulsing
//! around a wandering point light.

use glam::Vec3;
use reel_engine::*;

const SPHERES: usize = 100;
/// Matches a per-frame increment of 0.01 at 60 fps.
const RATE: f32 = 0.6;

pub struct Helix {
    spheres: Vec<EntityId>,
    light: Option<EntityId>,
}

impl Helix {
    pub fn new() -> Self {
        Self {
            spheres: Vec::new(),
            light: None,
        }
    }

    fn coil(&mut self, _f: &mut Frame<'_>, _p: f32) {}
}

fn spiral(i: usize) -> Vec3 {
    let angle = i as f32 * 0.2;
    let radius = 0.1 * i as f32;
    Vec3::new(angle.cos() * radius, 0.05 * i as f32, angle.sin() * radius)
}

impl Choreography for Helix {
    const STAGES: &'static [StageHandler<Self>] = &[Self::coil];

    fn name(&self) -> &str {
        "Helix"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        StageSchedule::from_pairs(&[("coil", 10.0)])
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        cast.spawn(Entity::new().with_tag("ambient").with_light(Light::ambient(Color::from_hex(0x404040), 0.5)));
        for i in 0..SPHERES {
            let hue = (i % 20) as f32 / 20.0;
            let material = Material::standard(Color::from_hsl(hue, 1.0, 0.5))
                .with_metalness(0.4)
                .with_roughness(0.6);
            let mesh = Mesh::new(Geometry::Sphere { radius: 0.2, segments: 32 }, material);
            self.spheres.push(cast.spawn(Entity::new().with_tag("bead").with_mesh(mesh)));
        }
        self.light = Some(cast.spawn(Entity::new().with_tag("lamp").with_light(Light::point(Color::WHITE, 15.0, 50.0))));
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        f.each(&self.spheres, |i, e| {
            e.position = spiral(i);
            e.scale = Vec3::ONE;
        });
        f.with(self.light, |e| e.position = Vec3::ZERO);
    }

    fn continuous(&mut self, f: &mut Frame<'_>) {
        let t = f.time * RATE;
        f.each(&self.spheres, |i, e| {
            let k = i as f32;
            e.position.y = extensions::oscillate(0.05 * k, 0.5, 1.0, k * 0.1, t);
            e.scale = Vec3::splat(0.8 + (t * 3.0 + k * 0.3).sin() * 0.2);
        });
        f.with(self.light, |e| {
            e.position = Vec3::new(t.sin() * 3.0, (t * 2.0).sin() * 2.0, t.cos() * 3.0);
        });
    }

    fn teardown(&mut self) {
        self.spheres.clear();
        self.light = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::*;

    #[test]
    fn smoke_cycle() {
        smoke(Helix::new());
    }

    #[test]
    fn beads_keep_spiral_footprint() {
        let (mut ctx, mut tl) = start(Helix::new());
        run_to(&mut ctx, &mut tl, 3.3, 0.05);
        let ids = tl.choreography().spheres.clone();
        assert_eq!(ids.len(), SPHERES);
        for (i, id) in ids.iter().enumerate() {
            let e = ctx.scene.get(*id).unwrap();
            let rest = spiral(i);
            assert!((e.position.x - rest.x).abs() < 1e-5);
            assert!((e.position.z - rest.z).abs() < 1e-5);
            assert!((e.position.y - rest.y).abs() <= 0.5 + 1e-4);
            assert!(e.scale.x >= 0.6 - 1e-4 && e.scale.x <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn same_pose_for_any_split() {
        crate::common::testing::same_pose_for_any_split(Helix::new, &[3.3, 9.9, 12.5], &[]);
    }
}
