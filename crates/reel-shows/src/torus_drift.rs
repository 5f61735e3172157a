//! Torus Drift: a metallic torus turning inside a slowly rotating dust cloud.

use glam::Vec3;
use reel_engine::*;

use crate::common;

const DUST_COUNT: usize = 1000;

pub struct TorusDrift {
    torus: Option<EntityId>,
    dust: Option<EntityId>,
}

impl TorusDrift {
    pub fn new() -> Self {
        Self { torus: None, dust: None }
    }

    fn drift(&mut self, _f: &mut Frame<'_>, _p: f32) {}
}

impl Choreography for TorusDrift {
    const STAGES: &'static [StageHandler<Self>] = &[Self::drift];

    fn name(&self) -> &str {
        "Torus Drift"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        StageSchedule::from_pairs(&[("drift", 8.0)])
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        common::key_and_fill(cast, 0.5, 1.0);
        let geometry = Geometry::Torus {
            radius: 3.0,
            tube: 1.0,
            radial_segments: 16,
            tubular_segments: 100,
        };
        let material = Material::standard(Color::from_hex(0xff5533)).with_metalness(0.7).with_roughness(0.2);
        self.torus = Some(cast.spawn(Entity::new().with_tag("torus").with_mesh(Mesh::new(geometry, material))));
        self.dust = Some(common::star_field(cast, DUST_COUNT, Vec3::splat(7.5), Vec3::ZERO, 0.05));
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        f.with(self.torus, |e| e.rotation = Vec3::ZERO);
        f.with(self.dust, |e| e.rotation = Vec3::ZERO);
    }

    fn continuous(&mut self, f: &mut Frame<'_>) {
        let t = f.time * 0.6;
        f.with(self.torus, |e| e.rotation = Vec3::new(t * 0.5, t * 0.3, 0.0));
        f.with(self.dust, |e| e.rotation.y = t * 0.1);
    }

    fn teardown(&mut self) {
        self.torus = None;
        self.dust = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::*;

    #[test]
    fn smoke_cycle() {
        smoke(TorusDrift::new());
    }

    #[test]
    fn dust_cloud_has_every_point() {
        let (ctx, tl) = start(TorusDrift::new());
        let dust = entity(&ctx, tl.choreography().dust);
        let mesh = dust.mesh.as_ref().unwrap();
        assert_eq!(mesh.vertices.len(), DUST_COUNT);
        assert!(mesh.vertices.iter().all(|v| v.abs().max_element() <= 7.5));
    }

    #[test]
    fn same_pose_for_any_split() {
        crate::common::testing::same_pose_for_any_split(TorusDrift::new, &[2.0, 7.5, 9.1], &[]);
    }
}
