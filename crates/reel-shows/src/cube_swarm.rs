//! Cube Swarm: one large cube with ten small ones tumbling around it.

use glam::Vec3;
use reel_engine::*;

use crate::common;

/// Rotation rates in radians per second.
const CORE_SPIN: f32 = 0.6;
const SWARM_SPIN: Vec3 = Vec3::new(1.2, 1.8, 0.0);
const SWARM_SIZE: usize = 10;

pub struct CubeSwarm {
    core: Option<EntityId>,
    swarm: Vec<EntityId>,
}

impl CubeSwarm {
    pub fn new() -> Self {
        Self {
            core: None,
            swarm: Vec::new(),
        }
    }

    fn spin(&mut self, _f: &mut Frame<'_>, _p: f32) {}
}

impl Choreography for CubeSwarm {
    const STAGES: &'static [StageHandler<Self>] = &[Self::spin];

    fn name(&self) -> &str {
        "Cube Swarm"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        StageSchedule::from_pairs(&[("spin", 6.0)])
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        common::key_and_fill(cast, 0.5, 1.0);
        let material = Material::standard(Color::from_hex(0x6699ff)).with_metalness(0.3).with_roughness(0.4);
        self.core = Some(cast.spawn(Entity::new().with_tag("core").with_mesh(Mesh::new(Geometry::cube(2.0), material))));

        for _ in 0..SWARM_SIZE {
            let color = Color::from_hex(cast.rng.next_int(0x100_0000));
            let position = cast.rng.vec3_signed(Vec3::splat(5.0));
            let mesh = Mesh::new(
                Geometry::cube(0.5),
                Material::standard(color).with_metalness(0.3).with_roughness(0.4),
            );
            let id = cast.spawn(Entity::new().with_tag("satellite").with_position(position).with_mesh(mesh));
            self.swarm.push(id);
        }
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        f.with(self.core, |e| e.rotation = Vec3::ZERO);
        f.each(&self.swarm, |_, e| e.rotation = Vec3::ZERO);
    }

    fn continuous(&mut self, f: &mut Frame<'_>) {
        let t = f.time;
        f.with(self.core, |e| e.rotation = Vec3::new(t * CORE_SPIN, t * CORE_SPIN, 0.0));
        f.each(&self.swarm, |_, e| e.rotation = SWARM_SPIN * t);
    }

    fn teardown(&mut self) {
        self.core = None;
        self.swarm.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::*;

    #[test]
    fn smoke_cycle() {
        smoke(CubeSwarm::new());
    }

    #[test]
    fn layout_is_seeded() {
        let (a, _ta) = start(CubeSwarm::new());
        let (b, _tb) = start(CubeSwarm::new());
        let pa: Vec<Vec3> = a.scene.iter().map(|e| e.position).collect();
        let pb: Vec<Vec3> = b.scene.iter().map(|e| e.position).collect();
        assert_eq!(pa, pb);
        assert_eq!(a.scene.iter().filter(|e| e.tag == "satellite").count(), SWARM_SIZE);
    }

    #[test]
    fn rotation_follows_time() {
        let (mut ctx, mut tl) = start(CubeSwarm::new());
        run_to(&mut ctx, &mut tl, 2.0, 0.1);
        let core = entity(&ctx, tl.choreography().core);
        assert!((core.rotation.x - 1.2).abs() < 1e-3);
    }

    #[test]
    fn same_pose_for_any_split() {
        crate::common::testing::same_pose_for_any_split(CubeSwarm::new, &[1.0, 3.7, 5.9, 7.3], &[]);
    }
}
