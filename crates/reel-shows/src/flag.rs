//! Flag: a segmented plane rippled by three summed waves in front of a star
//! field.

use glam::Vec3;
use reel_engine::components::mesh::plane_grid;
use reel_engine::*;

use crate::common;

const WIDTH: f32 = 10.0;
const HEIGHT: f32 = 6.0;
const SEGMENTS: u32 = 32;
/// Wave phase advance per second (0.05 per frame at 60 fps).
const WAVE_RATE: f32 = 3.0;

pub struct Flag {
    cloth: Option<EntityId>,
    stars: Option<EntityId>,
    rest: Vec<Vec3>,
    waves: WaveField,
}

impl Flag {
    pub fn new() -> Self {
        Self {
            cloth: None,
            stars: None,
            rest: plane_grid(WIDTH, HEIGHT, SEGMENTS, SEGMENTS),
            waves: WaveField::new(vec![
                WaveBand::new(0.5, 0.5, 0.5, WaveAxis::X),
                WaveBand::new(0.25, 1.0, 1.0, WaveAxis::X),
                WaveBand::new(0.1, 2.0, 0.7, WaveAxis::Y),
            ]),
        }
    }

    fn wave(&mut self, _f: &mut Frame<'_>, _p: f32) {}
}

impl Choreography for Flag {
    const STAGES: &'static [StageHandler<Self>] = &[Self::wave];

    fn name(&self) -> &str {
        "Flag"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        StageSchedule::from_pairs(&[("wave", 12.0)])
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        common::key_and_fill(cast, 0.5, 1.0);
        let geometry = Geometry::Plane {
            width: WIDTH,
            height: HEIGHT,
            width_segments: SEGMENTS,
            height_segments: SEGMENTS,
        };
        let material = Material::standard(Color::from_hex(0x2288ff))
            .with_metalness(0.2)
            .with_roughness(0.8);
        self.cloth = Some(cast.spawn(Entity::new().with_tag("cloth").with_mesh(Mesh::new(geometry, material))));
        self.stars = Some(common::star_field(
            cast,
            500,
            Vec3::splat(50.0),
            Vec3::new(0.0, 0.0, -50.0),
            0.1,
        ));
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        let rest = &self.rest;
        f.with(self.cloth, |e| {
            for (v, r) in e.vertices_mut().iter_mut().zip(rest) {
                *v = *r;
            }
            e.rotation = Vec3::ZERO;
        });
        f.with(self.stars, |e| e.rotation = Vec3::ZERO);
    }

    fn continuous(&mut self, f: &mut Frame<'_>) {
        let t = f.time * WAVE_RATE;
        let (rest, waves) = (&self.rest, &self.waves);
        f.with(self.cloth, |e| {
            waves.deform(rest, e.vertices_mut(), t);
            e.rotation.y = (t * 0.1).sin() * 0.2;
        });
        f.with(self.stars, |e| e.rotation.y = t * 0.02);
    }

    fn teardown(&mut self) {
        self.cloth = None;
        self.stars = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::*;
    use glam::Vec2;

    #[test]
    fn smoke_cycle() {
        smoke(Flag::new());
    }

    #[test]
    fn cloth_matches_wave_field() {
        let (mut ctx, mut tl) = start(Flag::new());
        run_to(&mut ctx, &mut tl, 1.5, 0.05);
        let t = tl.elapsed() * WAVE_RATE;
        let show = tl.choreography();
        let cloth = entity(&ctx, show.cloth);
        let verts = &cloth.mesh.as_ref().unwrap().vertices;
        assert_eq!(verts.len(), ((SEGMENTS + 1) * (SEGMENTS + 1)) as usize);
        for (v, r) in verts.iter().zip(&show.rest).step_by(37) {
            let z = show.waves.sample(Vec2::new(r.x, r.y), t);
            assert!((v.z - z).abs() < 1e-4);
            assert_eq!((v.x, v.y), (r.x, r.y));
        }
    }

    #[test]
    fn same_pose_for_any_split() {
        crate::common::testing::same_pose_for_any_split(Flag::new, &[4.0, 11.5, 13.0], &[]);
    }
}
