//! Brick by Brick: a foundation fades in, twelve bricks rise into a stack one
//! after another and the top brick glows while the camera circles it.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use reel_engine::extensions::stagger;
use reel_engine::*;

use crate::common::{self, FONT};

const BRICKS: usize = 12;
const BRICK: Vec3 = Vec3::new(2.0, 0.5, 1.0);
const START_Y: f32 = -3.0;
const PARKED_Y: f32 = -5.0;
const CAMERA_HOME: Vec3 = Vec3::new(0.0, 5.0, 15.0);
const CAMERA_FOCUS: Vec3 = Vec3::new(0.0, 4.0, 0.0);
const SUBTITLE_FONT: &str = "helvetiker_regular";

pub struct BrickByBrick {
    foundation: Option<EntityId>,
    bricks: Vec<EntityId>,
    shell: Option<EntityId>,
    glow: Option<EntityId>,
    title: Option<EntityId>,
    subtitle: Option<EntityId>,
}

impl BrickByBrick {
    pub fn new() -> Self {
        Self {
            foundation: None,
            bricks: Vec::new(),
            shell: None,
            glow: None,
            title: None,
            subtitle: None,
        }
    }

    fn top(&self) -> Option<EntityId> {
        self.bricks.last().copied()
    }

    fn foundation_stage(&mut self, f: &mut Frame<'_>, p: f32) {
        f.with(self.foundation, |e| e.opacity = p);
        f.with(self.title, |e| {
            e.visible = true;
            e.opacity = p;
            e.position.y = -2.5 + p * 0.5;
        });
        f.with(self.subtitle, |e| {
            e.visible = true;
            e.opacity = p;
            e.position.y = -3.0 + p * 0.5;
        });
    }

    fn stacking(&mut self, f: &mut Frame<'_>, p: f32) {
        f.with(self.foundation, |e| e.opacity = 1.0);
        f.with(self.title, |e| e.opacity = 1.0);
        f.with(self.subtitle, |e| e.opacity = 1.0);
        f.each(&self.bricks, |i, e| {
            if !stagger::is_revealed(p, i, BRICKS) {
                e.visible = false;
                return;
            }
            e.visible = true;
            let local = stagger::local_progress(p, i, BRICKS);
            if local < 1.0 {
                let eased = ease_in_out_cubic(local);
                e.opacity = eased;
                e.position.y = lerp(START_Y, e.params.target.y, eased);
                e.rotation.z = (local * TAU).sin() * 0.05 * (1.0 - local);
            } else {
                settle(e);
            }
        });
    }

    fn completion(&mut self, f: &mut Frame<'_>, p: f32) {
        f.each(&self.bricks, |_, e| {
            e.visible = true;
            settle(e);
        });
        let Some(top) = self.top().and_then(|id| f.entity(id).map(|e| e.position)) else {
            return;
        };
        f.with(self.top(), |e| {
            if let Some(mesh) = e.mesh.as_mut() {
                mesh.material.emissive_intensity = 0.5 + (p * PI * 6.0).sin() * 0.3;
            }
        });
        f.with(self.shell, |e| {
            e.visible = true;
            e.position = top;
            e.opacity = p * 0.6;
            e.scale = Vec3::splat(1.0 + (p * PI * 4.0).sin() * 0.1 * p);
        });
        f.with(self.glow, |e| {
            e.position = top;
            if let Some(light) = e.light.as_mut() {
                light.intensity = p * 2.0;
            }
        });
        f.with(self.title, |e| {
            if let Some(mesh) = e.mesh.as_mut() {
                mesh.material.emissive_intensity = 0.2 + p * 0.4;
            }
        });
        let orbit = orbit(p * TAU, 15.0 - p * 3.0, CAMERA_HOME.y);
        f.camera.set_position(orbit);
        f.camera.look_at(top);
    }
}

/// Final resting pose: full opacity at the target height with the brick's
/// own small tilt.
fn settle(e: &mut Entity) {
    e.opacity = 1.0;
    e.position.y = e.params.target.y;
    e.rotation = e.params.spin;
}

impl Choreography for BrickByBrick {
    const STAGES: &'static [StageHandler<Self>] = &[Self::foundation_stage, Self::stacking, Self::completion];

    fn name(&self) -> &str {
        "Brick by Brick"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        StageSchedule::from_pairs(&[("foundation", 2.0), ("stacking", 10.0), ("completion", 3.0)])
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        cast.spawn(Entity::new().with_light(Light::ambient(Color::from_hex(0x444444), 1.0)));
        cast.spawn(
            Entity::new()
                .with_position(Vec3::new(5.0, 10.0, 7.0))
                .with_light(Light::directional(Color::WHITE, 1.5)),
        );
        cast.spawn(
            Entity::new()
                .with_position(Vec3::new(-5.0, 3.0, 5.0))
                .with_light(Light::point(Color::from_hex(0x6688cc), 1.0, 20.0)),
        );
        self.glow = Some(cast.spawn(
            Entity::new()
                .with_tag("glow")
                .with_position(Vec3::new(0.0, BRICK.y * (BRICKS as f32 + 1.0), 0.0))
                .with_light(Light::point(Color::from_hex(0x00ffff), 0.0, 10.0)),
        ));

        let slab = Geometry::Box { width: BRICK.x * 1.5, height: BRICK.y * 0.5, depth: BRICK.z * 1.5 };
        let concrete = Material::standard(Color::from_hex(0x333333)).with_metalness(0.7).with_roughness(0.5).transparent();
        self.foundation = Some(cast.spawn(
            Entity::new()
                .with_tag("foundation")
                .with_position(Vec3::new(0.0, -BRICK.y * 0.5, 0.0))
                .with_mesh(Mesh::new(slab, concrete)),
        ));

        let block = Geometry::Box { width: BRICK.x, height: BRICK.y, depth: BRICK.z };
        for i in 0..BRICKS {
            let last = i == BRICKS - 1;
            let material = if last {
                Material::standard(Color::from_hex(0x4488ff))
                    .with_metalness(0.9)
                    .with_roughness(0.2)
                    .with_emissive(Color::from_hex(0x0088ff), 0.5)
            } else {
                Material::standard(Color::from_hex(0x888888)).with_metalness(0.3).with_roughness(0.8)
            };
            let spin = if last {
                Vec3::ZERO
            } else {
                Vec3::new(0.0, cast.rng.signed(0.01), cast.rng.signed(0.01))
            };
            let params = MotionParams {
                target: Vec3::new(0.0, i as f32 * BRICK.y, 0.0),
                spin,
                ..Default::default()
            };
            let brick = Entity::new()
                .with_tag("brick")
                .with_params(params)
                .with_mesh(Mesh::new(block.clone(), material.transparent()));
            self.bricks.push(cast.spawn(brick));
        }

        let shell = Geometry::Box { width: BRICK.x * 1.1, height: BRICK.y * 1.1, depth: BRICK.z * 1.1 };
        self.shell = Some(cast.spawn(Entity::new().with_tag("shell").with_mesh(Mesh::new(shell, common::halo(0x00ffff)))));

        cast.request_font(FONT);
        cast.request_font(SUBTITLE_FONT);
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        f.camera.set_position(CAMERA_HOME);
        f.camera.look_at(CAMERA_FOCUS);
        f.with(self.foundation, |e| e.opacity = 0.0);
        f.each(&self.bricks, |_, e| {
            e.visible = false;
            e.opacity = 0.0;
            e.position.y = PARKED_Y;
            e.rotation = e.params.spin;
        });
        f.with(self.shell, |e| {
            e.visible = false;
            e.opacity = 0.0;
        });
        f.with(self.glow, |e| {
            if let Some(light) = e.light.as_mut() {
                light.intensity = 0.0;
            }
        });
        f.with(self.title, |e| e.opacity = 0.0);
        f.with(self.subtitle, |e| e.opacity = 0.0);
    }

    fn continuous(&mut self, f: &mut Frame<'_>) {
        let t = f.time;
        f.with(self.title, |e| e.rotation.y = (t * 0.5).sin() * 0.05);
        f.with(self.glow, |e| {
            if let Some(light) = e.light.as_mut().filter(|l| l.intensity > 0.0) {
                light.color = Color::from_hsl(t * 0.1, 1.0, 0.5);
            }
        });
    }

    fn asset_ready(&mut self, cast: &mut Cast<'_>, event: &AssetEvent) {
        let Some(font) = common::font_of(event) else {
            log::warn!("brick-by-brick: font {} failed, captions skipped", event.name);
            return;
        };
        if event.name == FONT {
            let material = Material::standard(Color::WHITE)
                .with_metalness(0.8)
                .with_roughness(0.2)
                .with_emissive(Color::WHITE, 0.2)
                .transparent();
            self.title = Some(cast.spawn(common::text("POWER TRANSFER", 0.7, font, material, Vec3::new(0.0, -2.0, 0.0))));
        } else {
            let material = Material::standard(Color::from_hex(0xcccccc))
                .with_metalness(0.5)
                .with_roughness(0.5)
                .transparent();
            self.subtitle = Some(cast.spawn(common::text("BRICK BY BRICK", 0.4, font, material, Vec3::new(0.0, -3.0, 0.0))));
        }
        // stages drive opacity from here on
        cast.with(self.title, |e| e.visible = true);
        cast.with(self.subtitle, |e| e.visible = true);
    }

    fn teardown(&mut self) {
        self.foundation = None;
        self.bricks.clear();
        self.shell = None;
        self.glow = None;
        self.title = None;
        self.subtitle = None;
    }
}
