//! Unraveling: a glowing thread bends, sheds strands, frays into a cloud of
//! dust and leaves only its title behind.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use reel_engine::extensions::stagger;
use reel_engine::*;

use crate::common::{self, FONT};

const LENGTH: f32 = 10.0;
const SEGMENTS: usize = 100;
const STRANDS: usize = 12;
const DUST: usize = 500;
const DUST_SIZE: f32 = 0.1;
const THREAD: u32 = 0x00ffff;
const GLOW: u32 = 0x88ffff;
const STRAND: u32 = 0xaaffff;
const CAMERA_HOME: Vec3 = Vec3::new(0.0, 0.0, 15.0);
const TITLE_LOW: f32 = -5.0;

const DISSOLUTION_SECS: f32 = 4.0;
/// How far strands drift while the thread comes apart.
const STRAND_DRIFT: f32 = 3.0;
/// Extra distance strands fly during dissolution, scaled by `p * (1 + p)`.
const STRAND_FLIGHT: f32 = 12.0;
/// Radians per second while strands fly off.
const STRAND_TUMBLE: Vec3 = Vec3::new(3.0, 4.2, 3.6);
const DUST_BURST: f32 = 12.0;
const DUST_DRIFT: f32 = 3.6;

pub struct UnravelingThread {
    thread: Option<EntityId>,
    sheath: Option<EntityId>,
    strands: Vec<EntityId>,
    dust: Option<EntityId>,
    title: Option<EntityId>,
    /// Straight-thread polyline.
    rest: Vec<Vec3>,
    /// Where each dust mote starts; reshuffled every loop.
    dust_rest: Vec<Vec3>,
}

impl UnravelingThread {
    pub fn new() -> Self {
        let rest = (0..=SEGMENTS)
            .map(|i| Vec3::new(-LENGTH * 0.5 + LENGTH * i as f32 / SEGMENTS as f32, 0.0, 0.0))
            .collect();
        Self {
            thread: None,
            sheath: None,
            strands: Vec::new(),
            dust: None,
            title: None,
            rest,
            dust_rest: Vec::new(),
        }
    }

    fn intro(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        f.with(self.thread, |e| {
            set_emissive(e, 0.2 + 0.1 * (t * 5.0).sin());
            e.rotation.z = t.sin() * 0.05;
        });
        f.with(self.sheath, |e| {
            e.opacity = 0.15 + 0.1 * (t * 3.0).sin();
            e.rotation.z = FRAC_PI_2 + t.sin() * 0.05;
        });
        f.with(self.title, |e| e.position.y = TITLE_LOW + p * 3.0);
        f.camera.set_position(orbit(t * 0.1, 15.0, 0.0));
        f.camera.look_at(Vec3::ZERO);
    }

    fn loosening(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        let rest = &self.rest;
        let center = (rest.len() - 1) as f32 * 0.5;
        f.with(self.thread, |e| {
            set_emissive(e, 0.5 + p * 0.5);
            for (i, (v, r)) in e.vertices_mut().iter_mut().zip(rest).enumerate() {
                let d = (i as f32 - center).abs() / center;
                let wave = p * 0.5 * (d * (3.0 + p * 5.0) + t * 2.0).sin();
                let twist = (d * 10.0 + t).sin() * p * 0.3;
                *v = *r + Vec3::new(0.0, wave, twist);
            }
        });

        let fray = ((p - 0.5) * 2.0).max(0.0);
        let shown = stagger::visible_count(fray, STRANDS);
        f.each(&self.strands, |i, e| {
            e.visible = i < shown;
            e.position = e.params.origin;
            e.scale = Vec3::splat(fray);
            e.rotation = wiggle(t, i);
        });
        f.with(self.dust, |e| {
            e.visible = p > 0.5;
            e.opacity = fray * 0.25;
        });
        f.with(self.title, |e| e.position.y = TITLE_LOW + 3.0);
        f.camera.set_position(orbit(t * 0.1, 15.0 - p * 5.0, 0.0));
        f.camera.look_at(Vec3::ZERO);
    }

    fn unraveling(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        let chaos = p * 1.5;
        let rest = &self.rest;
        f.with(self.thread, |e| {
            e.opacity = 1.0 - p * 0.8;
            for (i, (v, r)) in e.vertices_mut().iter_mut().zip(rest).enumerate() {
                let vt = t * 3.0 + i as f32 * 0.05;
                *v = *r + Vec3::new(vt.sin(), (vt * 0.7).cos(), (vt * 0.5).sin()) * chaos;
            }
        });
        let drift = STRAND_DRIFT * p * p;
        f.each(&self.strands, |i, e| {
            e.visible = true;
            e.opacity = 0.7;
            e.scale = Vec3::splat(1.0 + p * 2.0);
            e.position = e.params.origin + e.params.velocity * drift;
            e.rotation = wiggle(t, i);
        });
        f.with(self.sheath, |e| {
            e.opacity = 0.2 - p * 0.2;
            e.scale.y = 1.0 - p * 0.5;
        });
        f.with(self.dust, |e| {
            e.visible = true;
            e.opacity = 0.5 + p * 0.5;
        });
        f.camera.set_position(orbit(t * (0.1 + p * 0.2), 10.0 - p * 2.0, 0.0));
        f.camera.look_at(Vec3::ZERO);
    }

    fn dissolution(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        f.with(self.thread, |e| e.opacity = 0.2 * (1.0 - p));
        let flight = STRAND_DRIFT + STRAND_FLIGHT * p * (1.0 + p);
        f.each(&self.strands, |i, e| {
            e.visible = true;
            e.scale = Vec3::splat(3.0);
            e.position = e.params.origin + e.params.velocity * flight;
            e.opacity = 0.7 * (1.0 - p);
            e.rotation = wiggle(t, i) + STRAND_TUMBLE * p * DISSOLUTION_SECS;
        });
        f.with(self.sheath, |e| e.visible = p < 0.5);
        self.spread_dust(f, dust_spread(4, p));
        f.with(self.title, |e| e.position.y = -2.0 + p * 2.0);

        // eases back from where the unraveling orbit left off
        let secs = p * DISSOLUTION_SECS;
        let from = orbit((t - secs) * 0.3, 8.0, 0.0);
        let z = common::chase(from.z, 8.0, 7.0 / DISSOLUTION_SECS, 0.05, secs);
        f.camera.set_position(Vec3::new(from.x, common::chase(from.y, 0.0, 0.0, 0.05, secs), z));
        f.camera.look_at(Vec3::ZERO);
    }

    fn aftermath(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        f.with(self.thread, |e| e.visible = false);
        f.with(self.sheath, |e| e.visible = false);
        f.each(&self.strands, |_, e| e.visible = false);
        f.with(self.dust, |e| e.opacity = (1.0 - p) * 0.5);
        self.spread_dust(f, dust_spread(5, p));
        f.with(self.title, |e| {
            e.position.y = 0.0;
            set_emissive(e, 0.5 + (t * 2.0).sin() * 0.3);
        });
        f.camera.set_position(orbit(t * 0.05, 15.0, 0.0));
        f.camera.look_at(Vec3::ZERO);
    }

    /// Push every mote `distance` away from the origin along its own direction.
    fn spread_dust(&self, f: &mut Frame<'_>, distance: f32) {
        let rest = &self.dust_rest;
        f.with(self.dust, |e| {
            for (v, r) in e.vertices_mut().iter_mut().zip(rest) {
                *v = *r + r.normalize_or_zero() * distance;
            }
        });
    }
}

/// Distance the dust has travelled at `progress` through `stage`.
fn dust_spread(stage: usize, progress: f32) -> f32 {
    match stage {
        4 => DUST_BURST * progress * (1.0 + progress),
        5 => DUST_BURST * 2.0 + DUST_DRIFT * progress,
        _ => 0.0,
    }
}

fn wiggle(t: f32, i: usize) -> Vec3 {
    let i = i as f32;
    Vec3::new((t * 3.0 + i).sin(), (t * 1.5 + i).cos(), (t * 2.0 + i).cos()) * 0.3
}

fn set_emissive(e: &mut Entity, intensity: f32) {
    if let Some(mesh) = e.mesh.as_mut() {
        mesh.material.emissive_intensity = intensity;
    }
}

/// A mote somewhere along the thread, barely off its axis.
fn dust_mote(rng: &mut Rng) -> Vec3 {
    Vec3::new(rng.signed(LENGTH * 0.5), rng.signed(0.05), rng.signed(0.05))
}

impl Choreography for UnravelingThread {
    const STAGES: &'static [StageHandler<Self>] = &[
        Self::intro,
        Self::loosening,
        Self::unraveling,
        Self::dissolution,
        Self::aftermath,
    ];

    fn name(&self) -> &str {
        "Unraveling"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        StageSchedule::from_pairs(&[
            ("intro", 3.0),
            ("loosening", 4.0),
            ("unraveling", 5.0),
            ("dissolution", DISSOLUTION_SECS),
            ("aftermath", 3.0),
        ])
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        cast.spawn(Entity::new().with_light(Light::ambient(Color::from_hex(0x222244), 1.0)));
        cast.spawn(
            Entity::new()
                .with_position(Vec3::new(5.0, 5.0, 5.0))
                .with_light(Light::directional(Color::WHITE, 0.5)),
        );
        cast.spawn(Entity::new().with_tag("thread-light").with_light(Light::point(Color::from_hex(GLOW), 2.0, 10.0)));
        for k in 0..3 {
            let a = k as f32 / 3.0 * TAU;
            cast.spawn(
                Entity::new()
                    .with_tag("beam")
                    .with_position(Vec3::new(a.cos() * 5.0, a.sin() * 5.0, 3.0))
                    .with_light(Light::spot(Color::from_hex(GLOW), 1.0, 15.0)),
            );
        }

        let line = Mesh::line(self.rest.clone(), common::glowing(THREAD, 0.5).transparent());
        self.thread = Some(cast.spawn(Entity::new().with_tag("thread").with_mesh(line)));

        let sheath = Geometry::Cylinder { radius_top: 0.2, radius_bottom: 0.2, height: LENGTH, segments: 16 };
        let glow = Material::basic(Color::from_hex(GLOW)).transparent();
        self.sheath = Some(cast.spawn(
            Entity::new()
                .with_tag("sheath")
                .with_rotation(Vec3::new(0.0, 0.0, FRAC_PI_2))
                .with_mesh(Mesh::new(sheath, glow)),
        ));

        for _ in 0..STRANDS {
            let tip = cast.rng.vec3_signed(Vec3::ONE);
            let origin = Vec3::new(cast.rng.signed(LENGTH * 0.5), 0.0, 0.0);
            let side = if origin.x >= 0.0 { 1.0 } else { -1.0 };
            let outward = Vec3::new(side, cast.rng.signed(0.5), cast.rng.signed(0.5)).normalize();
            let params = MotionParams { origin, velocity: outward, ..Default::default() };
            let mesh = Mesh::line(vec![Vec3::ZERO, tip], common::glowing(STRAND, 0.7).transparent());
            self.strands
                .push(cast.spawn(Entity::new().with_tag("strand").with_params(params).with_mesh(mesh).hidden()));
        }

        self.dust_rest = (0..DUST).map(|_| dust_mote(cast.rng)).collect();
        let motes = Material::basic(Color::WHITE).with_point_size(DUST_SIZE).transparent();
        self.dust = Some(cast.spawn(
            Entity::new()
                .with_tag("dust")
                .with_mesh(Mesh::points(self.dust_rest.clone(), motes))
                .hidden(),
        ));

        cast.request_font(FONT);
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        let rest = &self.rest;
        f.with(self.thread, |e| {
            e.vertices_mut().copy_from_slice(rest);
            e.visible = true;
            e.opacity = 1.0;
            e.rotation = Vec3::ZERO;
            set_emissive(e, 0.5);
        });
        f.each(&self.strands, |_, e| {
            e.visible = false;
            e.scale = Vec3::ONE;
            e.opacity = 0.7;
            e.position = e.params.origin;
            e.rotation = Vec3::ZERO;
        });
        f.with(self.sheath, |e| {
            e.visible = true;
            e.opacity = 0.2;
            e.scale = Vec3::ONE;
            e.rotation = Vec3::new(0.0, 0.0, FRAC_PI_2);
        });

        for mote in self.dust_rest.iter_mut() {
            *mote = dust_mote(f.rng);
        }
        let motes = &self.dust_rest;
        f.with(self.dust, |e| {
            e.visible = false;
            e.vertices_mut().copy_from_slice(motes);
        });

        f.with(self.title, |e| {
            e.position.y = TITLE_LOW;
            set_emissive(e, 0.5);
        });
        f.camera.set_position(CAMERA_HOME);
        f.camera.look_at(Vec3::ZERO);
    }

    fn continuous(&mut self, f: &mut Frame<'_>) {
        let t = f.time;
        f.with(self.dust, |e| {
            if !e.visible {
                return;
            }
            if let Some(mesh) = e.mesh.as_mut() {
                mesh.material.point_size = DUST_SIZE * (0.8 + (t * 5.0).sin() * 0.2);
            }
        });
    }

    fn asset_ready(&mut self, cast: &mut Cast<'_>, event: &AssetEvent) {
        let Some(font) = common::font_of(event) else {
            log::warn!("unraveling: font {} failed, title skipped", event.name);
            return;
        };
        let material = Material::standard(Color::from_hex(THREAD))
            .with_metalness(0.8)
            .with_roughness(0.2)
            .with_emissive(Color::from_hex(THREAD), 0.5);
        let mut title = common::text("UNRAVELING", 1.0, font, material, Vec3::new(0.0, TITLE_LOW, 0.0));
        title.visible = true;
        self.title = Some(cast.spawn(title));
    }

    fn teardown(&mut self) {
        self.thread = None;
        self.sheath = None;
        self.strands.clear();
        self.dust = None;
        self.title = None;
        self.dust_rest.clear();
    }
}
