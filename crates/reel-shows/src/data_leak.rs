//! Data Leak: a pile of documents bursts apart, a rain of data pours down the
//! screen and the sealed dossiers behind it crack open.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use reel_engine::extensions::stagger;
use reel_engine::*;

use crate::common::{self, frames, FONT, FRAME_RATE};

const DOCUMENTS: usize = 30;
const DATA: usize = 200;
const DOSSIERS: usize = 5;
const CEILING: f32 = 20.0;
const FLOOR: f32 = -15.0;
const RELEASE_SPAN: f32 = 0.7;
const TITLE_HOME: Vec3 = Vec3::new(0.0, -8.0, 0.0);
const CAMERA_HOME: Vec3 = Vec3::new(0.0, 0.0, 20.0);

const INTRO_SECS: f32 = 2.0;
const EXPLOSION_SECS: f32 = 3.0;
const STREAM_SECS: f32 = 5.0;
const TRANSFORM_SECS: f32 = 3.0;
const FINALE_SECS: f32 = 3.0;

/// One falling data element: its fall speed and resting opacity.
struct Datum {
    fall: f32,
    opacity: f32,
}

/// Where a document starts each loop. Drawn fresh on every reset.
#[derive(Debug, Clone, Copy, Default)]
struct Sheet {
    origin: Vec3,
    turn: Vec3,
}

/// A sealed dossier and the pose it returns to on reset.
struct Dossier {
    id: EntityId,
    position: Vec3,
    rotation: Vec3,
}

pub struct DataLeak {
    documents: Vec<EntityId>,
    sheets: Vec<Sheet>,
    data: Vec<Datum>,
    data_ids: Vec<EntityId>,
    stream: ParticleSet,
    dossiers: Vec<Dossier>,
    title: Option<EntityId>,
}

/// Distance a document has travelled per unit of launch velocity, `p` of
/// the way through the explosion. The push ramps up over the first fifth
/// and then eases off.
fn burst(p: f32) -> f32 {
    let area = if p < 0.2 {
        2.5 * p * p
    } else {
        let q = p - 0.2;
        0.1 + q - 0.15 * q * q
    };
    0.3 * FRAME_RATE * EXPLOSION_SECS * area
}

/// Dossiers drift toward the centre through the transform stage.
fn pull_in(p: f32) -> f32 {
    0.99f32.powf(frames(p, TRANSFORM_SECS))
}

impl DataLeak {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            sheets: Vec::new(),
            data: Vec::new(),
            data_ids: Vec::new(),
            stream: ParticleSet::new(0, |_| Particle::default()),
            dossiers: Vec::new(),
            title: None,
        }
    }

    /// Fall speed of every element for this frame, `scale` of its base speed.
    /// Elements still waiting for their release threshold stay put.
    fn set_fall(&mut self, progress: f32, scale: impl Fn(usize) -> f32) {
        let n = self.data.len();
        for (i, (p, d)) in self.stream.particles_mut().iter_mut().zip(&self.data).enumerate() {
            let released = progress > stagger::threshold(i, n, RELEASE_SPAN);
            p.velocity = if released { Vec3::new(0.0, -d.fall * FRAME_RATE * scale(i), 0.0) } else { Vec3::ZERO };
        }
    }

    /// Step the stream and mirror particle positions onto the entities.
    fn flow(&mut self, f: &mut Frame<'_>, sway: bool) {
        let (t, dt) = (f.time, f.dt);
        let rng = &mut *f.rng;
        self.stream.update(dt, |_, old| {
            Particle::new(Vec3::new(rng.signed(10.0), CEILING, old.position.z), old.velocity)
        });
        let particles = self.stream.particles();
        f.each(&self.data_ids, |i, e| {
            let p = &particles[i];
            e.position = p.position;
            if p.velocity.y < 0.0 && sway {
                e.position.x += (t * 2.0 + i as f32).sin() * 0.02 * FRAME_RATE * dt;
                e.rotation.x += 0.01 * FRAME_RATE * dt;
                e.rotation.y += 0.02 * FRAME_RATE * dt;
            }
        });
        // sway feeds back so the next step starts from the drawn position
        self.resync(f);
    }

    // ── Stages ──────────────────────────────────────────────────────

    fn intro(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        let early = self.documents.len().min(5);
        let sheets = &self.sheets;
        f.each(&self.documents[..early], |i, e| {
            e.visible = p > 0.3;
            if e.visible {
                let origin = sheets[i].origin;
                e.scale = Vec3::splat(p);
                e.position = Vec3::new(origin.x, origin.y, -5.0 + p * 5.0);
                e.rotation.y = t * 0.5;
            }
        });
        f.with(self.title, |e| {
            e.visible = true;
            e.position.y = TITLE_HOME.y + p * 5.0;
            e.rotation.x = (t * 2.0).sin() * 0.05;
        });
        f.camera.position.z = CAMERA_HOME.z - p * 5.0;
    }

    fn explosion(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        let (reach, turned) = (burst(p), frames(p, EXPLOSION_SECS));
        let sheets = &self.sheets;
        f.each(&self.documents, |i, e| {
            e.visible = true;
            e.scale = Vec3::ONE;
            e.position = sheets[i].origin + e.params.velocity * reach;
            e.rotation = sheets[i].turn + e.params.spin * turned;
        });
        f.with(self.title, |e| {
            e.scale = Vec3::splat(1.0 + (p * TAU).sin() * 0.2);
            set_glow(e, 0.3 + p * 0.7);
        });
        let shake = (if p < 0.5 { p } else { 1.0 - p }) * 0.6;
        f.camera.position.x = (t * 47.0).sin() * 0.5 * shake;
        f.camera.position.y = (t * 53.0).cos() * 0.5 * shake;
    }

    fn data_stream(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        let (reach, turned) = (burst(1.0), frames(1.0, EXPLOSION_SECS));
        let drift = frames(p, STREAM_SECS);
        let spread = 1.01f32.powf(drift);
        let sheets = &self.sheets;
        f.each(&self.documents, |i, e| {
            let at = sheets[i].origin + e.params.velocity * reach;
            e.visible = true;
            e.opacity = 1.0 - p * 0.8;
            e.position = Vec3::new(at.x * spread, at.y - 0.02 * drift, at.z * spread);
            e.rotation = sheets[i].turn + e.params.spin * turned;
        });

        f.each(&self.data_ids, |_, e| e.visible = true);
        self.set_fall(p, |_| 1.0);
        self.flow(f, true);

        if p > 0.5 {
            for d in &self.dossiers {
                f.with(d.id, |e| {
                    e.visible = true;
                    e.rotation.y = d.rotation.y + t * 0.2;
                });
            }
        }
        f.with(self.title, |e| {
            e.scale = Vec3::ONE;
            e.position.y = -3.0 + p * 2.0;
            set_glow(e, 1.0 - p * 0.5);
        });
    }

    fn transform(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        // jitter is a random walk, so it grows with the square root of the step
        let walk = (FRAME_RATE * f.dt).sqrt();

        self.set_fall(1.0, |_| 1.0 - p * 0.8);
        self.flow(f, false);
        let turbulence = p * 0.2 * walk;
        for &id in &self.data_ids {
            let jitter = Vec3::new(f.rng.signed(0.5), 0.0, f.rng.signed(0.5)) * turbulence;
            let glitch = f.rng.next_f32() < 0.01 * FRAME_RATE * f.dt;
            f.with(id, |e| {
                e.position += jitter;
                if glitch {
                    e.visible = !e.visible;
                }
            });
        }
        self.resync(f);

        let pull = pull_in(p);
        let deform = if p > 0.3 { (p - 0.3) * 1.4 } else { 0.0 };
        for (i, d) in self.dossiers.iter().enumerate() {
            let phase = i as f32;
            f.with(d.id, |e| {
                e.visible = true;
                e.position = Vec3::new(d.position.x * pull, d.position.y * pull, d.position.z);
                if deform > 0.0 {
                    e.scale.x = 1.0 + (t * 3.0 + phase).sin() * deform;
                    e.scale.y = 1.0 + (t * 4.0 + phase).cos() * deform;
                    if let Some(m) = e.mesh.as_mut().and_then(|m| m.materials_mut().nth(1)) {
                        m.emissive = Color::from_hex(0xff0000);
                        m.emissive_intensity = deform;
                    }
                }
            });
        }

        // the title stutters: mostly on, blinking out on the noise troughs
        let shown = (t * 23.0).sin() * (t * 7.0).cos() > -0.8;
        let drift = (t * 31.0).sin() * 0.5 * p * 0.2;
        let glow = 0.75 + (t * 17.0).sin() * 0.25;
        f.with(self.title, |e| {
            e.visible = shown;
            e.position.x = drift;
            set_glow(e, glow);
        });
    }

    fn finale(&mut self, f: &mut Frame<'_>, p: f32) {
        self.set_fall(1.0, |_| 1.0 - p * 0.95);
        self.flow(f, false);
        for (d, &id) in self.data.iter().zip(&self.data_ids) {
            let opacity = d.opacity * (1.0 - p * 0.8);
            f.with(id, |e| e.opacity = opacity);
        }

        let pull = pull_in(1.0);
        // sinking speed ramps with progress, so the drop is quadratic
        let sink = 0.1 * frames(p, FINALE_SECS) * p * 0.5;
        let tumble = 0.01 * frames(p, FINALE_SECS);
        for d in &self.dossiers {
            f.with(d.id, |e| {
                e.opacity = 1.0 - p * 0.8;
                e.position = Vec3::new(d.position.x * pull, d.position.y * pull - sink, d.position.z);
                e.rotation.x = d.rotation.x + tumble;
                e.rotation.z = d.rotation.z + tumble;
            });
        }
        f.with(self.title, |e| {
            e.visible = true;
            e.position.x = 0.0;
            e.position.y = -1.0 + p * 2.0;
            e.opacity = 1.0 - p * 0.5;
        });
        f.camera.position.z = 15.0 + p * 10.0;
    }

    /// Pull entity positions back into the pool after direct edits.
    fn resync(&mut self, f: &mut Frame<'_>) {
        for (p, &id) in self.stream.particles_mut().iter_mut().zip(&self.data_ids) {
            if let Some(e) = f.entity(id) {
                p.position = e.position;
            }
        }
    }

    // ── Construction ────────────────────────────────────────────────

    fn document(rng: &mut Rng) -> Entity {
        let (color, emissive) = match rng.next_int(3) {
            0 => (0xf0f0f0, 0.0),
            1 => (0xeeffee, 0.0),
            _ => (0xffeeee, 0.2),
        };
        let sheet = Geometry::Plane {
            width: rng.range(1.0, 1.5),
            height: rng.range(1.4, 1.9),
            width_segments: 1,
            height_segments: 1,
        };
        let paper = Material::standard(Color::from_hex(color))
            .with_roughness(0.7)
            .with_metalness(0.1)
            .with_emissive(Color::from_hex(0xff0000), emissive)
            .transparent();
        let params = MotionParams {
            velocity: rng.vec3_signed(Vec3::ONE),
            spin: rng.vec3_signed(Vec3::splat(0.05)),
            ..Default::default()
        };
        Entity::new().with_tag("document").with_params(params).with_mesh(Mesh::new(sheet, paper))
    }

    fn datum(rng: &mut Rng) -> (Mesh, f32) {
        match rng.next_int(5) {
            0 => {
                let green = Color::from_hex(0x44ff88);
                let coin = Geometry::Ring { inner: 0.0, outer: 0.2, segments: 16 };
                (Mesh::new(coin, Material::standard(green).with_emissive(green, 0.5).transparent()), 0.9)
            }
            1 => (Mesh::new(Geometry::cube(0.3), Material::standard(Color::WHITE).transparent()), 0.7),
            2 => {
                let bar = Geometry::Box { width: 0.1, height: rng.range(0.2, 0.7), depth: 0.1 };
                (Mesh::new(bar, Material::standard(Color::from_hex(0x44aaff)).transparent()), 0.8)
            }
            3 => {
                let lock = Geometry::Cylinder { radius_top: 0.15, radius_bottom: 0.15, height: 0.25, segments: 16 };
                let steel = Material::standard(Color::from_hex(0xbbbbdd)).with_metalness(0.8).with_roughness(0.2);
                (Mesh::new(lock, steel), 1.0)
            }
            _ => {
                let tint = Color::from_hex(rng.next_int(0x100_0000));
                let dot = Material::standard(tint).with_emissive(Color::from_hex(0x444444), 0.2);
                (Mesh::new(Geometry::Sphere { radius: 0.08, segments: 8 }, dot), 1.0)
            }
        }
    }

    fn dossier_parts() -> Vec<MeshPart> {
        let lock = Geometry::Cylinder { radius_top: 0.3, radius_bottom: 0.3, height: 0.2, segments: 16 };
        vec![
            MeshPart::new(
                Geometry::Box { width: 2.0, height: 1.5, depth: 0.2 },
                Material::standard(Color::from_hex(0xaa3333)).with_roughness(0.5).with_metalness(0.2).transparent(),
            ),
            MeshPart::new(lock, Material::standard(Color::from_hex(0xdddddd)).with_metalness(0.9).with_roughness(0.1))
                .at(Vec3::new(0.0, 0.0, 0.15))
                .rotated(Vec3::new(PI * 0.5, 0.0, 0.0)),
        ]
    }

    /// Position on the pentagon and the Euler pose that faces the origin.
    fn dossier_pose(i: usize) -> (Vec3, Vec3) {
        let angle = i as f32 / DOSSIERS as f32 * TAU;
        let position = Vec3::new(angle.cos() * 8.0, angle.sin() * 8.0, -5.0);
        let facing = (-position).normalize();
        let rotation = Vec3::new(-facing.y.asin() + PI * 0.1, facing.x.atan2(facing.z), 0.0);
        (position, rotation)
    }
}

fn set_glow(e: &mut Entity, intensity: f32) {
    if let Some(mesh) = e.mesh.as_mut() {
        mesh.material.emissive_intensity = intensity;
    }
}

impl Choreography for DataLeak {
    const STAGES: &'static [StageHandler<Self>] = &[
        Self::intro,
        Self::explosion,
        Self::data_stream,
        Self::transform,
        Self::finale,
    ];

    fn name(&self) -> &str {
        "Data Leak"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        StageSchedule::from_pairs(&[
            ("intro", INTRO_SECS),
            ("explosion", EXPLOSION_SECS),
            ("data-stream", STREAM_SECS),
            ("transform", TRANSFORM_SECS),
            ("finale", FINALE_SECS),
        ])
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        cast.spawn(Entity::new().with_tag("ambient").with_light(Light::ambient(Color::from_hex(0x333333), 2.0)));
        cast.spawn(
            Entity::new()
                .with_tag("spotlight")
                .with_position(Vec3::new(0.0, 15.0, 10.0))
                .with_light(Light::spot(Color::WHITE, 10.0, 50.0)),
        );
        for (hex, at) in [(0x6644ff, Vec3::new(-10.0, 5.0, 8.0)), (0xff4422, Vec3::new(10.0, -5.0, 8.0))] {
            cast.spawn(Entity::new().with_tag("rim").with_position(at).with_light(Light::point(Color::from_hex(hex), 5.0, 20.0)));
        }

        for _ in 0..DOCUMENTS {
            let doc = Self::document(cast.rng).hidden();
            self.documents.push(cast.spawn(doc));
            self.sheets.push(Sheet::default());
        }

        for _ in 0..DATA {
            let (mesh, opacity) = Self::datum(cast.rng);
            let fall = cast.rng.range(0.1, 0.4);
            let id = cast.spawn(Entity::new().with_tag("datum").with_mesh(mesh).with_opacity(opacity).hidden());
            self.data.push(Datum { fall, opacity });
            self.data_ids.push(id);
        }
        self.stream = ParticleSet::new(DATA, |_| Particle::default())
            .with_bounds(Aabb::new(Vec3::new(-100.0, FLOOR, -100.0), Vec3::splat(100.0)));

        for i in 0..DOSSIERS {
            let (position, rotation) = Self::dossier_pose(i);
            let entity = Entity::new()
                .with_tag("dossier")
                .with_position(position)
                .with_rotation(rotation)
                .with_mesh(Mesh::group(Self::dossier_parts()))
                .hidden();
            let id = cast.spawn(entity);
            self.dossiers.push(Dossier { id, position, rotation });
        }

        cast.request_font(FONT);
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        f.camera.set_position(CAMERA_HOME);

        for (&id, sheet) in self.documents.iter().zip(self.sheets.iter_mut()) {
            sheet.origin = f.rng.vec3_signed(Vec3::splat(0.1));
            sheet.turn = Vec3::new(f.rng.range(0.0, TAU), f.rng.range(0.0, TAU), f.rng.range(0.0, TAU));
            let Sheet { origin, turn } = *sheet;
            f.with(id, |e| {
                e.visible = false;
                e.opacity = 1.0;
                e.scale = Vec3::ONE;
                e.position = origin;
                e.rotation = turn;
            });
        }

        for ((p, d), &id) in self.stream.particles_mut().iter_mut().zip(&self.data).zip(&self.data_ids) {
            let start = Vec3::new(f.rng.signed(10.0), f.rng.range(CEILING, CEILING + 30.0), f.rng.signed(5.0));
            *p = Particle::new(start, Vec3::ZERO);
            f.with(id, |e| {
                e.visible = false;
                e.opacity = d.opacity;
                e.position = start;
                e.rotation = Vec3::ZERO;
            });
        }

        for d in &self.dossiers {
            f.with(d.id, |e| {
                e.visible = false;
                e.opacity = 1.0;
                e.position = d.position;
                e.rotation = d.rotation;
                e.scale = Vec3::ONE;
                if let Some(m) = e.mesh.as_mut().and_then(|m| m.materials_mut().nth(1)) {
                    m.emissive_intensity = 0.0;
                }
            });
        }

        f.with(self.title, |e| {
            e.visible = false;
            e.opacity = 1.0;
            e.position = TITLE_HOME;
            e.scale = Vec3::ONE;
            set_glow(e, 0.3);
        });
    }

    fn asset_ready(&mut self, cast: &mut Cast<'_>, event: &AssetEvent) {
        let Some(font) = common::font_of(event) else {
            log::warn!("data-leak: title font failed");
            return;
        };
        let material = Material::standard(Color::WHITE)
            .with_emissive(Color::from_hex(0xff0000), 0.3)
            .with_metalness(0.7)
            .with_roughness(0.3)
            .transparent();
        self.title = Some(cast.spawn(common::text("DATA LEAK", 2.0, font, material, TITLE_HOME)));
    }

    fn teardown(&mut self) {
        self.documents.clear();
        self.sheets.clear();
        self.data.clear();
        self.data_ids.clear();
        self.stream = ParticleSet::new(0, |_| Particle::default());
        self.dossiers.clear();
        self.title = None;
    }
}
