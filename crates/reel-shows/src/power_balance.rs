//! Power Balance: a scale of justice tips under a pile of wealth while the
//! other pan sheds its contents, then a ring of chain closes in.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use reel_engine::extensions::stagger;
use reel_engine::*;

use crate::common::{self, chase, frames, FONT, FRAME_RATE};

const GOLD: u32 = 0xd4af37;
const SILVER: u32 = 0xc0c0c0;
const DEEP_RED: u32 = 0x8b0000;
const DARK_BLUE: u32 = 0x0a1931;

const PAN_Y: f32 = 2.5;
const ARM: f32 = 5.0;
const CHAIN_LINKS: usize = 20;
const CHAIN_RADIUS: f32 = 3.5;
const CHAIN_Y: f32 = -2.0;
const SPARKS: usize = 64;
const SPARK_GRAVITY: f32 = 0.01 * FRAME_RATE * FRAME_RATE;
const SPARK_DECAY: f32 = 2.0;
const FALL_LIMIT: f32 = -10.0;
const TITLE_Y: f32 = -6.0;
const CAMERA_HOME: Vec3 = Vec3::new(0.0, 5.0, 18.0);

const INTRO_SECS: f32 = 3.0;
const TIPPING_SECS: f32 = 4.0;
const IMBALANCE_SECS: f32 = 5.0;
const CHAINS_SECS: f32 = 4.0;
const FINALE_SECS: f32 = 3.0;

/// An object resting on one of the pans.
///
/// `home` is where it sits on an untilted pan; `lift` is its offset from
/// there. A piece that drops off the right pan is re-homed at `refill`, so
/// `origin` keeps the build pose.
struct Piece {
    id: EntityId,
    origin: Vec3,
    turn: Vec3,
    refill: Vec3,
    home: Vec3,
    lift: f32,
    fallen: bool,
}

impl Piece {
    fn new(id: EntityId, origin: Vec3, turn: Vec3, refill: Vec3) -> Self {
        Self { id, origin, turn, refill, home: origin, lift: 0.0, fallen: false }
    }

    fn restore(&mut self) {
        self.home = self.origin;
        self.lift = 0.0;
        self.fallen = false;
    }
}

/// Crossbar angle `secs` into tipping. It lags a target sliding to -0.6.
fn tipping_tilt(secs: f32) -> f32 {
    chase(0.0, 0.0, -0.6 / TIPPING_SECS, 0.05, secs)
}

/// Crossbar angle `secs` into the imbalance, picking up where tipping ended.
fn imbalance_tilt(secs: f32) -> f32 {
    chase(tipping_tilt(TIPPING_SECS), -0.8, -0.2 / IMBALANCE_SECS, 0.1, secs)
}

/// Camera `secs` into the chains stage, which began at show time `entered`.
/// It leaves the end of the imbalance orbit and sinks to eye level.
fn chains_camera(entered: f32, secs: f32) -> Vec3 {
    let from = orbit(entered * 0.2, 15.0, CAMERA_HOME.y);
    Vec3::new(from.x, chase(from.y, 0.0, 0.0, 0.05, secs), chase(from.z, 15.0, 0.0, 0.05, secs))
}

pub struct PowerBalance {
    stand: Option<EntityId>,
    crossbar: Option<EntityId>,
    left_pan: Option<EntityId>,
    right_pan: Option<EntityId>,
    wealth: Vec<Piece>,
    poverty: Vec<Piece>,
    links: Vec<EntityId>,
    chain_glow: Option<EntityId>,
    sparks: ParticleSet,
    spark_ids: Vec<EntityId>,
    title: Option<EntityId>,
    /// Height of the scale assembly; it rises into view during the intro.
    rig_y: f32,
    /// Smoothed crossbar angle and the value it chases.
    tilt: f32,
    target: f32,
    /// Angle the crossbar is drawn at this frame.
    beam: f32,
}

impl PowerBalance {
    pub fn new() -> Self {
        Self {
            stand: None,
            crossbar: None,
            left_pan: None,
            right_pan: None,
            wealth: Vec::new(),
            poverty: Vec::new(),
            links: Vec::new(),
            chain_glow: None,
            sparks: Self::spark_pool(0),
            spark_ids: Vec::new(),
            title: None,
            rig_y: -5.0,
            tilt: 0.0,
            target: 0.0,
            beam: 0.0,
        }
    }

    fn spark_pool(capacity: usize) -> ParticleSet {
        ParticleSet::new(capacity, |_| Particle { life: 0.0, ..Particle::default() })
            .with_gravity(Vec3::new(0.0, -SPARK_GRAVITY, 0.0))
            .with_decay(SPARK_DECAY)
    }

    /// Revive up to `count` dead sparks at `at`. The pool never grows; when
    /// every spark is alive the burst is cut short.
    fn emit(sparks: &mut ParticleSet, rng: &mut Rng, at: Vec3, count: usize) -> usize {
        let mut emitted = 0;
        for p in sparks.particles_mut().iter_mut().filter(|p| !p.is_alive()) {
            if emitted == count {
                break;
            }
            let (a, b) = (rng.range(0.0, TAU), rng.range(0.0, TAU));
            let dir = Vec3::new(a.cos() * b.sin(), a.sin() * b.sin(), b.cos());
            *p = Particle::new(at, dir * rng.range(0.1, 0.2) * FRAME_RATE);
            emitted += 1;
        }
        emitted
    }

    /// Emit with a per-frame `chance`, scaled to this step.
    fn maybe_emit(&mut self, f: &mut Frame<'_>, chance: f32, at: Vec3, count: usize) {
        if f.rng.next_f32() < chance * f.dt * FRAME_RATE {
            Self::emit(&mut self.sparks, f.rng, at, count);
        }
    }

    fn pan_offset(&self) -> f32 {
        self.beam.sin() * ARM
    }

    fn lean(&mut self, tilt: f32, target: f32) {
        self.tilt = tilt;
        self.target = target;
        self.beam = tilt;
    }

    fn link_radius(&mut self, f: &mut Frame<'_>, radius: f32, y: f32) {
        let count = self.links.len();
        f.each(&self.links, |i, e| {
            let angle = i as f32 / count as f32 * TAU;
            e.position = Vec3::new(angle.cos() * radius, y, angle.sin() * radius);
        });
        f.with(self.chain_glow, |e| e.position.y = y);
    }

    // ── Stages ──────────────────────────────────────────────────────

    fn intro(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        self.rig_y = -5.0 + p * 5.0;
        self.beam = (t * 2.0).sin() * 0.02;
        if p > 0.8 {
            let grow = Vec3::splat((p - 0.8) * 5.0);
            for piece in self.wealth.iter().chain(&self.poverty) {
                f.with(piece.id, |e| {
                    e.visible = true;
                    e.scale = grow;
                });
            }
        }
        f.with(self.title, |e| e.position.y = TITLE_Y + p * 3.0);
    }

    fn tipping(&mut self, f: &mut Frame<'_>, p: f32) {
        let turned = frames(p, TIPPING_SECS);
        self.rig_y = 0.0;
        self.lean(tipping_tilt(p * TIPPING_SECS), -0.6 * p);

        let grow = Vec3::splat(1.0 + p * 0.3);
        let lift = (0.01 * turned).min(1.5);
        for piece in &mut self.wealth {
            piece.lift = lift;
            let spin = piece.turn.y + 0.01 * turned;
            f.with(piece.id, |e| {
                e.visible = true;
                e.scale = grow;
                e.rotation.y = spin;
            });
        }
        // the sink rate ramps with progress
        let sunk = 0.01 * turned * p * 0.5;
        let shrink = Vec3::splat(1.0 - p * 0.3);
        for piece in &mut self.poverty {
            piece.lift = -sunk;
            f.with(piece.id, |e| {
                e.visible = true;
                e.scale = shrink;
            });
        }

        f.with(self.title, |e| set_glow(e, 0.2 + p * 0.3));
        f.camera.position.x = p * 3.0;

        let at = Vec3::new(-ARM, 3.0, 0.0) + f.rng.vec3_signed(Vec3::splat(0.5));
        self.maybe_emit(f, 0.05, at, 5);
    }

    fn imbalance(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        self.lean(imbalance_tilt(p * IMBALANCE_SECS), -0.8 - p * 0.2);

        let shimmer = 0.2 + (t * 3.0).sin() * 0.1;
        let spun = 0.01 * frames(1.0, TIPPING_SECS) + 0.02 * frames(p, IMBALANCE_SECS);
        for (i, piece) in self.wealth.iter_mut().enumerate() {
            piece.lift = 1.5 + (t * 2.0 + i as f32).sin() * 0.1;
            let spin = piece.turn.y + spun;
            f.with(piece.id, |e| {
                e.rotation.y = spin;
                if e.tag == "coin" {
                    set_glow(e, shimmer);
                }
            });
        }

        let n = self.poverty.len();
        let sunk = 0.01 * frames(1.0, TIPPING_SECS) * 0.5;
        for (i, piece) in self.poverty.iter_mut().enumerate() {
            let falling = frames((p - stagger::threshold(i, n, 0.8)).max(0.0), IMBALANCE_SECS);
            let fall = 0.05 * falling;
            let drop = piece.origin.y - sunk - FALL_LIMIT;
            if fall > drop {
                piece.home = piece.refill;
                piece.lift = -((fall - drop) % (piece.refill.y - FALL_LIMIT));
                if !piece.fallen {
                    piece.fallen = true;
                    Self::emit(&mut self.sparks, f.rng, piece.refill, 3);
                }
            } else {
                piece.home = piece.origin;
                piece.lift = -sunk - fall;
            }
            let tumble = piece.turn + Vec3::new(0.02, 0.0, 0.01) * falling;
            f.with(piece.id, |e| e.rotation = tumble);
        }

        let radius = 18.0 - p * 3.0;
        f.camera.set_position(orbit(t * 0.2, radius, CAMERA_HOME.y));
        f.camera.look_at(Vec3::ZERO);

        f.with(self.title, |e| {
            e.scale = Vec3::splat(1.0 + (t * 3.0).sin() * 0.1);
            set_glow(e, 0.5);
        });
    }

    fn chains(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        let y = CHAIN_Y + p * 2.0;
        let radius = CHAIN_RADIUS * (1.0 - p * 0.8);
        self.beam = self.target;

        let roll = 0.01 * frames(p, CHAINS_SECS);
        f.each(&self.links, |_, e| {
            e.visible = true;
            e.rotation.x = roll;
        });
        self.link_radius(f, radius, y);

        let angle = f.rng.range(0.0, TAU);
        let at = Vec3::new(angle.cos() * radius, y, angle.sin() * radius);
        self.maybe_emit(f, 0.1, at, 3);

        let secs = p * CHAINS_SECS;
        f.camera.set_position(chains_camera(t - secs, secs));
        f.camera.look_at(Vec3::ZERO);

        f.with(self.title, |e| {
            e.scale = Vec3::ONE;
            e.position.y = -3.0 + p * 6.0;
        });
    }

    fn finale(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        self.beam = self.target;
        self.link_radius(f, CHAIN_RADIUS * 0.1, 0.0);
        let throb = Vec3::splat(1.0 + (t * 10.0).sin() * 0.1);
        f.each(&self.links, |_, e| {
            e.visible = true;
            e.scale = throb;
        });
        f.with(self.chain_glow, |e| {
            if let Some(light) = e.light.as_mut() {
                light.intensity = 2.0 + p * 8.0;
                light.range = 5.0 + p * 10.0;
            }
        });

        let secs = p * FINALE_SECS;
        let from = chains_camera(t - secs - CHAINS_SECS, CHAINS_SECS);
        let z = chase(from.z, 25.0, 0.0, 0.05, secs);
        f.camera.set_position(Vec3::new(from.x, CAMERA_HOME.y - p * 2.0, z));
        f.camera.look_at(Vec3::ZERO);

        if p > 0.8 {
            self.maybe_emit(f, 0.3, Vec3::ZERO, 20);
        }

        f.with(self.title, |e| {
            e.position.y = 3.0 + (t * 2.0).sin() * 0.1;
            set_glow(e, 0.5 + (t * 5.0).sin() * 0.5);
        });
    }

    // ── Construction ────────────────────────────────────────────────

    fn stand_parts() -> Vec<MeshPart> {
        let metal = Material::standard(Color::from_hex(SILVER)).with_metalness(0.7).with_roughness(0.3);
        let wire = Material::standard(Color::from_hex(SILVER)).with_metalness(0.8).with_roughness(0.2);
        let mut parts = vec![
            MeshPart::new(
                Geometry::Cylinder { radius_top: 1.0, radius_bottom: 1.5, height: 1.0, segments: 16 },
                metal.clone(),
            )
            .at(Vec3::new(0.0, -5.0, 0.0)),
            MeshPart::new(
                Geometry::Cylinder { radius_top: 0.3, radius_bottom: 0.5, height: 8.0, segments: 16 },
                metal,
            )
            .at(Vec3::new(0.0, -0.5, 0.0)),
        ];
        for side in [-ARM, ARM] {
            for i in 0..3 {
                let angle = i as f32 / 3.0 * TAU;
                let hanger = Geometry::Cylinder { radius_top: 0.05, radius_bottom: 0.05, height: 1.5, segments: 8 };
                parts.push(
                    MeshPart::new(hanger, wire.clone())
                        .at(Vec3::new(side + angle.cos() * 1.5, 3.0, angle.sin() * 1.5)),
                );
            }
        }
        parts
    }

    fn scatter_piece(cast: &mut Cast<'_>, tag: &str, mesh: Mesh, home: Vec3, turn: Vec3) -> Piece {
        let entity = Entity::new()
            .with_tag(tag)
            .with_position(home)
            .with_rotation(turn)
            .with_mesh(mesh)
            .hidden();
        let refill = Vec3::new(ARM + cast.rng.signed(1.0), PAN_Y + cast.rng.next_f32(), cast.rng.signed(1.0));
        Piece::new(cast.spawn(entity), home, turn, refill)
    }

    fn build_wealth(&mut self, cast: &mut Cast<'_>) {
        let gold = Color::from_hex(GOLD);
        for i in 0..40 {
            let coin = Geometry::Cylinder { radius_top: 0.3, radius_bottom: 0.3, height: 0.05, segments: 24 };
            let material = Material::standard(gold)
                .with_metalness(1.0)
                .with_roughness(0.1)
                .with_emissive(Color::from_hex(0xffcc00), 0.2);
            let home = Vec3::new(-ARM + cast.rng.signed(1.0), 2.6 + i as f32 * 0.05, cast.rng.signed(1.0));
            let turn = Vec3::new(cast.rng.range(0.0, TAU), cast.rng.range(0.0, TAU), cast.rng.range(0.0, TAU));
            self.wealth.push(Self::scatter_piece(cast, "coin", Mesh::new(coin, material), home, turn));
        }
        for i in 0..5 {
            let gem = Material::standard(Color::WHITE).with_metalness(0.0).with_roughness(0.0).transparent();
            let home = Vec3::new(-ARM + cast.rng.signed(0.75), 3.5 + i as f32 * 0.2, cast.rng.signed(0.75));
            let turn = Vec3::new(cast.rng.range(0.0, TAU), cast.rng.range(0.0, TAU), cast.rng.range(0.0, TAU));
            let mesh = Mesh::new(Geometry::Sphere { radius: 0.4, segments: 4 }, gem);
            self.wealth.push(Self::scatter_piece(cast, "diamond", mesh, home, turn));
        }
        for i in 0..3 {
            let cash = Material::standard(Color::from_hex(0x44aa44)).with_roughness(0.8).with_metalness(0.1);
            let home = Vec3::new(-ARM + cast.rng.signed(0.75), 2.7 + i as f32 * 0.1, cast.rng.signed(0.75));
            let turn = Vec3::new(0.0, cast.rng.range(0.0, TAU), 0.0);
            let mesh = Mesh::new(Geometry::Box { width: 1.2, height: 0.1, depth: 0.6 }, cash);
            self.wealth.push(Self::scatter_piece(cast, "cash", mesh, home, turn));
        }
        let burlap = Material::standard(Color::from_hex(0x8b4513)).with_roughness(0.9).with_metalness(0.1);
        let bag = Mesh::new(Geometry::Sphere { radius: 0.8, segments: 16 }, burlap);
        self.wealth.push(Self::scatter_piece(cast, "money-bag", bag, Vec3::new(-ARM, 3.2, 0.0), Vec3::ZERO));
    }

    fn build_poverty(&mut self, cast: &mut Cast<'_>) {
        let rusty = || Material::standard(Color::from_hex(0x777777)).with_roughness(0.7).with_metalness(0.3);
        for i in 0..6 {
            let link = Geometry::Torus { radius: 0.2, tube: 0.06, radial_segments: 8, tubular_segments: 16 };
            let home = Vec3::new(ARM + cast.rng.signed(0.75), 2.7 + i as f32 * 0.15, cast.rng.signed(0.75));
            let turn = Vec3::new(cast.rng.range(0.0, TAU), cast.rng.range(0.0, TAU), cast.rng.range(0.0, TAU));
            self.poverty.push(Self::scatter_piece(cast, "broken-link", Mesh::new(link, rusty()), home, turn));
        }
        for i in 0..10 {
            let glass = Material::standard(Color::from_hex(0xaaddff)).with_roughness(0.1).transparent();
            let home = Vec3::new(ARM + cast.rng.signed(0.85), 2.6 + i as f32 * 0.05, cast.rng.signed(0.85));
            let turn = Vec3::new(cast.rng.range(0.0, TAU), cast.rng.range(0.0, TAU), cast.rng.range(0.0, TAU));
            let shard = Mesh::new(Geometry::Cone { radius: 0.2, height: 0.5, segments: 4 }, glass);
            self.poverty.push(Self::scatter_piece(cast, "shard", shard, home, turn));
        }
        for i in 0..15 {
            let rock = Material::standard(Color::from_hex(0x999999)).with_roughness(0.9).with_metalness(0.1);
            let size = cast.rng.range(0.2, 0.4);
            let home = Vec3::new(ARM + cast.rng.signed(0.75), 2.6 + i as f32 * 0.1, cast.rng.signed(0.75));
            let stone = Mesh::new(Geometry::Sphere { radius: size, segments: 5 }, rock);
            self.poverty.push(Self::scatter_piece(cast, "stone", stone, home, Vec3::ZERO));
        }
        let bar = Geometry::Box { width: 1.2, height: 0.1, depth: 0.1 };
        let halves = [
            (Vec3::new(ARM, 3.0, 0.0), 0.1),
            (Vec3::new(ARM + 0.6, 2.9, 0.0), -0.15),
        ];
        for (home, tilt) in halves {
            let turn = Vec3::new(0.0, 0.0, std::f32::consts::PI * tilt);
            let mesh = Mesh::new(bar.clone(), rusty().with_metalness(0.3));
            self.poverty.push(Self::scatter_piece(cast, "broken-scale", mesh, home, turn));
        }
    }
}

fn set_glow(e: &mut Entity, intensity: f32) {
    if let Some(mesh) = e.mesh.as_mut() {
        mesh.material.emissive_intensity = intensity;
    }
}

impl Choreography for PowerBalance {
    const STAGES: &'static [StageHandler<Self>] = &[
        Self::intro,
        Self::tipping,
        Self::imbalance,
        Self::chains,
        Self::finale,
    ];

    fn name(&self) -> &str {
        "Power Balance"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        StageSchedule::from_pairs(&[
            ("intro", INTRO_SECS),
            ("tipping", TIPPING_SECS),
            ("imbalance", IMBALANCE_SECS),
            ("chains", CHAINS_SECS),
            ("finale", FINALE_SECS),
        ])
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        cast.spawn(Entity::new().with_tag("ambient").with_light(Light::ambient(Color::from_hex(0x222222), 1.0)));
        let spots = [
            (0xffffff, 15.0, 30.0, Vec3::new(0.0, 15.0, 5.0)),
            (0xffd700, 10.0, 20.0, Vec3::new(-5.0, 10.0, 3.0)),
            (DEEP_RED, 8.0, 20.0, Vec3::new(5.0, 8.0, 3.0)),
        ];
        for (hex, intensity, range, at) in spots {
            cast.spawn(
                Entity::new()
                    .with_tag("spotlight")
                    .with_position(at)
                    .with_light(Light::spot(Color::from_hex(hex), intensity, range)),
            );
        }
        cast.spawn(
            Entity::new()
                .with_tag("rim")
                .with_position(Vec3::new(0.0, -5.0, -10.0))
                .with_light(Light::point(Color::from_hex(DARK_BLUE), 5.0, 15.0)),
        );

        self.stand = Some(cast.spawn(Entity::new().with_tag("stand").with_mesh(Mesh::group(Self::stand_parts()))));
        let polished = Material::standard(Color::from_hex(GOLD)).with_metalness(0.9).with_roughness(0.1);
        let crossbar = Mesh::new(Geometry::Box { width: 12.0, height: 0.4, depth: 0.4 }, polished.clone());
        self.crossbar = Some(cast.spawn(Entity::new().with_tag("crossbar").with_mesh(crossbar)));
        let pan = Geometry::Cylinder { radius_top: 2.0, radius_bottom: 2.0, height: 0.2, segments: 32 };
        self.left_pan = Some(cast.spawn(Entity::new().with_tag("pan").with_mesh(Mesh::new(pan.clone(), polished))));
        let dull = Material::standard(Color::from_hex(GOLD)).with_metalness(0.7).with_roughness(0.3);
        self.right_pan = Some(cast.spawn(Entity::new().with_tag("pan").with_mesh(Mesh::new(pan, dull))));

        self.build_wealth(cast);
        self.build_poverty(cast);

        for i in 0..CHAIN_LINKS {
            let angle = i as f32 / CHAIN_LINKS as f32 * TAU;
            let link = Geometry::Torus { radius: 0.3, tube: 0.1, radial_segments: 8, tubular_segments: 16 };
            let steel = Material::standard(Color::from_hex(SILVER)).with_metalness(0.8).with_roughness(0.2);
            let entity = Entity::new()
                .with_tag("chain-link")
                .with_rotation(Vec3::new(0.0, angle + FRAC_PI_2, 0.0))
                .with_mesh(Mesh::new(link, steel))
                .hidden();
            self.links.push(cast.spawn(entity));
        }
        self.chain_glow = Some(cast.spawn(
            Entity::new()
                .with_tag("chain-glow")
                .with_light(Light::point(Color::from_hex(DEEP_RED), 2.0, 5.0))
                .hidden(),
        ));

        self.sparks = Self::spark_pool(SPARKS);
        for _ in 0..SPARKS {
            let spark = Mesh::new(
                Geometry::Sphere { radius: 0.05, segments: 8 },
                Material::basic(Color::from_hex(0xffffaa)).transparent(),
            );
            self.spark_ids.push(cast.spawn(Entity::new().with_tag("spark").with_mesh(spark).hidden()));
        }

        cast.request_font(FONT);
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        f.camera.set_position(CAMERA_HOME);
        f.camera.look_at(Vec3::ZERO);
        self.rig_y = -5.0;
        self.tilt = 0.0;
        self.target = 0.0;
        self.beam = 0.0;

        for piece in self.wealth.iter_mut().chain(self.poverty.iter_mut()) {
            piece.restore();
            let turn = piece.turn;
            f.with(piece.id, |e| {
                e.visible = false;
                e.scale = Vec3::ONE;
                e.rotation = turn;
                if e.tag == "coin" {
                    set_glow(e, 0.2);
                }
            });
        }

        f.each(&self.links, |_, e| {
            e.visible = false;
            e.scale = Vec3::ONE;
            e.rotation.x = 0.0;
        });
        self.link_radius(f, CHAIN_RADIUS, CHAIN_Y);
        f.with(self.chain_glow, |e| {
            e.visible = false;
            if let Some(light) = e.light.as_mut() {
                light.intensity = 2.0;
                light.range = 5.0;
            }
        });

        for p in self.sparks.particles_mut() {
            p.life = 0.0;
        }
        f.each(&self.spark_ids, |_, e| e.visible = false);

        f.with(self.title, |e| {
            e.position.y = TITLE_Y;
            e.scale = Vec3::ONE;
            set_glow(e, 0.2);
        });
    }

    /// Lays out the scale from the tilt state and advances the sparks.
    fn continuous(&mut self, f: &mut Frame<'_>) {
        let (rig, beam, offset) = (self.rig_y, self.beam, self.pan_offset());
        f.with(self.stand, |e| e.position.y = rig);
        f.with(self.crossbar, |e| {
            e.position.y = rig + 3.5;
            e.rotation.z = beam;
        });
        f.with(self.left_pan, |e| e.position = Vec3::new(-ARM, rig + PAN_Y + offset, 0.0));
        f.with(self.right_pan, |e| e.position = Vec3::new(ARM, rig + PAN_Y - offset, 0.0));
        for piece in &self.wealth {
            let at = piece.home + Vec3::Y * (piece.lift + offset);
            f.with(piece.id, |e| e.position = at);
        }
        for piece in &self.poverty {
            let at = piece.home + Vec3::Y * (piece.lift - offset);
            f.with(piece.id, |e| e.position = at);
        }
        let chains_shown = f.stage >= 4;
        f.with(self.chain_glow, |e| e.visible = chains_shown);

        self.sparks.update(f.dt, |_, old| Particle { life: 0.0, velocity: Vec3::ZERO, ..*old });
        let sparks = self.sparks.particles();
        f.each(&self.spark_ids, |i, e| {
            let p = &sparks[i];
            e.visible = p.is_alive();
            e.position = p.position;
            e.scale = Vec3::splat(p.life.max(0.0) * 0.5);
            e.opacity = p.life.clamp(0.0, 1.0);
        });
    }

    fn asset_ready(&mut self, cast: &mut Cast<'_>, event: &AssetEvent) {
        let Some(font) = common::font_of(event) else {
            log::warn!("power-balance: font failed, titles skipped");
            return;
        };
        let gold = Color::from_hex(GOLD);
        let material = Material::standard(gold).with_metalness(0.8).with_roughness(0.2).with_emissive(gold, 0.2);
        let mut title = common::text("PRIVILEGE & POWER", 1.0, font, material, Vec3::new(0.0, TITLE_Y, 0.0));
        title.visible = true;
        self.title = Some(cast.spawn(title));

        let sign = Material::standard(gold).with_metalness(0.8).with_roughness(0.2);
        let home = Vec3::new(-ARM, 3.2, 0.5);
        let id = cast.spawn(common::text("$", 0.5, font, sign, home).with_tag("dollar"));
        let dollar = Piece::new(id, home, Vec3::ZERO, home);
        // joins the pile already on the pan
        let shown = self.wealth.first().and_then(|p| cast.entity(p.id).map(|e| (e.visible, e.scale)));
        if let Some((visible, scale)) = shown {
            cast.with(dollar.id, |e| {
                e.visible = visible;
                e.scale = scale;
            });
        }
        self.wealth.push(dollar);
    }

    fn teardown(&mut self) {
        self.stand = None;
        self.crossbar = None;
        self.left_pan = None;
        self.right_pan = None;
        self.wealth.clear();
        self.poverty.clear();
        self.links.clear();
        self.chain_glow = None;
        self.sparks = Self::spark_pool(0);
        self.spark_ids.clear();
        self.title = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::*;

    fn live_sparks(show: &PowerBalance) -> usize {
        show.sparks.particles().iter().filter(|p| p.is_alive()).count()
    }

    #[test]
    fn smoke_cycle() {
        smoke(PowerBalance::new());
    }

    #[test]
    fn tilt_lags_behind_its_target() {
        let (mut ctx, mut tl) = start(PowerBalance::new());
        run_to(&mut ctx, &mut tl, 6.95, 0.016);
        let show = tl.choreography();
        assert!(show.tilt > -0.6 && show.tilt < -0.45, "tilt {}", show.tilt);
        let left = entity(&ctx, show.left_pan).position.y;
        let right = entity(&ctx, show.right_pan).position.y;
        assert!(left < right);

        run_to(&mut ctx, &mut tl, 11.9, 0.016);
        let show = tl.choreography();
        assert!((show.tilt + 1.0).abs() < 0.05, "tilt {}", show.tilt);
    }

    #[test]
    fn chain_ring_tightens() {
        let (mut ctx, mut tl) = start(PowerBalance::new());
        run_to(&mut ctx, &mut tl, 14.0, 0.05);
        let show = tl.choreography();
        let link = ctx.scene.get(show.links[0]).unwrap();
        assert!(link.visible);
        let radius = Vec3::new(link.position.x, 0.0, link.position.z).length();
        assert!((radius - CHAIN_RADIUS * 0.6).abs() < 0.05, "radius {radius}");
    }

    #[test]
    fn sparks_stay_in_pool_and_loop_clears_them() {
        let (mut ctx, mut tl) = start(PowerBalance::new());
        let mut seen = 0;
        while tl.elapsed() < 18.9 {
            tl.update(&mut ctx, 0.016);
            seen = seen.max(live_sparks(tl.choreography()));
            assert_eq!(tl.choreography().sparks.len(), SPARKS);
        }
        assert!(seen > 0);

        run_to(&mut ctx, &mut tl, 19.2, 0.016);
        let show = tl.choreography();
        assert_eq!(live_sparks(show), 0);
        assert!(show.spark_ids.iter().all(|id| !ctx.scene.get(*id).unwrap().visible));
        assert!(show.links.iter().all(|id| !ctx.scene.get(*id).unwrap().visible));
        assert!(show.rig_y < -4.5);
    }

    #[test]
    fn dropped_pieces_refill_once() {
        let (mut ctx, mut tl) = start(PowerBalance::new());
        run_to(&mut ctx, &mut tl, 12.5, 0.25);
        let show = tl.choreography();
        let fallen: Vec<&Piece> = show.poverty.iter().filter(|p| p.fallen).collect();
        assert!(!fallen.is_empty());
        assert!(fallen.len() < show.poverty.len());
        for piece in fallen {
            assert_eq!(piece.home, piece.refill);
            assert!(piece.home.y + piece.lift > FALL_LIMIT);
        }
        assert!(show.wealth.iter().all(|p| !p.fallen));
    }

    #[test]
    fn same_pose_for_any_split() {
        crate::common::testing::same_pose_for_any_split(PowerBalance::new, &[2.9, 6.95, 11.9, 14.0, 17.5], &["spark"]);
    }
}
