//! Money Transfer: a stack of bills leaves a phone, arcs along a Bezier path
//! and lands in a bank, with a pull-back on completion.

use std::f32::consts::PI;

use glam::Vec3;
use reel_engine::*;

use crate::common::{self, FONT};

const PHONE_HOME: Vec3 = Vec3::new(-5.0, 0.0, 0.0);
const MONEY_HOME: Vec3 = Vec3::new(-5.0, 1.0, 0.0);
const BANK_HOME: Vec3 = Vec3::new(5.0, 0.0, 0.0);
const AMOUNT_HOME: Vec3 = Vec3::new(-6.5, 2.0, 0.0);
const CAMERA_Z: f32 = 15.0;
const PULL_BACK: f32 = 5.0;
const SEED_SCALE: f32 = 0.01;
const PATH_OPACITY: f32 = 0.6;

pub struct MoneyTransfer {
    route: CubicBezier,
    phone: Option<EntityId>,
    money: Option<EntityId>,
    bank: Option<EntityId>,
    path: Option<EntityId>,
    amount: Option<EntityId>,
    complete: Option<EntityId>,
    dollar: Option<EntityId>,
}

impl MoneyTransfer {
    pub fn new() -> Self {
        Self {
            route: CubicBezier::new(
                MONEY_HOME,
                Vec3::new(-2.0, 3.0, 0.0),
                Vec3::new(2.0, 3.0, 0.0),
                Vec3::new(5.0, 0.0, 0.0),
            ),
            phone: None,
            money: None,
            bank: None,
            path: None,
            amount: None,
            complete: None,
            dollar: None,
        }
    }

    // ── Stages ──────────────────────────────────────────────────────

    fn intro(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        f.with(self.phone, |e| e.scale = Vec3::splat((p * 2.0).min(1.0)));
        if p > 0.5 {
            let grow = ((p - 0.5) * 4.0).min(1.0);
            f.with(self.money, |e| e.scale = Vec3::splat(grow.max(SEED_SCALE)));
        }
        if p > 0.7 {
            f.with(self.amount, |e| {
                e.visible = true;
                e.position.y = AMOUNT_HOME.y + (t * 2.0).sin() * 0.05;
            });
        }
    }

    fn move_start(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        f.with(self.phone, |e| e.scale = Vec3::ONE);
        f.with(self.money, |e| {
            e.scale = Vec3::ONE;
            e.position = MONEY_HOME + Vec3::Y * (p * 1.5);
            e.rotation.y = p * PI;
        });
        f.with(self.path, |e| e.opacity = p * PATH_OPACITY);
        if p > 0.7 {
            let grow = ((p - 0.7) / 0.3).min(1.0);
            f.with(self.bank, |e| {
                e.visible = true;
                e.scale = Vec3::splat(grow.max(SEED_SCALE));
            });
        }
        f.with(self.amount, |e| {
            e.visible = true;
            e.position.x = AMOUNT_HOME.x + p * 1.5;
            e.position.y = AMOUNT_HOME.y + (t * 2.0).sin() * 0.05;
        });
    }

    fn journey(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        let point = self.route.point_at(p);
        f.with(self.money, |e| {
            e.position = point;
            e.rotation = Vec3::new(t.sin() * 0.3, t * 2.0, 0.0);
        });
        f.with(self.path, |e| e.opacity = PATH_OPACITY);
        f.with(self.amount, |e| {
            e.visible = true;
            e.position = point + Vec3::Y * 0.8;
        });
        f.with(self.bank, |e| {
            e.visible = true;
            e.scale = Vec3::splat(pulse(0.05, 5.0, t));
        });
    }

    fn arrival(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        let end = self.route.point_at(1.0);
        f.with(self.money, |e| {
            e.position = end;
            e.rotation.y = t * (1.0 - p) * 2.0;
            e.scale = Vec3::splat(1.0 - p * 0.9);
        });
        f.with(self.bank, |e| {
            e.visible = true;
            e.scale = Vec3::splat(1.0 + (t * 10.0).sin() * 0.1 * p);
            if let Some(mesh) = e.mesh.as_mut() {
                for m in mesh.materials_mut() {
                    m.emissive_intensity = 0.5 + p * 0.5;
                }
            }
        });
        f.with(self.amount, |e| e.visible = p < 0.5);
    }

    fn completion(&mut self, f: &mut Frame<'_>, p: f32) {
        let t = f.time;
        f.with(self.money, |e| e.visible = false);
        f.with(self.amount, |e| e.visible = false);
        f.with(self.path, |e| e.opacity = PATH_OPACITY * (1.0 - p));
        f.with(self.bank, |e| e.scale = Vec3::splat(pulse(0.1, 3.0, t)));
        f.with(self.complete, |e| {
            e.visible = p > 0.2;
            e.opacity = ((p - 0.2) * 2.0).clamp(0.0, 1.0);
            e.position.y = 3.0 + (t * 2.0).sin() * 0.1;
        });
        if p > 0.5 {
            f.camera.position.z = CAMERA_Z + ramp(p, 0.5, 1.0) * PULL_BACK;
        }
    }

    // ── Construction ────────────────────────────────────────────────

    fn phone_parts() -> Vec<MeshPart> {
        let body = Material::standard(Color::from_hex(0x111111)).with_metalness(0.9).with_roughness(0.1);
        let screen = Material::standard(Color::from_hex(0x88ccff))
            .with_emissive(Color::from_hex(0x1155aa), 0.5)
            .with_metalness(0.9)
            .with_roughness(0.1);
        let flat = |w: f32, h: f32| Geometry::Plane { width: w, height: h, width_segments: 1, height_segments: 1 };
        vec![
            MeshPart::new(Geometry::Box { width: 1.5, height: 3.0, depth: 0.1 }, body),
            MeshPart::new(Geometry::Box { width: 1.3, height: 2.7, depth: 0.11 }, screen).at(Vec3::new(0.0, 0.0, 0.01)),
            MeshPart::new(flat(1.1, 2.5), Material::basic(Color::WHITE)).at(Vec3::new(0.0, 0.0, 0.06)),
            MeshPart::new(flat(1.1, 0.3), Material::basic(Color::from_hex(0x2266cc))).at(Vec3::new(0.0, 1.0, 0.07)),
            MeshPart::new(flat(0.8, 0.2), Material::basic(Color::from_hex(0x44cc88))).at(Vec3::new(0.0, 0.5, 0.07)),
            MeshPart::new(flat(0.8, 0.3), Material::basic(Color::from_hex(0xff5533))).at(Vec3::new(0.0, -0.3, 0.07)),
        ]
    }

    fn money_parts(rng: &mut Rng) -> Vec<MeshPart> {
        let paper = Material::standard(Color::from_hex(0xecf0e1)).with_metalness(0.1).with_roughness(0.6);
        let ink = Material::basic(Color::from_hex(0x106630));
        let mut parts = Vec::new();
        for i in 0..7 {
            let z = 0.01 * i as f32;
            let jitter = Vec3::new(rng.signed(0.025), rng.signed(0.025), z);
            parts.push(
                MeshPart::new(Geometry::Box { width: 1.2, height: 0.5, depth: 0.01 }, paper.clone())
                    .at(jitter)
                    .rotated(Vec3::new(0.0, 0.0, rng.signed(0.05))),
            );
            for x in [-0.35, 0.35] {
                parts.push(
                    MeshPart::new(Geometry::Ring { inner: 0.15, outer: 0.2, segments: 32 }, ink.clone())
                        .at(Vec3::new(x, 0.0, 0.011 + z)),
                );
            }
            for j in 0..3 {
                let line = Geometry::Plane { width: 0.6, height: 0.03, width_segments: 1, height_segments: 1 };
                parts.push(MeshPart::new(line, ink.clone()).at(Vec3::new(0.0, -0.1 + j as f32 * 0.1, 0.011 + z)));
            }
        }
        parts.push(MeshPart::new(
            Geometry::Box { width: 1.4, height: 0.7, depth: 0.3 },
            common::halo(0x88ff99),
        ));
        parts
    }

    fn bank_parts() -> Vec<MeshPart> {
        let stone = |hex: u32, metal: f32| {
            Material::standard(Color::from_hex(hex)).with_metalness(metal).with_roughness(1.0 - metal)
        };
        let mut parts = vec![
            MeshPart::new(Geometry::Box { width: 2.0, height: 2.0, depth: 1.0 }, stone(0xaaaaaa, 0.5)),
            MeshPart::new(Geometry::Cone { radius: 1.5, height: 1.0, segments: 4 }, stone(0x444444, 0.5))
                .at(Vec3::new(0.0, 1.5, 0.0))
                .rotated(Vec3::new(0.0, PI / 4.0, 0.0)),
        ];
        for i in 0..4 {
            let x = if i < 2 { -0.8 } else { 0.8 };
            let z = if i % 2 == 0 { -0.6 } else { 0.6 };
            parts.push(
                MeshPart::new(
                    Geometry::Cylinder { radius_top: 0.1, radius_bottom: 0.1, height: 1.6, segments: 16 },
                    stone(0xffffff, 0.3),
                )
                .at(Vec3::new(x, -0.2, z)),
            );
        }
        parts.push(
            MeshPart::new(Geometry::Box { width: 2.4, height: 0.2, depth: 1.2 }, stone(0x999999, 0.3))
                .at(Vec3::new(0.0, -1.0, 0.1)),
        );
        parts.push(MeshPart::new(
            Geometry::Box { width: 2.4, height: 2.4, depth: 1.4 },
            common::halo(0x5588ff),
        ));
        parts
    }
}

impl Choreography for MoneyTransfer {
    const STAGES: &'static [StageHandler<Self>] = &[
        Self::intro,
        Self::move_start,
        Self::journey,
        Self::arrival,
        Self::completion,
    ];

    fn name(&self) -> &str {
        "Money Transfer"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        StageSchedule::from_pairs(&[
            ("intro", 2.0),
            ("move-start", 3.0),
            ("journey", 5.0),
            ("arrival", 3.0),
            ("complete", 3.0),
        ])
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        cast.spawn(Entity::new().with_tag("ambient").with_light(Light::ambient(Color::from_hex(0x404040), 2.0)));
        cast.spawn(
            Entity::new()
                .with_position(Vec3::new(-3.0, 2.0, 5.0))
                .with_light(Light::point(Color::from_hex(0x6699ff), 10.0, 20.0)),
        );
        cast.spawn(
            Entity::new()
                .with_position(Vec3::new(3.0, -2.0, 5.0))
                .with_light(Light::point(Color::from_hex(0x44ff88), 10.0, 20.0)),
        );

        self.phone = Some(cast.spawn(Entity::new().with_tag("phone").with_mesh(Mesh::group(Self::phone_parts()))));
        let money = Mesh::group(Self::money_parts(cast.rng));
        self.money = Some(cast.spawn(Entity::new().with_tag("money").with_mesh(money)));
        self.bank = Some(cast.spawn(Entity::new().with_tag("bank").with_mesh(Mesh::group(Self::bank_parts()))));
        let path = Mesh::line(self.route.sample(50), Material::basic(Color::from_hex(0x4488ff)).transparent());
        self.path = Some(cast.spawn(Entity::new().with_tag("path").with_mesh(path)));

        cast.request_font(FONT);
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        f.camera.set_position(Vec3::new(0.0, 0.0, CAMERA_Z));
        f.with(self.phone, |e| {
            e.position = PHONE_HOME;
            e.scale = Vec3::ONE;
        });
        f.with(self.money, |e| {
            e.position = MONEY_HOME;
            e.rotation = Vec3::ZERO;
            e.scale = Vec3::splat(SEED_SCALE);
            e.visible = true;
        });
        f.with(self.bank, |e| {
            e.position = BANK_HOME;
            e.scale = Vec3::splat(SEED_SCALE);
            e.visible = false;
            if let Some(mesh) = e.mesh.as_mut() {
                for m in mesh.materials_mut() {
                    m.emissive_intensity = 0.0;
                }
            }
        });
        f.with(self.path, |e| e.opacity = 0.0);
        f.with(self.amount, |e| {
            e.visible = false;
            e.position = AMOUNT_HOME;
        });
        f.with(self.complete, |e| e.visible = false);
    }

    fn continuous(&mut self, f: &mut Frame<'_>) {
        // the "$" glyph rides on top of the stack
        let Some(money) = self.money else { return };
        let Some(pose) = f.entity(money).map(|e| (e.position, e.rotation, e.scale, e.visible)) else {
            return;
        };
        f.with(self.dollar, |e| {
            (e.position, e.rotation, e.scale, e.visible) = pose;
            e.position.z += 0.1;
        });
    }

    fn asset_ready(&mut self, cast: &mut Cast<'_>, event: &AssetEvent) {
        let Some(font) = common::font_of(event) else {
            log::warn!("money-transfer: titles unavailable, font failed");
            return;
        };
        self.amount = Some(cast.spawn(common::text("$38 Million", 0.4, font, common::glowing(0xffff00, 0.5), AMOUNT_HOME)));
        self.complete = Some(cast.spawn(common::text(
            "Transaction Complete",
            0.5,
            font,
            common::glowing(0x44ff44, 0.5).transparent(),
            Vec3::new(0.0, 3.0, 0.0),
        )));
        self.dollar = Some(cast.spawn(common::text("$", 0.4, font, common::glowing(0x106630, 0.3), MONEY_HOME)));
    }

    fn teardown(&mut self) {
        self.phone = None;
        self.money = None;
        self.bank = None;
        self.path = None;
        self.amount = None;
        self.complete = None;
        self.dollar = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::*;

    #[test]
    fn smoke_cycle() {
        smoke(MoneyTransfer::new());
    }

    #[test]
    fn money_rides_the_curve() {
        let (mut ctx, mut tl) = start(MoneyTransfer::new());
        run_to(&mut ctx, &mut tl, 7.5, 0.05);
        let show = tl.choreography();
        let money = entity(&ctx, show.money);
        assert!((money.position - show.route.point_at(0.5)).length() < 1e-3);
    }

    #[test]
    fn titles_appear_after_font_loads() {
        let (mut ctx, mut tl) = start(MoneyTransfer::new());
        assert!(tl.choreography().amount.is_none());
        deliver_assets(&mut ctx, &mut tl);
        run_to(&mut ctx, &mut tl, 1.6, 0.05);
        assert!(entity(&ctx, tl.choreography().amount).visible);
        run_to(&mut ctx, &mut tl, 15.5, 0.05);
        assert!(entity(&ctx, tl.choreography().complete).visible);
        assert!(!entity(&ctx, tl.choreography().money).visible);
    }

    #[test]
    fn camera_pulls_back_then_loop_restores() {
        let (mut ctx, mut tl) = start(MoneyTransfer::new());
        run_to(&mut ctx, &mut tl, 15.9, 0.05);
        assert!(ctx.camera.position.z > CAMERA_Z + 4.0);
        run_to(&mut ctx, &mut tl, 16.2, 0.05);
        assert_eq!(ctx.camera.position.z, CAMERA_Z);
        let show = tl.choreography();
        assert_eq!(entity(&ctx, show.money).scale, Vec3::splat(SEED_SCALE));
        assert!(!entity(&ctx, show.bank).visible);
    }

    #[test]
    fn same_pose_for_any_split() {
        crate::common::testing::same_pose_for_any_split(MoneyTransfer::new, &[1.5, 3.8, 7.3, 11.2, 14.4], &[]);
    }
}
