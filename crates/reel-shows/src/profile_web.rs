//! Profile Web: a ring of profile cards linked to a central card by flowing
//! connections. The overview slowly turns the ring; each focus stage flies
//! the camera out to one linked card and back.

use std::f32::consts::PI;

use glam::{EulerRot, Quat, Vec3};
use reel_engine::*;

use crate::common::{self, FONT};

const CAPTION_FONT: &str = "helvetiker_regular";
const ACCENT: u32 = 0x00ccff;
const FLUID: u32 = 0x22eeff;
const CAMERA_HOME: Vec3 = Vec3::new(0.0, 5.0, 15.0);
const TITLE_Y: f32 = 6.0;
const OVERVIEW_SECS: f32 = 3.0;
const FOCUS_SECS: f32 = 4.0;
/// Ring rotation during the overview, radians per second.
const SPIN_RATE: f32 = 0.05;
const LINE_SEGMENTS: usize = 20;
const FLOW_POINTS: usize = 50;

/// Card part layout: body, photo, then the three caption slots.
const PHOTO_PART: usize = 1;
const CAPTION_PARTS: usize = 2;

/// One person on the board. The first profile in a list is the centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub relationship: String,
    /// Texture name requested for the card photo.
    pub image: String,
    pub position: Vec3,
}

impl Profile {
    pub fn new(name: &str, age: u32, relationship: &str, image: &str, position: Vec3) -> Self {
        Self {
            name: name.to_string(),
            age,
            relationship: relationship.to_string(),
            image: image.to_string(),
            position,
        }
    }

    fn captions(&self) -> [(String, f32, f32); 3] {
        [
            (self.name.clone(), -0.5, 0.3),
            (format!("Age: {}", self.age), -1.1, 0.2),
            (self.relationship.clone(), -1.7, 0.15),
        ]
    }
}

/// A central figure and eight associates placed around it.
pub fn default_profiles() -> Vec<Profile> {
    vec![
        Profile::new("Central Figure", 51, "Central Figure", "profile_center", Vec3::ZERO),
        Profile::new("A. Moreira", 79, "Father, Former Head of State", "profile_1", Vec3::new(8.0, 2.0, 0.0)),
        Profile::new("B. Tavares", 48, "Husband, Art Collector", "profile_2", Vec3::new(6.0, 0.0, 6.0)),
        Profile::new("C. Vieira", 66, "Business Associate", "profile_3", Vec3::new(0.0, -2.0, 8.0)),
        Profile::new("D. Oliveira", 55, "Business Partner", "profile_4", Vec3::new(-6.0, 0.0, 6.0)),
        Profile::new("E. Leite", 50, "Financial Advisor", "profile_5", Vec3::new(-8.0, 2.0, 0.0)),
        Profile::new("F. Rocha", 45, "Former CFO", "profile_6", Vec3::new(-6.0, 0.0, -6.0)),
        Profile::new("G. Pontes", 52, "Legal Representative", "profile_7", Vec3::new(0.0, -2.0, -8.0)),
        Profile::new("H. Cunha", 45, "Account Manager", "profile_8", Vec3::new(6.0, 0.0, -6.0)),
    ]
}

/// Side of the centre card a connection leaves from, towards `target`.
fn anchor_towards(target: Vec3) -> Vec3 {
    if target.x.abs() > target.z.abs() {
        Vec3::new(1.5_f32.copysign(target.x), 0.0, 0.0)
    } else if target.z > 0.0 {
        Vec3::new(0.0, -2.0, 0.0)
    } else {
        Vec3::new(0.0, 2.0, 0.0)
    }
}

/// Arc between two cards, bowed sideways and lifted.
fn connection_curve(start: Vec3, end: Vec3) -> QuadraticBezier {
    let span = end - start;
    let dir = span.normalize_or_zero();
    let side = Vec3::new(-dir.z, 0.0, dir.x).normalize_or_zero() * span.length() * 0.25;
    QuadraticBezier::arched(start, end, side + Vec3::Y)
}

/// Euler pose turning a card at `at` towards the origin, leaning back.
fn facing_centre(at: Vec3, slant: f32) -> Vec3 {
    let look = Quat::from_rotation_y((-at.x).atan2(-at.z));
    let (x, y, z) = (look * Quat::from_rotation_x(-slant)).to_euler(EulerRot::XYZ);
    Vec3::new(x, y, z)
}

struct Card {
    id: EntityId,
    index: usize,
}

struct Link {
    line: EntityId,
    flow_points: EntityId,
    /// Index of the linked profile.
    profile: usize,
    anchor: Vec3,
}

/// Offset of the flow dots along a connection, in [0, 1). Dots creep at a
/// base speed and run faster while their profile is in focus.
fn flow_offset(lap_time: f32, stage: usize, progress: f32, profile: usize) -> f32 {
    let focused = match stage.cmp(&(profile + 1)) {
        std::cmp::Ordering::Less => 0.0,
        std::cmp::Ordering::Equal => progress * FOCUS_SECS,
        std::cmp::Ordering::Greater => FOCUS_SECS,
    };
    (0.05 * lap_time + 0.15 * focused).fract()
}

pub struct ProfileWeb {
    profiles: Vec<Profile>,
    cards: Vec<Card>,
    links: Vec<Link>,
    glow: Option<EntityId>,
    title: Option<EntityId>,
    /// Card positions this frame, in card order.
    poses: Vec<Vec3>,
    /// Ring rotation about Y, gained during the overview.
    spin: f32,
    /// Profile the camera is visiting, and how far out it is (0 home, 1 there).
    focus: Option<usize>,
    flight: f32,
}

impl ProfileWeb {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles,
            cards: Vec::new(),
            links: Vec::new(),
            glow: None,
            title: None,
            poses: Vec::new(),
            spin: 0.0,
            focus: None,
            flight: 0.0,
        }
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Where profile `index` sits at the current ring rotation, before hover.
    fn placed(&self, index: usize) -> Vec3 {
        Quat::from_rotation_y(self.spin) * self.profiles[index].position
    }

    /// Camera route from home to a vantage point above profile `index`.
    fn camera_path(&self, index: usize) -> QuadraticBezier {
        let centre = self.placed(0);
        let target = self.placed(index);
        let control = (centre + target) * 0.5 + Vec3::Y * 3.0;
        let vantage = Vec3::new(target.x * 0.8, target.y + 3.0, target.z * 0.8);
        QuadraticBezier::new(CAMERA_HOME, control, vantage)
    }

    // ── Stages ──────────────────────────────────────────────────────

    fn overview(&mut self, f: &mut Frame<'_>, p: f32) {
        self.focus = None;
        self.flight = 0.0;
        self.spin = SPIN_RATE * p * OVERVIEW_SECS;
        f.camera.set_position(CAMERA_HOME);
        f.camera.look_at(Vec3::ZERO);
    }

    /// Out along the path, hold, then back home for the next stage.
    fn focus(&mut self, f: &mut Frame<'_>, p: f32) {
        let index = f.stage - 1;
        if index >= self.profiles.len() {
            return;
        }
        self.focus = Some(index);
        self.flight = if p < 0.4 {
            ease_in_out_cubic(ramp(p, 0.0, 0.4))
        } else if p < 0.7 {
            1.0
        } else {
            1.0 - ease_in_out_cubic(ramp(p, 0.7, 1.0))
        };
        f.camera.set_position(self.camera_path(index).point_at(self.flight));
        f.camera.look_at(lerp_vec3(Vec3::ZERO, self.placed(index), self.flight));
    }

    // ── Construction ────────────────────────────────────────────────

    fn card_parts(centre: bool) -> Vec<MeshPart> {
        let body = Material::standard(Color::from_hex(0x202030)).with_roughness(0.7).with_metalness(0.3);
        let photo = Material::standard(Color::WHITE).with_roughness(0.5).with_metalness(0.3);
        let slot = Material::basic(Color::WHITE).transparent();
        let mut parts = vec![
            MeshPart::new(Geometry::Box { width: 3.0, height: 4.0, depth: 0.2 }, body),
            MeshPart::new(
                Geometry::Plane { width: 2.5, height: 2.0, width_segments: 1, height_segments: 1 },
                photo,
            )
            .at(Vec3::new(0.0, 0.8, 0.11)),
        ];
        for y in [-0.5, -1.1, -1.7] {
            let placeholder = Geometry::Plane { width: 2.0, height: 0.3, width_segments: 1, height_segments: 1 };
            parts.push(MeshPart::new(placeholder, slot.clone()).at(Vec3::new(0.0, y, 0.11)));
        }
        if centre {
            parts.push(MeshPart::new(
                Geometry::Box { width: 3.2, height: 4.2, depth: 0.15 },
                common::halo(ACCENT),
            ));
        }
        parts
    }

    fn fit_captions(&self, cast: &mut Cast<'_>, font: FontHandle) {
        let ink = Material::standard(Color::WHITE).with_roughness(0.3).with_metalness(0.7);
        for card in &self.cards {
            let captions = self.profiles[card.index].captions();
            cast.with(card.id, |e| {
                let Some(Geometry::Group(parts)) = e.mesh.as_mut().map(|m| &mut m.geometry) else {
                    return;
                };
                for (part, (content, _, size)) in parts.iter_mut().skip(CAPTION_PARTS).zip(captions) {
                    part.geometry = Geometry::Text { content, size, depth: 0.01, font };
                    part.material = ink.clone();
                }
            });
        }
    }

    fn fit_photo(&self, cast: &mut Cast<'_>, image: &str, texture: TextureHandle) {
        for card in self.cards.iter().filter(|c| self.profiles[c.index].image == image) {
            cast.with(card.id, |e| {
                if let Some(Geometry::Group(parts)) = e.mesh.as_mut().map(|m| &mut m.geometry) {
                    if let Some(photo) = parts.get_mut(PHOTO_PART) {
                        photo.material.texture = Some(texture);
                    }
                }
            });
        }
    }
}

impl Choreography for ProfileWeb {
    fn handler(&self, stage: usize) -> Option<StageHandler<Self>> {
        match stage {
            1 => Some(Self::overview),
            s if s >= 2 && s <= self.profiles.len() => Some(Self::focus),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        "Profile Web"
    }

    fn schedule(&self) -> Result<StageSchedule> {
        let mut stages = vec![StageSpec::new("overview", OVERVIEW_SECS)];
        stages.extend((1..self.profiles.len()).map(|k| StageSpec::new(format!("focus-{k}"), FOCUS_SECS)));
        StageSchedule::new(stages)
    }

    fn build(&mut self, cast: &mut Cast<'_>) {
        cast.spawn(Entity::new().with_tag("ambient").with_light(Light::ambient(Color::from_hex(0x333344), 1.0)));
        cast.spawn(
            Entity::new()
                .with_tag("spotlight")
                .with_position(Vec3::new(0.0, 15.0, 5.0))
                .with_light(Light::spot(Color::from_hex(0x6688ff), 10.0, 30.0)),
        );
        for (intensity, at) in [(5.0, Vec3::new(-10.0, 5.0, 5.0)), (3.0, Vec3::new(10.0, -5.0, -5.0))] {
            cast.spawn(
                Entity::new()
                    .with_tag("rim")
                    .with_position(at)
                    .with_light(Light::point(Color::from_hex(ACCENT), intensity, 20.0)),
            );
        }

        let Some(centre) = self.profiles.first().map(|p| p.position) else {
            log::warn!("profile-web: no profiles to show");
            return;
        };
        for (index, profile) in self.profiles.iter().enumerate() {
            let entity = Entity::new()
                .with_tag(profile.name.as_str())
                .with_position(profile.position)
                .with_mesh(Mesh::group(Self::card_parts(index == 0)));
            self.cards.push(Card { id: cast.spawn(entity), index });
            cast.request_texture(&profile.image);
        }
        self.poses.reserve(self.cards.len());
        self.glow = Some(cast.spawn(
            Entity::new()
                .with_tag("centre-glow")
                .with_position(centre - Vec3::Z)
                .with_light(Light::point(Color::from_hex(ACCENT), 3.0, 5.0)),
        ));

        let fluid = Color::from_hex(FLUID);
        for (index, profile) in self.profiles.iter().enumerate().skip(1) {
            let anchor = anchor_towards(profile.position - centre);
            let curve = connection_curve(centre + anchor, profile.position);
            let tube = Material::standard(fluid)
                .with_roughness(0.3)
                .with_metalness(0.8)
                .with_emissive(fluid, 0.5)
                .transparent();
            let line = cast.spawn(
                Entity::new()
                    .with_tag("connection")
                    .with_opacity(0.6)
                    .with_mesh(Mesh::line(curve.sample(LINE_SEGMENTS), tube)),
            );
            let dots = Material::basic(fluid).with_point_size(0.1).transparent();
            let flow_points = cast.spawn(
                Entity::new()
                    .with_tag("connection-flow")
                    .with_opacity(0.8)
                    .with_mesh(Mesh::points(curve.sample(FLOW_POINTS - 1), dots)),
            );
            self.links.push(Link { line, flow_points, profile: index, anchor });
        }

        cast.request_font(FONT);
        cast.request_font(CAPTION_FONT);
    }

    fn reset(&mut self, f: &mut Frame<'_>) {
        self.spin = 0.0;
        self.focus = None;
        self.flight = 0.0;
        for card in &self.cards {
            f.with(card.id, |e| e.scale = Vec3::ONE);
        }
        f.camera.set_position(CAMERA_HOME);
        f.camera.look_at(Vec3::ZERO);
    }

    /// Card poses, connection geometry and the title drift every tick.
    fn continuous(&mut self, f: &mut Frame<'_>) {
        let t = f.time;

        self.poses.clear();
        for k in 0..self.cards.len() {
            let (id, index) = (self.cards[k].id, self.cards[k].index);
            let mut at = self.placed(index);
            if index > 0 {
                at.y += (t * 1.5 + index as f32).sin() * 0.1;
            }
            self.poses.push(at);
            let zoom = match self.focus {
                Some(i) if i == index && self.flight > 0.5 => 1.0 + (self.flight - 0.5) * 0.5,
                _ => 1.0,
            };
            let pose = if index == 0 {
                Vec3::new(-PI * 0.15, (t * 0.5).sin() * 0.1, 0.0)
            } else {
                facing_centre(at, PI * 0.25)
            };
            f.with(id, |e| {
                e.position = at;
                e.rotation = pose;
                e.scale = Vec3::splat(zoom);
            });
        }

        let Some(&centre) = self.poses.first() else { return };
        for link in &self.links {
            let active = self.focus == Some(link.profile);
            let (freq, low, high) = if active { (5.0, 0.6, 1.0) } else { (2.0, 0.2, 0.4) };
            let flow = flow_offset(f.lap_time, f.stage, f.progress, link.profile);
            let curve = connection_curve(centre + link.anchor, self.poses[link.profile]);
            let wave = (t * freq).sin();

            f.with(link.line, |e| {
                e.opacity = low + (wave * 0.5 + 0.5) * (high - low);
                if let Some(mesh) = e.mesh.as_mut() {
                    mesh.material.emissive_intensity = low + wave * 0.3;
                }
                let n = e.vertices_mut().len().saturating_sub(1).max(1);
                for (j, v) in e.vertices_mut().iter_mut().enumerate() {
                    *v = curve.point_at(j as f32 / n as f32);
                }
            });
            f.with(link.flow_points, |e| {
                let n = e.vertices_mut().len().max(1);
                for (j, v) in e.vertices_mut().iter_mut().enumerate() {
                    *v = curve.point_at((j as f32 / n as f32 + flow).fract());
                }
            });
        }

        f.with(self.title, |e| {
            e.rotation.y = (t * 0.3).sin() * 0.1;
            e.position.y = TITLE_Y + t.sin() * 0.1;
        });
    }

    fn asset_ready(&mut self, cast: &mut Cast<'_>, event: &AssetEvent) {
        match (&event.payload, event.name.as_str()) {
            (AssetPayload::Font(font), FONT) => {
                let material = Material::standard(Color::WHITE)
                    .with_roughness(0.3)
                    .with_metalness(0.7)
                    .with_emissive(Color::from_hex(ACCENT), 0.3);
                let mut title = common::text("PROFILE CONNECTIONS", 0.8, *font, material, Vec3::Y * TITLE_Y);
                title.visible = true;
                self.title = Some(cast.spawn(title));
            }
            (AssetPayload::Font(font), _) => self.fit_captions(cast, *font),
            (AssetPayload::Texture(texture), image) => self.fit_photo(cast, image, *texture),
            (AssetPayload::Failed(reason), name) => {
                log::warn!("profile-web: {name} unavailable ({reason}), placeholder kept");
            }
        }
    }

    fn teardown(&mut self) {
        self.cards.clear();
        self.links.clear();
        self.poses.clear();
        self.glow = None;
        self.title = None;
        self.focus = None;
    }
}
