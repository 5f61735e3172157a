//! Building blocks shared by several shows.

use glam::Vec3;
use reel_engine::*;

/// Typeface used by every text element.
pub const FONT: &str = "helvetiker_bold";

/// Several shows tune motion as per-frame increments at this rate.
pub const FRAME_RATE: f32 = 60.0;

/// Share of the remaining distance to close over `dt` when `rate` of it is
/// closed every 60 Hz frame.
pub fn smoothing(rate: f32, dt: f32) -> f32 {
    1.0 - (1.0 - rate).powf(dt * FRAME_RATE)
}

/// Frames of 60 Hz animation elapsed `p` of the way through a stage of `secs`.
pub fn frames(p: f32, secs: f32) -> f32 {
    p * secs * FRAME_RATE
}

/// Where a value lands after `secs` of chasing, at `smoothing(rate, dt)` per
/// step, a target that starts at `from` and moves at `slope` per second.
/// Closed form, so the answer does not depend on how `secs` was stepped.
pub fn chase(start: f32, from: f32, slope: f32, rate: f32, secs: f32) -> f32 {
    let lag = slope / (-FRAME_RATE * (1.0 - rate).ln());
    let left = 1.0 - smoothing(rate, secs);
    from + slope * secs - lag + (start - from + lag) * left
}

/// `count` random points in a box of half-size `half`, shifted by `offset`.
pub fn scatter(rng: &mut Rng, count: usize, half: Vec3, offset: Vec3) -> Vec<Vec3> {
    (0..count).map(|_| rng.vec3_signed(half) + offset).collect()
}

/// White point cloud for backgrounds.
pub fn star_field(cast: &mut Cast<'_>, count: usize, half: Vec3, offset: Vec3, size: f32) -> EntityId {
    let points = scatter(cast.rng, count, half, offset);
    cast.spawn(
        Entity::new()
            .with_tag("stars")
            .with_mesh(Mesh::points(points, Material::basic(Color::WHITE).with_point_size(size))),
    )
}

/// Dim ambient fill plus one key light above and in front.
pub fn key_and_fill(cast: &mut Cast<'_>, ambient: f32, key: f32) {
    cast.spawn(Entity::new().with_tag("ambient").with_light(Light::ambient(Color::from_hex(0x404040), ambient)));
    cast.spawn(
        Entity::new()
            .with_tag("key-light")
            .with_position(Vec3::new(5.0, 10.0, 7.5))
            .with_light(Light::directional(Color::WHITE, key)),
    );
}

/// Text entity that starts hidden; stages reveal it.
pub fn text(content: &str, size: f32, font: FontHandle, material: Material, at: Vec3) -> Entity {
    let geometry = Geometry::Text {
        content: content.to_string(),
        size,
        depth: 0.1,
        font,
    };
    Entity::new()
        .with_tag(content)
        .with_position(at)
        .with_mesh(Mesh::new(geometry, material))
        .hidden()
}

/// Emissive material where the glow matches the base color.
pub fn glowing(hex: u32, intensity: f32) -> Material {
    let c = Color::from_hex(hex);
    Material::standard(c).with_emissive(c, intensity)
}

/// Translucent shell rendered from the inside.
pub fn halo(hex: u32) -> Material {
    Material::basic(Color::from_hex(hex)).transparent().back_side()
}

pub fn font_of(event: &AssetEvent) -> Option<FontHandle> {
    match event.payload {
        AssetPayload::Font(font) => Some(font),
        _ => None,
    }
}

pub fn texture_of(event: &AssetEvent) -> Option<TextureHandle> {
    match event.payload {
        AssetPayload::Texture(texture) => Some(texture),
        _ => None,
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    pub const OWNER: ShowId = ShowId(7);

    /// Bound and initialised timeline on a fresh context.
    pub fn start<C: Choreography>(show: C) -> (ShowContext, Timeline<C>) {
        let mut ctx = ShowContext::default();
        let mut tl = Timeline::new(show).unwrap();
        tl.bind(OWNER);
        tl.init(&mut ctx);
        (ctx, tl)
    }

    /// Resolve every outstanding load and hand the results to the show.
    pub fn deliver_assets<C: Choreography>(ctx: &mut ShowContext, tl: &mut Timeline<C>) {
        for req in ctx.assets.take_requests() {
            ctx.assets.complete(req.ticket);
        }
        for event in ctx.assets.drain_ready() {
            tl.on_asset(ctx, event);
        }
    }

    /// Advance to absolute show time `t` in steps of `dt`.
    pub fn run_to<C: Choreography>(ctx: &mut ShowContext, tl: &mut Timeline<C>, t: f32, dt: f32) {
        while tl.elapsed() + dt <= t + 1e-4 {
            tl.update(ctx, dt);
        }
        let rest = t - tl.elapsed();
        if rest > 0.0 {
            tl.update(ctx, rest);
        }
    }

    /// Advance to `t` cycling through `steps`, which need not be even.
    pub fn run_split<C: Choreography>(ctx: &mut ShowContext, tl: &mut Timeline<C>, t: f32, steps: &[f32]) {
        for &dt in steps.iter().cycle() {
            if tl.elapsed() + dt > t {
                break;
            }
            tl.update(ctx, dt);
        }
        let rest = t - tl.elapsed();
        if rest > 0.0 {
            tl.update(ctx, rest);
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3 * (1.0 + a.abs().max(b.abs()))
    }

    fn close3(a: Vec3, b: Vec3) -> bool {
        close(a.x, b.x) && close(a.y, b.y) && close(a.z, b.z)
    }

    /// Play two copies of a show to each time in `at`, one at 60 Hz and one
    /// in ragged steps that straddle stage boundaries, and require the same
    /// scene and camera. Entities tagged in `integrated` carry simulated
    /// motion and are skipped.
    pub fn same_pose_for_any_split<C: Choreography>(make: impl Fn() -> C, at: &[f32], integrated: &[&str]) {
        let (mut even_ctx, mut even) = start(make());
        let (mut ragged_ctx, mut ragged) = start(make());
        deliver_assets(&mut even_ctx, &mut even);
        deliver_assets(&mut ragged_ctx, &mut ragged);

        for &t in at {
            run_to(&mut even_ctx, &mut even, t, 1.0 / 60.0);
            run_split(&mut ragged_ctx, &mut ragged, t, &[0.5, 0.013, 0.21, 0.07, 0.33, 0.041]);
            assert_eq!(even.position().frame.stage, ragged.position().frame.stage, "stage at {t}");

            assert_eq!(even_ctx.scene.len(), ragged_ctx.scene.len());
            for (a, b) in even_ctx.scene.iter().zip(ragged_ctx.scene.iter()) {
                assert_eq!(a.id, b.id);
                if integrated.contains(&a.tag.as_str()) {
                    continue;
                }
                let what = format!("{} #{} at {t}", a.tag, a.id.0);
                assert_eq!(a.visible, b.visible, "{what} visible");
                assert!(close3(a.position, b.position), "{what} position {} vs {}", a.position, b.position);
                assert!(close3(a.rotation, b.rotation), "{what} rotation {} vs {}", a.rotation, b.rotation);
                assert!(close3(a.scale, b.scale), "{what} scale {} vs {}", a.scale, b.scale);
                assert!(close(a.opacity, b.opacity), "{what} opacity {} vs {}", a.opacity, b.opacity);
            }
            let (ca, cb) = (&even_ctx.camera, &ragged_ctx.camera);
            assert!(close3(ca.position, cb.position), "camera at {t}: {} vs {}", ca.position, cb.position);
            assert!(close3(ca.target, cb.target), "camera target at {t}: {} vs {}", ca.target, cb.target);
        }
    }

    pub fn entity(ctx: &ShowContext, id: Option<EntityId>) -> &Entity {
        ctx.scene.get(id.unwrap()).unwrap()
    }

    /// init, three loops of uneven steps with assets arriving mid-run,
    /// then dispose twice. Nothing owned may survive.
    pub fn smoke<C: Choreography>(show: C) {
        let (mut ctx, mut tl) = start(show);
        assert!(ctx.scene.count_owned_by(OWNER) > 0);

        let end = tl.schedule().total() * 3.0;
        let steps = [0.016, 0.033, 0.1, 0.25, 0.007];
        let mut i = 0;
        while tl.elapsed() < end {
            if i == 20 {
                deliver_assets(&mut ctx, &mut tl);
            }
            tl.update(&mut ctx, steps[i % steps.len()]);
            i += 1;
            for e in ctx.scene.iter() {
                assert!(e.position.is_finite(), "{} position", e.tag);
                assert!(e.scale.is_finite(), "{} scale", e.tag);
                assert!(e.opacity.is_finite(), "{} opacity", e.tag);
            }
        }
        assert!(tl.position().lap >= 2);

        tl.dispose(&mut ctx);
        tl.dispose(&mut ctx);
        assert_eq!(ctx.scene.count_owned_by(OWNER), 0);
        assert!(ctx.scene.is_empty());
        assert!(ctx.camera.is_home());
        assert_eq!(ctx.assets.pending_count(), 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chase_matches_stepped_smoothing() {
        // fixed target: exact for any step
        let mut x = 2.0;
        for _ in 0..90 {
            x += (10.0 - x) * smoothing(0.05, 1.0 / 60.0);
        }
        assert!((chase(2.0, 10.0, 0.0, 0.05, 1.5) - x).abs() < 1e-3);

        // moving target: fine steps converge on the closed form
        let (mut x, mut t, dt) = (0.0f32, 0.0f32, 1.0 / 600.0);
        while t < 4.0 - 1e-6 {
            t += dt;
            x += (-0.15 * t - x) * smoothing(0.05, dt);
        }
        assert!((chase(0.0, 0.0, -0.15, 0.05, 4.0) - x).abs() < 2e-3, "{x}");
    }
}
