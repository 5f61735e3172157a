use log::{debug, info, warn};

use crate::api::context::ShowContext;
use crate::api::frame::{Cast, Frame};
use crate::api::show::{Choreography, Show};
use crate::api::types::{EntityId, ShowId};
use crate::assets::loader::{AssetEvent, Subscription};
use crate::core::schedule::{StageFrame, StagePoint, StageSchedule};
use crate::core::time::Clock;
use crate::error::{ReelError, Result};
use crate::extensions::rng::Rng;

const START: StagePoint = StagePoint {
    lap: 0,
    frame: StageFrame::RESET,
};

/// Drives a [`Choreography`] through its stage schedule.
///
/// Owns the clock, the ledger of spawned entities and the outstanding asset
/// subscriptions, so cleanup never depends on the authored show.
pub struct Timeline<C: Choreography> {
    show: C,
    schedule: StageSchedule,
    clock: Clock,
    cursor: StagePoint,
    owner: ShowId,
    owned: Vec<EntityId>,
    subscriptions: Vec<Subscription>,
    rng: Rng,
    /// Bumped on every dispose; assets requested in an older run are stale.
    epoch: u32,
    active: bool,
}

impl<C: Choreography> Timeline<C> {
    pub fn new(show: C) -> Result<Self> {
        let schedule = show.schedule()?;
        let handlers = (1..=schedule.len()).filter(|&s| show.handler(s).is_some()).count();
        if handlers != schedule.len() || C::STAGES.len() > schedule.len() {
            return Err(ReelError::HandlerMismatch {
                stages: schedule.len(),
                handlers: handlers.max(C::STAGES.len()),
            });
        }
        Ok(Self {
            show,
            schedule,
            clock: Clock::new(),
            cursor: START,
            owner: ShowId::NONE,
            owned: Vec::new(),
            subscriptions: Vec::new(),
            rng: Rng::default(),
            epoch: 0,
            active: false,
        })
    }

    /// Boxed, ready for [`Switcher::register`](crate::api::switcher::Switcher::register).
    pub fn boxed(show: C) -> Result<Box<dyn Show>> {
        Ok(Box::new(Self::new(show)?))
    }

    pub fn choreography(&self) -> &C {
        &self.show
    }

    pub fn schedule(&self) -> &StageSchedule {
        &self.schedule
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed() as f32
    }

    /// Stage and lap applied on the last tick.
    pub fn position(&self) -> StagePoint {
        self.cursor
    }

    pub fn owned(&self) -> &[EntityId] {
        &self.owned
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    fn seed_for(&self, base: u64) -> u64 {
        base ^ (self.owner.0 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Position of a point in the flattened sequence `reset, 1..=n` repeated per lap.
fn slot(point: StagePoint, stages: usize) -> u64 {
    point.lap * (stages as u64 + 1) + point.frame.stage as u64
}

impl<C: Choreography> Show for Timeline<C> {
    fn name(&self) -> &str {
        self.show.name()
    }

    fn bind(&mut self, owner: ShowId) {
        self.owner = owner;
    }

    fn owner(&self) -> ShowId {
        self.owner
    }

    fn init(&mut self, ctx: &mut ShowContext) {
        if self.active {
            warn!("show '{}' already active, init ignored", self.show.name());
            return;
        }
        self.active = true;
        self.clock.reset();
        self.cursor = START;
        let seed = self.seed_for(ctx.seed);
        self.rng.reseed(seed);
        let (stages, total) = (self.schedule.len(), self.schedule.total());

        let Self { show, owner, epoch, owned, subscriptions, rng, .. } = self;
        let mut cast = Cast {
            ctx: &mut *ctx,
            owner: *owner,
            epoch: *epoch,
            owned: &mut *owned,
            subscriptions,
            rng: &mut *rng,
        };
        show.build(&mut cast);

        let mut frame = Frame {
            scene: &mut ctx.scene,
            camera: &mut ctx.camera,
            rng,
            time: 0.0,
            lap_time: 0.0,
            dt: 0.0,
            stage: 0,
            progress: 0.0,
            lap: 0,
        };
        show.reset(&mut frame);

        info!(
            "show '{}' started: {} entities, {} stages, {:.1}s loop",
            show.name(),
            owned.len(),
            stages,
            total
        );
    }

    fn update(&mut self, ctx: &mut ShowContext, dt: f32) {
        if !self.active {
            return;
        }
        self.clock.advance(dt);
        let elapsed = self.clock.elapsed();
        let point = self.schedule.locate_at(elapsed);

        let Self { show, schedule, cursor, rng, .. } = self;
        let n = schedule.len();
        let total = f64::from(schedule.total());
        let mut frame = Frame {
            scene: &mut ctx.scene,
            camera: &mut ctx.camera,
            rng,
            time: 0.0,
            lap_time: 0.0,
            dt: 0.0,
            stage: 0,
            progress: 0.0,
            lap: point.lap,
        };

        // Finish every stage left since the last tick, at most one loop's
        // worth, each seen at the instant it ended.
        let to = slot(point, n);
        let from = slot(*cursor, n).max(to.saturating_sub(n as u64 + 1));
        for k in from..to {
            let stage = (k % (n as u64 + 1)) as usize;
            if stage == 0 {
                continue;
            }
            let end = schedule.end_of(stage).unwrap_or(0.0);
            let lap = k / (n as u64 + 1);
            frame.time = (lap as f64 * total + f64::from(end)) as f32;
            frame.lap_time = end;
            frame.lap = lap;
            frame.stage = stage;
            frame.progress = 1.0;
            if let Some(handler) = show.handler(stage) {
                handler(show, &mut frame, 1.0);
            }
        }

        if point.lap > cursor.lap && !point.frame.is_reset() {
            debug!("show '{}' looped (lap {})", show.name(), point.lap);
            frame.time = (point.lap as f64 * total) as f32;
            frame.lap_time = 0.0;
            frame.lap = point.lap;
            frame.stage = 0;
            frame.progress = 0.0;
            show.reset(&mut frame);
        }

        let StageFrame { stage, progress } = point.frame;
        frame.time = elapsed as f32;
        frame.lap_time = schedule.lap_time(point.frame);
        frame.dt = dt;
        frame.lap = point.lap;
        frame.stage = stage;
        frame.progress = progress;
        if stage == 0 {
            show.reset(&mut frame);
        } else if let Some(handler) = show.handler(stage) {
            handler(show, &mut frame, progress);
        }
        show.continuous(&mut frame);

        *cursor = point;
    }

    fn dispose(&mut self, ctx: &mut ShowContext) {
        // Sweep by scene ownership too, so nothing the show spawned can leak.
        let stray: Vec<EntityId> = ctx.scene.owned_by(self.owner).map(|e| e.id).collect();
        let mut removed = 0;
        for id in self.owned.drain(..).chain(stray) {
            if let Some(mut entity) = ctx.scene.despawn(id) {
                entity.release_resources();
                removed += 1;
            }
        }
        let cancelled = ctx.assets.cancel_owner(self.owner);
        self.subscriptions.clear();

        if !self.active {
            return;
        }
        self.active = false;
        self.epoch = self.epoch.wrapping_add(1);
        self.show.teardown();
        ctx.camera.reset();
        info!(
            "show '{}' disposed: {} entities removed, {} asset loads cancelled",
            self.show.name(),
            removed,
            cancelled
        );
    }

    fn on_asset(&mut self, ctx: &mut ShowContext, event: AssetEvent) {
        let sub = event.subscription;
        let live = self.active && sub.owner == self.owner && sub.epoch == self.epoch;
        let Some(idx) = self.subscriptions.iter().position(|s| *s == sub).filter(|_| live) else {
            debug!("show '{}' dropped stale asset '{}'", self.show.name(), event.name);
            return;
        };
        self.subscriptions.swap_remove(idx);

        let Self { show, owner, epoch, owned, subscriptions, rng, .. } = self;
        let mut cast = Cast {
            ctx,
            owner: *owner,
            epoch: *epoch,
            owned,
            subscriptions,
            rng,
        };
        show.asset_ready(&mut cast, &event);
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::show::StageHandler;
    use crate::assets::loader::{AssetKind, AssetPayload, FontHandle};
    use crate::components::entity::Entity;
    use crate::components::mesh::{Geometry, Material, Mesh};
    use crate::components::color::Color;
    use glam::Vec3;

    /// Three stages of 1s, 2s, 2s. Logs every call and moves one cube from
    /// pure functions of progress.
    #[derive(Default)]
    struct Script {
        log: Vec<(usize, f32)>,
        /// (stage, time, dt) of every call, reset included.
        timing: Vec<(usize, f32, f32)>,
        cube: Option<EntityId>,
        title: Option<EntityId>,
        teardowns: u32,
    }

    impl Script {
        fn note(&mut self, f: &Frame<'_>, p: f32) {
            self.log.push((f.stage, p));
            self.timing.push((f.stage, f.time, f.dt));
        }

        fn rise(&mut self, f: &mut Frame<'_>, p: f32) {
            self.note(f, p);
            f.with(self.cube, |e| e.position.y = p);
        }

        fn slide(&mut self, f: &mut Frame<'_>, p: f32) {
            self.note(f, p);
            f.with(self.cube, |e| e.position.x = p * 4.0);
            f.with(self.title, |e| e.opacity = p);
            f.with(EntityId(99_999), |e| e.position = Vec3::splat(-1.0));
        }

        fn spin(&mut self, f: &mut Frame<'_>, p: f32) {
            self.note(f, p);
            f.with(self.cube, |e| e.rotation.y = p * 2.0);
            f.camera.set_position(Vec3::new(0.0, 0.0, 10.0 + p * 5.0));
        }
    }

    impl Choreography for Script {
        const STAGES: &'static [StageHandler<Self>] = &[Self::rise, Self::slide, Self::spin];

        fn name(&self) -> &str {
            "script"
        }

        fn schedule(&self) -> Result<StageSchedule> {
            StageSchedule::from_pairs(&[("rise", 1.0), ("slide", 2.0), ("spin", 2.0)])
        }

        fn build(&mut self, cast: &mut Cast<'_>) {
            self.cube = Some(cast.spawn(
                Entity::new().with_mesh(Mesh::new(Geometry::cube(1.0), Material::standard(Color::WHITE))),
            ));
            cast.request_font("bold");
        }

        fn reset(&mut self, f: &mut Frame<'_>) {
            self.note(f, 0.0);
            f.with(self.cube, |e| {
                e.position = Vec3::ZERO;
                e.rotation = Vec3::ZERO;
            });
        }

        fn asset_ready(&mut self, cast: &mut Cast<'_>, event: &AssetEvent) {
            if let AssetPayload::Font(font) = event.payload {
                let text = Geometry::Text { content: "hi".into(), size: 1.0, depth: 0.1, font };
                self.title = Some(cast.spawn(Entity::new().with_mesh(Mesh::new(text, Material::default()))));
            }
        }

        fn teardown(&mut self) {
            self.cube = None;
            self.title = None;
            self.teardowns += 1;
        }
    }

    fn started() -> (ShowContext, Timeline<Script>) {
        let mut ctx = ShowContext::default();
        let mut tl = Timeline::new(Script::default()).unwrap();
        tl.bind(ShowId(1));
        tl.init(&mut ctx);
        (ctx, tl)
    }

    fn cube(ctx: &ShowContext, tl: &Timeline<Script>) -> Entity {
        ctx.scene.get(tl.choreography().cube.unwrap()).unwrap().clone()
    }

    #[test]
    fn init_builds_and_resets() {
        let (ctx, tl) = started();
        assert!(tl.is_active());
        assert_eq!(ctx.scene.count_owned_by(ShowId(1)), 1);
        assert_eq!(tl.choreography().log, vec![(0, 0.0)]);
        assert_eq!(ctx.assets.pending_for(ShowId(1)), 1);
    }

    #[test]
    fn second_init_is_noop() {
        let (mut ctx, mut tl) = started();
        tl.init(&mut ctx);
        assert_eq!(ctx.scene.count_owned_by(ShowId(1)), 1);
        assert_eq!(tl.choreography().log.len(), 1);
    }

    #[test]
    fn handlers_follow_schedule() {
        let (mut ctx, mut tl) = started();
        tl.update(&mut ctx, 0.5);
        assert_eq!(tl.choreography().log.last(), Some(&(1, 0.5)));
        tl.update(&mut ctx, 1.5);
        let (stage, p) = *tl.choreography().log.last().unwrap();
        assert_eq!(stage, 2);
        assert!((p - 0.5).abs() < 1e-5);
    }

    #[test]
    fn skipped_stages_finish_at_full_progress() {
        let (mut ctx, mut tl) = started();
        tl.update(&mut ctx, 0.5);
        // one tick jumps from stage 1 over stage 2 into stage 3
        tl.update(&mut ctx, 3.5);
        let log = &tl.choreography().log;
        assert_eq!(&log[2..4], &[(1, 1.0), (2, 1.0)]);
        assert_eq!(log[4].0, 3);
        let c = cube(&ctx, &tl);
        assert_eq!(c.position, Vec3::new(4.0, 1.0, 0.0));
    }

    #[test]
    fn catch_up_passes_see_stage_end_and_no_delta() {
        let (mut ctx, mut tl) = started();
        tl.update(&mut ctx, 0.5);
        tl.update(&mut ctx, 3.5);
        let timing = &tl.choreography().timing[2..];
        assert_eq!(timing[0], (1, 1.0, 0.0));
        assert_eq!(timing[1], (2, 3.0, 0.0));
        assert_eq!(timing[2], (3, 4.0, 3.5));

        let mark = tl.choreography().timing.len();
        tl.update(&mut ctx, 1.5);
        let timing = &tl.choreography().timing[mark..];
        assert_eq!(timing[0], (3, 5.0, 0.0));
        assert_eq!(timing[1], (0, 5.0, 0.0));
        assert_eq!(timing[2], (1, 5.5, 1.5));
    }

    #[test]
    fn loop_crossing_resets_before_next_stage() {
        let (mut ctx, mut tl) = started();
        tl.update(&mut ctx, 4.5);
        let mark = tl.choreography().log.len();
        tl.update(&mut ctx, 0.75);
        let log = &tl.choreography().log[mark..];
        assert_eq!(log[0], (3, 1.0));
        assert_eq!(log[1], (0, 0.0));
        assert_eq!(log[2].0, 1);
        assert!((log[2].1 - 0.25).abs() < 1e-4);
        assert_eq!(tl.position().lap, 1);
    }

    #[test]
    fn exact_loop_boundary_is_one_reset_tick() {
        let (mut ctx, mut tl) = started();
        tl.update(&mut ctx, 4.0);
        let mark = tl.choreography().log.len();
        tl.update(&mut ctx, 1.0);
        let log = &tl.choreography().log[mark..];
        assert_eq!(log, &[(3, 1.0), (0, 0.0)]);
        assert!(tl.position().frame.is_reset());
        tl.update(&mut ctx, 0.5);
        assert_eq!(tl.choreography().log.last(), Some(&(1, 0.5)));
        assert_eq!(cube(&ctx, &tl).position, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn state_depends_on_elapsed_not_step_size() {
        let (mut ca, mut a) = started();
        let (mut cb, mut b) = started();
        for _ in 0..62 {
            a.update(&mut ca, 0.05);
        }
        for dt in [0.7, 0.01, 1.3, 0.49, 0.6] {
            b.update(&mut cb, dt);
        }
        let (pa, pb) = (cube(&ca, &a), cube(&cb, &b));
        assert!((pa.position - pb.position).length() < 1e-3);
        assert!((pa.rotation - pb.rotation).length() < 1e-3);
    }

    #[test]
    fn huge_step_is_bounded() {
        let (mut ctx, mut tl) = started();
        tl.update(&mut ctx, 1000.2);
        // at most one loop of finishing passes, one reset, one stage call
        assert!(tl.choreography().log.len() <= 1 + 3 + 1 + 1);
        assert_eq!(tl.position().lap, 200);
    }

    #[test]
    fn dispose_twice_leaves_nothing() {
        let (mut ctx, mut tl) = started();
        tl.update(&mut ctx, 4.5);
        assert!(!ctx.camera.is_home());
        tl.dispose(&mut ctx);
        tl.dispose(&mut ctx);
        assert_eq!(ctx.scene.count_owned_by(ShowId(1)), 0);
        assert!(ctx.camera.is_home());
        assert_eq!(ctx.assets.pending_count(), 0);
        assert_eq!(tl.choreography().teardowns, 1);
        assert!(!tl.is_active());
    }

    #[test]
    fn updates_after_dispose_do_nothing() {
        let (mut ctx, mut tl) = started();
        tl.dispose(&mut ctx);
        let mark = tl.choreography().log.len();
        tl.update(&mut ctx, 1.0);
        assert_eq!(tl.choreography().log.len(), mark);
    }

    #[test]
    fn async_asset_is_owned_and_disposed() {
        let (mut ctx, mut tl) = started();
        let ticket = ctx.assets.take_requests()[0].ticket;
        assert!(ctx.assets.complete(ticket));
        for event in ctx.assets.drain_ready() {
            tl.on_asset(&mut ctx, event);
        }
        assert_eq!(ctx.scene.count_owned_by(ShowId(1)), 2);
        tl.update(&mut ctx, 2.0);
        let title = tl.choreography().title.unwrap();
        assert!((ctx.scene.get(title).unwrap().opacity - 0.5).abs() < 1e-5);
        tl.dispose(&mut ctx);
        assert_eq!(ctx.scene.count_owned_by(ShowId(1)), 0);
    }

    #[test]
    fn late_asset_after_dispose_is_dropped() {
        let (mut ctx, mut tl) = started();
        let ticket = ctx.assets.take_requests()[0].ticket;
        let stale = AssetEvent {
            subscription: Subscription { owner: ShowId(1), ticket, epoch: 0 },
            kind: AssetKind::Font,
            name: "bold".into(),
            payload: AssetPayload::Font(FontHandle(ticket)),
        };
        tl.dispose(&mut ctx);
        assert!(!ctx.assets.complete(ticket));

        // a restarted run must ignore deliveries meant for the previous one
        tl.init(&mut ctx);
        tl.on_asset(&mut ctx, stale);
        assert!(tl.choreography().title.is_none());
        assert_eq!(ctx.scene.count_owned_by(ShowId(1)), 1);
    }

    #[test]
    fn handler_count_must_match() {
        struct Short;
        impl Choreography for Short {
            const STAGES: &'static [StageHandler<Self>] = &[];
            fn name(&self) -> &str {
                "short"
            }
            fn schedule(&self) -> Result<StageSchedule> {
                StageSchedule::from_pairs(&[("a", 1.0)])
            }
            fn build(&mut self, _cast: &mut Cast<'_>) {}
            fn reset(&mut self, _frame: &mut Frame<'_>) {}
        }
        assert!(matches!(
            Timeline::new(Short),
            Err(ReelError::HandlerMismatch { stages: 1, handlers: 0 })
        ));
    }

    #[test]
    fn handler_override_sizes_schedule_from_data() {
        struct Steps {
            count: usize,
            seen: Vec<usize>,
        }
        impl Steps {
            fn step(&mut self, f: &mut Frame<'_>, _p: f32) {
                self.seen.push(f.stage);
            }
        }
        impl Choreography for Steps {
            fn handler(&self, stage: usize) -> Option<StageHandler<Self>> {
                (1..=self.count).contains(&stage).then_some(Self::step as StageHandler<Self>)
            }
            fn name(&self) -> &str {
                "steps"
            }
            fn schedule(&self) -> Result<StageSchedule> {
                let names: Vec<String> = (1..=self.count).map(|i| format!("step-{i}")).collect();
                StageSchedule::from_pairs(&names.iter().map(|n| (n.as_str(), 1.0)).collect::<Vec<_>>())
            }
            fn build(&mut self, _cast: &mut Cast<'_>) {}
            fn reset(&mut self, _frame: &mut Frame<'_>) {}
        }

        let mut ctx = ShowContext::default();
        let mut tl = Timeline::new(Steps { count: 4, seen: Vec::new() }).unwrap();
        tl.bind(ShowId(1));
        tl.init(&mut ctx);
        tl.update(&mut ctx, 3.5);
        assert_eq!(tl.choreography().seen, vec![1, 2, 3, 4]);
        assert_eq!(tl.schedule().len(), 4);
        // relies on the default, empty handler table
        assert!(Steps::STAGES.is_empty());
        assert!(Timeline::boxed(Steps { count: 2, seen: Vec::new() }).is_ok());
    }
}
