use log::{debug, info};

use crate::api::context::ShowContext;
use crate::api::show::Show;
use crate::api::types::ShowId;
use crate::error::{ReelError, Result};

/// Registry of shows with at most one active at a time.
///
/// Switching always disposes the outgoing show before the incoming one is
/// initialised, so two shows never populate the scene together.
#[derive(Default)]
pub struct Switcher {
    shows: Vec<(String, Box<dyn Show>)>,
    active: Option<usize>,
}

impl Switcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, mut show: Box<dyn Show>) -> Result<()> {
        let id = id.into();
        if self.index_of(&id).is_some() {
            return Err(ReelError::DuplicateShow(id));
        }
        show.bind(ShowId(self.shows.len() as u32 + 1));
        debug!("registered show '{}' as {:?}", id, show.owner());
        self.shows.push((id, show));
        Ok(())
    }

    /// Dispose the current show, then start `id` from zero.
    /// An unknown id leaves the current show running.
    pub fn activate(&mut self, ctx: &mut ShowContext, id: &str) -> Result<()> {
        let next = self
            .index_of(id)
            .ok_or_else(|| ReelError::UnknownShow(id.to_string()))?;
        if let Some(current) = self.active.take() {
            self.shows[current].1.dispose(ctx);
        }
        self.shows[next].1.init(ctx);
        self.active = Some(next);
        info!("active show: {}", id);
        Ok(())
    }

    pub fn deactivate(&mut self, ctx: &mut ShowContext) {
        if let Some(current) = self.active.take() {
            self.shows[current].1.dispose(ctx);
        }
    }

    /// Deliver ready assets to the active show, then advance it.
    pub fn update(&mut self, ctx: &mut ShowContext, dt: f32) {
        let Some(current) = self.active else {
            return;
        };
        let show = &mut self.shows[current].1;
        for event in ctx.assets.drain_ready() {
            if event.subscription.owner == show.owner() {
                show.on_asset(ctx, event);
            } else {
                debug!("asset '{}' has no live owner, dropped", event.name);
            }
        }
        show.update(ctx, dt);
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|i| self.shows[i].0.as_str())
    }

    pub fn active(&self) -> Option<&dyn Show> {
        self.active.map(|i| self.shows[i].1.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.shows.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.shows.iter().position(|(name, _)| name == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::loader::{AssetEvent, AssetKind};
    use crate::components::entity::Entity;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Spawns two entities on init and records every lifecycle call.
    struct Recorder {
        name: &'static str,
        log: Log,
        owner: ShowId,
        active: bool,
    }

    impl Recorder {
        fn boxed(name: &'static str, log: &Log) -> Box<dyn Show> {
            Box::new(Self {
                name,
                log: Rc::clone(log),
                owner: ShowId::NONE,
                active: false,
            })
        }

        fn note(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}.{}", self.name, what));
        }
    }

    impl Show for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn bind(&mut self, owner: ShowId) {
            self.owner = owner;
        }

        fn owner(&self) -> ShowId {
            self.owner
        }

        fn init(&mut self, ctx: &mut ShowContext) {
            self.note("init");
            self.active = true;
            for _ in 0..2 {
                let mut e = Entity::new();
                e.id = ctx.next_id();
                e.owner = self.owner;
                ctx.scene.spawn(e);
            }
            ctx.assets.request(self.owner, 0, AssetKind::Font, "bold");
        }

        fn update(&mut self, _ctx: &mut ShowContext, _dt: f32) {
            self.note("update");
        }

        fn dispose(&mut self, ctx: &mut ShowContext) {
            self.note("dispose");
            self.active = false;
            let ids: Vec<_> = ctx.scene.owned_by(self.owner).map(|e| e.id).collect();
            for id in ids {
                ctx.scene.despawn(id);
            }
            ctx.assets.cancel_owner(self.owner);
        }

        fn on_asset(&mut self, _ctx: &mut ShowContext, event: AssetEvent) {
            self.note(&format!("asset:{}", event.name));
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn setup() -> (ShowContext, Switcher, Log) {
        let log: Log = Rc::default();
        let mut sw = Switcher::new();
        sw.register("a", Recorder::boxed("a", &log)).unwrap();
        sw.register("b", Recorder::boxed("b", &log)).unwrap();
        (ShowContext::default(), sw, log)
    }

    #[test]
    fn dispose_runs_before_init() {
        let (mut ctx, mut sw, log) = setup();
        sw.activate(&mut ctx, "a").unwrap();
        sw.activate(&mut ctx, "b").unwrap();
        assert_eq!(*log.borrow(), vec!["a.init", "a.dispose", "b.init"]);
        assert_eq!(sw.active_id(), Some("b"));
        assert_eq!(ctx.scene.count_owned_by(ShowId(1)), 0);
        assert_eq!(ctx.scene.count_owned_by(ShowId(2)), 2);
    }

    #[test]
    fn reactivating_restarts() {
        let (mut ctx, mut sw, log) = setup();
        sw.activate(&mut ctx, "a").unwrap();
        sw.activate(&mut ctx, "a").unwrap();
        assert_eq!(*log.borrow(), vec!["a.init", "a.dispose", "a.init"]);
        assert_eq!(ctx.scene.len(), 2);
    }

    #[test]
    fn unknown_id_keeps_current() {
        let (mut ctx, mut sw, log) = setup();
        sw.activate(&mut ctx, "a").unwrap();
        let err = sw.activate(&mut ctx, "nope").unwrap_err();
        assert!(matches!(err, ReelError::UnknownShow(ref id) if id == "nope"));
        assert_eq!(sw.active_id(), Some("a"));
        assert_eq!(*log.borrow(), vec!["a.init"]);
    }

    #[test]
    fn duplicate_id_rejected() {
        let (_, mut sw, log) = setup();
        let err = sw.register("a", Recorder::boxed("a2", &log)).unwrap_err();
        assert!(matches!(err, ReelError::DuplicateShow(_)));
        assert_eq!(sw.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn update_without_active_is_noop() {
        let (mut ctx, mut sw, log) = setup();
        sw.update(&mut ctx, 0.016);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn assets_reach_only_active_owner() {
        let (mut ctx, mut sw, log) = setup();
        sw.activate(&mut ctx, "a").unwrap();
        let stale = ctx.assets.take_requests()[0].ticket;
        sw.activate(&mut ctx, "b").unwrap();
        let fresh = ctx.assets.take_requests()[0].ticket;
        assert!(!ctx.assets.complete(stale));
        assert!(ctx.assets.complete(fresh));
        sw.update(&mut ctx, 0.016);
        let log = log.borrow();
        assert_eq!(&log[3..], &["b.asset:bold", "b.update"]);
    }

    #[test]
    fn deactivate_disposes() {
        let (mut ctx, mut sw, log) = setup();
        sw.activate(&mut ctx, "b").unwrap();
        sw.deactivate(&mut ctx);
        sw.deactivate(&mut ctx);
        assert_eq!(sw.active_id(), None);
        assert!(ctx.scene.is_empty());
        assert_eq!(*log.borrow(), vec!["b.init", "b.dispose"]);
    }
}
