use crate::api::context::ShowContext;
use crate::api::types::{EntityId, ShowId};
use crate::assets::loader::{AssetKind, Subscription};
use crate::components::entity::Entity;
use crate::core::scene::Scene;
use crate::extensions::rng::Rng;
use crate::renderer::camera::Camera3D;

/// What a stage handler sees for one invocation.
pub struct Frame<'a> {
    pub(crate) scene: &'a mut Scene,
    pub camera: &'a mut Camera3D,
    pub rng: &'a mut Rng,
    /// Seconds since the show started, never wrapped.
    pub time: f32,
    /// Seconds since the current lap began.
    pub lap_time: f32,
    /// Zero during catch-up passes, so only the live call integrates.
    pub dt: f32,
    /// 0 for the reset pass, otherwise the 1-based stage index.
    pub stage: usize,
    pub progress: f32,
    pub lap: u64,
}

impl<'a> Frame<'a> {
    pub fn entity(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.scene.get_mut(id)
    }

    /// Run `f` on the entity if it exists. Missing ids, including `None`
    /// for content that has not loaded yet, are skipped.
    pub fn with<I: Into<Option<EntityId>>>(&mut self, id: I, f: impl FnOnce(&mut Entity)) {
        let Some(id) = id.into() else { return };
        if let Some(e) = self.scene.get_mut(id) {
            f(e);
        }
    }

    /// Run `f` on each listed entity with its index.
    pub fn each(&mut self, ids: &[EntityId], mut f: impl FnMut(usize, &mut Entity)) {
        for (i, id) in ids.iter().enumerate() {
            if let Some(e) = self.scene.get_mut(*id) {
                f(i, e);
            }
        }
    }
}

/// Construction access for `build` and `asset_ready`.
pub struct Cast<'a> {
    pub(crate) ctx: &'a mut ShowContext,
    pub(crate) owner: ShowId,
    pub(crate) epoch: u32,
    pub(crate) owned: &'a mut Vec<EntityId>,
    pub(crate) subscriptions: &'a mut Vec<Subscription>,
    pub rng: &'a mut Rng,
}

impl<'a> Cast<'a> {
    /// Add an entity owned by this show.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.ctx.next_id();
        entity.id = id;
        entity.owner = self.owner;
        self.ctx.scene.spawn(entity);
        self.owned.push(id);
        id
    }

    pub fn request_font(&mut self, name: &str) -> Subscription {
        self.request(AssetKind::Font, name)
    }

    pub fn request_texture(&mut self, name: &str) -> Subscription {
        self.request(AssetKind::Texture, name)
    }

    fn request(&mut self, kind: AssetKind, name: &str) -> Subscription {
        let sub = self.ctx.assets.request(self.owner, self.epoch, kind, name);
        self.subscriptions.push(sub);
        sub
    }

    pub fn entity(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.ctx.scene.get_mut(id)
    }

    pub fn with<I: Into<Option<EntityId>>>(&mut self, id: I, f: impl FnOnce(&mut Entity)) {
        let Some(id) = id.into() else { return };
        if let Some(e) = self.ctx.scene.get_mut(id) {
            f(e);
        }
    }

    pub fn camera(&mut self) -> &mut Camera3D {
        &mut self.ctx.camera
    }

    pub fn owner(&self) -> ShowId {
        self.owner
    }
}
