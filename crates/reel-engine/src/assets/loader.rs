use log::{debug, warn};
use serde::Serialize;

use crate::api::types::ShowId;
use super::manifest::AssetManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Font,
    Texture,
}

/// Host-side font, identified by the ticket that loaded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Cancellable claim on a pending load.
///
/// `epoch` is the owning show's dispose counter at request time; the show
/// discards events whose epoch is stale even if the loader delivered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub owner: ShowId,
    pub ticket: u32,
    pub epoch: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssetPayload {
    Font(FontHandle),
    Texture(TextureHandle),
    Failed(String),
}

/// A resolved load, routed back to the show that asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetEvent {
    pub subscription: Subscription,
    pub kind: AssetKind,
    pub name: String,
    pub payload: AssetPayload,
}

/// What the host has to fetch. Serialized to JSON for the JS side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRequest {
    pub ticket: u32,
    pub kind: AssetKind,
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone)]
struct Pending {
    subscription: Subscription,
    kind: AssetKind,
    name: String,
}

/// Tracks outstanding asynchronous loads.
///
/// The host drains `take_requests`, fetches, then calls `complete` or `fail`
/// with the ticket. Requests that never resolve simply stay pending.
#[derive(Debug, Default)]
pub struct AssetLoader {
    manifest: AssetManifest,
    pending: Vec<Pending>,
    ready: Vec<AssetEvent>,
    outbox: Vec<AssetRequest>,
    next_ticket: u32,
}

impl AssetLoader {
    pub fn new(manifest: AssetManifest) -> Self {
        Self {
            manifest,
            pending: Vec::new(),
            ready: Vec::new(),
            outbox: Vec::new(),
            next_ticket: 1,
        }
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn request(&mut self, owner: ShowId, epoch: u32, kind: AssetKind, name: &str) -> Subscription {
        let ticket = self.next_ticket.max(1);
        self.next_ticket = ticket.wrapping_add(1);
        let subscription = Subscription { owner, ticket, epoch };
        let path = self.manifest.path(kind, name).to_string();
        debug!("asset request #{} {:?} '{}' -> {}", ticket, kind, name, path);
        self.pending.push(Pending {
            subscription,
            kind,
            name: name.to_string(),
        });
        self.outbox.push(AssetRequest {
            ticket,
            kind,
            name: name.to_string(),
            path,
        });
        subscription
    }

    /// Mark a ticket loaded. Returns false if it was cancelled or unknown.
    pub fn complete(&mut self, ticket: u32) -> bool {
        let Some(p) = self.take_pending(ticket) else {
            debug!("dropping completion for inactive ticket #{}", ticket);
            return false;
        };
        let payload = match p.kind {
            AssetKind::Font => AssetPayload::Font(FontHandle(ticket)),
            AssetKind::Texture => AssetPayload::Texture(TextureHandle(ticket)),
        };
        self.ready.push(AssetEvent {
            subscription: p.subscription,
            kind: p.kind,
            name: p.name,
            payload,
        });
        true
    }

    /// Mark a ticket failed. The owner still receives an event.
    pub fn fail(&mut self, ticket: u32, reason: &str) -> bool {
        let Some(p) = self.take_pending(ticket) else {
            return false;
        };
        warn!("asset '{}' failed to load: {}", p.name, reason);
        self.ready.push(AssetEvent {
            subscription: p.subscription,
            kind: p.kind,
            name: p.name,
            payload: AssetPayload::Failed(reason.to_string()),
        });
        true
    }

    /// Forget every pending load and undelivered event belonging to `owner`.
    pub fn cancel_owner(&mut self, owner: ShowId) -> usize {
        let before = self.pending.len() + self.ready.len();
        self.pending.retain(|p| p.subscription.owner != owner);
        self.ready.retain(|e| e.subscription.owner != owner);
        // unsent requests of the owner are no longer worth fetching
        let pending = &self.pending;
        self.outbox
            .retain(|r| pending.iter().any(|p| p.subscription.ticket == r.ticket));
        before - self.pending.len() - self.ready.len()
    }

    pub fn drain_ready(&mut self) -> Vec<AssetEvent> {
        std::mem::take(&mut self.ready)
    }

    /// Requests the host has not picked up yet.
    pub fn take_requests(&mut self) -> Vec<AssetRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_for(&self, owner: ShowId) -> usize {
        self.pending.iter().filter(|p| p.subscription.owner == owner).count()
    }

    fn take_pending(&mut self, ticket: u32) -> Option<Pending> {
        let idx = self.pending.iter().position(|p| p.subscription.ticket == ticket)?;
        Some(self.pending.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_is_delivered() {
        let mut loader = AssetLoader::new(AssetManifest::default());
        let sub = loader.request(ShowId(1), 0, AssetKind::Font, "bold");
        assert_eq!(loader.pending_count(), 1);
        assert!(loader.complete(sub.ticket));
        let events = loader.drain_ready();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subscription, sub);
        assert_eq!(events[0].payload, AssetPayload::Font(FontHandle(sub.ticket)));
        assert_eq!(loader.pending_count(), 0);
    }

    #[test]
    fn cancelled_completion_is_dropped() {
        let mut loader = AssetLoader::new(AssetManifest::default());
        let a = loader.request(ShowId(1), 0, AssetKind::Font, "bold");
        let b = loader.request(ShowId(2), 0, AssetKind::Texture, "avatar");
        loader.cancel_owner(ShowId(1));
        assert_eq!(loader.take_requests().len(), 1);
        assert!(!loader.complete(a.ticket));
        assert!(loader.complete(b.ticket));
        let events = loader.drain_ready();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subscription.owner, ShowId(2));
    }

    #[test]
    fn cancel_removes_undelivered_events() {
        let mut loader = AssetLoader::new(AssetManifest::default());
        let a = loader.request(ShowId(1), 0, AssetKind::Font, "bold");
        loader.complete(a.ticket);
        loader.cancel_owner(ShowId(1));
        assert!(loader.drain_ready().is_empty());
    }

    #[test]
    fn failure_is_reported() {
        let mut loader = AssetLoader::new(AssetManifest::default());
        let a = loader.request(ShowId(1), 3, AssetKind::Texture, "missing.png");
        assert!(loader.fail(a.ticket, "404"));
        let events = loader.drain_ready();
        assert!(matches!(events[0].payload, AssetPayload::Failed(_)));
        assert_eq!(events[0].subscription.epoch, 3);
    }

    #[test]
    fn requests_reach_outbox_with_paths() {
        let manifest = AssetManifest::from_json(r#"{"fonts":{"bold":"fonts/b.json"}}"#).unwrap();
        let mut loader = AssetLoader::new(manifest);
        loader.request(ShowId(1), 0, AssetKind::Font, "bold");
        let out = loader.take_requests();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, "fonts/b.json");
        assert!(loader.take_requests().is_empty());
    }
}
