use crate::api::config::ReelConfig;
use crate::api::types::EntityId;
use crate::assets::loader::AssetLoader;
use crate::assets::manifest::AssetManifest;
use crate::core::scene::Scene;
use crate::renderer::camera::Camera3D;

/// Shared state every show works against, owned by the host.
///
/// The camera lives here rather than in a global so each show receives it
/// explicitly and a disposed show can hand it back at its home pose.
pub struct ShowContext {
    pub scene: Scene,
    pub camera: Camera3D,
    pub assets: AssetLoader,
    /// Base RNG seed; each show mixes in its own id.
    pub seed: u64,
    next_id: u32,
}

impl ShowContext {
    pub fn new(config: &ReelConfig, manifest: AssetManifest) -> Self {
        Self {
            scene: Scene::with_capacity(config.max_instances.min(4096)),
            camera: Camera3D::new(&config.camera),
            assets: AssetLoader::new(manifest),
            seed: config.seed,
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID. IDs are never reused.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for ShowContext {
    fn default() -> Self {
        Self::new(&ReelConfig::default(), AssetManifest::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ctx = ShowContext::default();
        let a = ctx.next_id();
        let b = ctx.next_id();
        assert_ne!(a, b);
        assert_eq!(a, EntityId(1));
    }
}
