/// Unique identifier for an entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Identifies the show owning an entity or an asset subscription.
/// `ShowId::NONE` marks content that no show has claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShowId(pub u32);

impl ShowId {
    pub const NONE: ShowId = ShowId(0);
}
