use glam::Vec3;

use crate::api::types::{EntityId, ShowId};
use super::light::Light;
use super::mesh::Mesh;

/// Per-entity animation scratch values captured at build time.
///
/// Shows interpret the fields freely; the engine never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionParams {
    pub velocity: Vec3,
    pub spin: Vec3,
    pub origin: Vec3,
    pub target: Vec3,
    pub phase: f32,
    pub speed: f32,
}

/// Fat entity: a 3D transform plus optional mesh and light.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// Show that created this entity; `ShowId::NONE` for host-owned ones.
    pub owner: ShowId,
    pub tag: String,
    pub visible: bool,
    pub position: Vec3,
    /// Euler angles, XYZ order, radians.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub opacity: f32,
    pub mesh: Option<Mesh>,
    pub light: Option<Light>,
    pub params: MotionParams,
}

impl Entity {
    /// A visible entity at the origin with no components.
    pub fn new() -> Self {
        Self {
            id: EntityId(0),
            owner: ShowId::NONE,
            tag: String::new(),
            visible: true,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            opacity: 1.0,
            mesh: None,
            light: None,
            params: MotionParams::default(),
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_params(mut self, params: MotionParams) -> Self {
        self.params = params;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Whether mesh or light data is still attached.
    pub fn has_resources(&self) -> bool {
        self.mesh.is_some() || self.light.is_some()
    }

    /// Drop GPU-backed data. Safe to call repeatedly.
    pub fn release_resources(&mut self) {
        self.mesh = None;
        self.light = None;
        self.visible = false;
    }

    /// Mutable vertex buffer of the mesh, empty if there is none.
    pub fn vertices_mut(&mut self) -> &mut [Vec3] {
        match self.mesh.as_mut() {
            Some(mesh) => &mut mesh.vertices,
            None => &mut [],
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}
