use bytemuck::{Pod, Zeroable};

/// Per-mesh render data written to shared memory for the JS renderer.
/// 18 floats = 72 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct RenderInstance {
    pub position: [f32; 3],
    /// Euler XYZ radians.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub opacity: f32,
    pub color: [f32; 3],
    pub emissive: f32,
    /// `Geometry::kind_tag` of the shape.
    pub kind: f32,
    /// Owning entity id, so the host can look up geometry details.
    pub entity: f32,
    /// First float of this mesh's data in `RenderBuffer::vertices`.
    pub vertex_offset: f32,
    /// Number of vertices (three floats each), 0 for parametric shapes.
    pub vertex_count: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 18;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Per-light data. 12 floats = 48 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct LightInstance {
    pub position: [f32; 3],
    pub kind: f32,
    pub color: [f32; 3],
    pub intensity: f32,
    pub ground: [f32; 3],
    pub range: f32,
}

impl LightInstance {
    pub const FLOATS: usize = 12;
}

/// Everything the renderer draws this frame.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
    pub lights: Vec<LightInstance>,
    /// Flattened vertex data of point clouds, lines and deformed planes.
    pub vertices: Vec<f32>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            lights: Vec::with_capacity(16),
            vertices: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.lights.clear();
        self.vertices.clear();
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn light_count(&self) -> u32 {
        self.lights.len() as u32
    }

    /// Raw pointer to instance data for shared-memory reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    pub fn lights_ptr(&self) -> *const f32 {
        self.lights.as_ptr() as *const f32
    }

    pub fn vertices_ptr(&self) -> *const f32 {
        self.vertices.as_ptr()
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_protocol() {
        assert_eq!(std::mem::size_of::<RenderInstance>(), RenderInstance::STRIDE_BYTES);
        assert_eq!(std::mem::size_of::<LightInstance>(), LightInstance::FLOATS * 4);
    }
}
