use glam::Vec3;

use crate::assets::loader::{FontHandle, TextureHandle};
use super::color::Color;

/// Shape descriptor handed to the rendering backend.
///
/// Only `Plane`, `Points` and `Line` carry CPU-side vertex data; the backend
/// tessellates the rest from their parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32, segments: u32 },
    Torus { radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32 },
    /// Segmented XY plane centred on the origin.
    Plane { width: f32, height: f32, width_segments: u32, height_segments: u32 },
    Cone { radius: f32, height: f32, segments: u32 },
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32, segments: u32 },
    Ring { inner: f32, outer: f32, segments: u32 },
    /// Point cloud; positions live in `Mesh::vertices`.
    Points,
    /// Polyline; positions live in `Mesh::vertices`.
    Line,
    /// Extruded text, only constructible once its font has loaded.
    Text { content: String, size: f32, depth: f32, font: FontHandle },
    /// Several parts moved as one entity.
    Group(Vec<MeshPart>),
}

impl Geometry {
    pub fn cube(size: f32) -> Self {
        Geometry::Box { width: size, height: size, depth: size }
    }

    pub fn sphere(radius: f32) -> Self {
        Geometry::Sphere { radius, segments: 16 }
    }

    /// Small integer tag used in packed render instances.
    pub fn kind_tag(&self) -> u32 {
        match self {
            Geometry::Box { .. } => 1,
            Geometry::Sphere { .. } => 2,
            Geometry::Torus { .. } => 3,
            Geometry::Plane { .. } => 4,
            Geometry::Cone { .. } => 5,
            Geometry::Cylinder { .. } => 6,
            Geometry::Ring { .. } => 7,
            Geometry::Points => 8,
            Geometry::Line => 9,
            Geometry::Text { .. } => 10,
            Geometry::Group(_) => 11,
        }
    }
}

/// Surface description, loosely a PBR "standard" material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: Color,
    pub emissive_intensity: f32,
    /// Unlit materials ignore scene lights.
    pub unlit: bool,
    pub transparent: bool,
    /// Rendered from the inside (glow shells).
    pub back_side: bool,
    pub texture: Option<TextureHandle>,
    /// Point sprite size for `Geometry::Points`.
    pub point_size: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
            emissive: Color::BLACK,
            emissive_intensity: 0.0,
            unlit: false,
            transparent: false,
            back_side: false,
            texture: None,
            point_size: 1.0,
        }
    }
}

impl Material {
    /// Lit material with the given base color.
    pub fn standard(color: Color) -> Self {
        Self { color, ..Default::default() }
    }

    /// Unlit flat color.
    pub fn basic(color: Color) -> Self {
        Self { color, unlit: true, ..Default::default() }
    }

    // -- Builder pattern --

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_emissive(mut self, emissive: Color, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }

    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    pub fn back_side(mut self) -> Self {
        self.back_side = true;
        self
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_point_size(mut self, size: f32) -> Self {
        self.point_size = size;
        self
    }
}

/// One piece of a `Geometry::Group`, placed relative to the entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub geometry: Geometry,
    pub material: Material,
    pub offset: Vec3,
    pub rotation: Vec3,
}

impl MeshPart {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            offset: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    pub fn at(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }
}

/// GPU-backed drawable data owned by an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
    /// Mutable vertex positions, sized once at creation.
    pub vertices: Vec<Vec3>,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        let vertices = match &geometry {
            Geometry::Plane { width, height, width_segments, height_segments } => {
                plane_grid(*width, *height, *width_segments, *height_segments)
            }
            _ => Vec::new(),
        };
        Self { geometry, material, vertices }
    }

    pub fn points(positions: Vec<Vec3>, material: Material) -> Self {
        Self {
            geometry: Geometry::Points,
            material,
            vertices: positions,
        }
    }

    pub fn line(points: Vec<Vec3>, material: Material) -> Self {
        Self {
            geometry: Geometry::Line,
            material,
            vertices: points,
        }
    }

    pub fn group(parts: Vec<MeshPart>) -> Self {
        Self {
            geometry: Geometry::Group(parts),
            material: Material::default(),
            vertices: Vec::new(),
        }
    }

    /// Every material in the mesh, including group parts.
    pub fn materials_mut(&mut self) -> impl Iterator<Item = &mut Material> {
        let parts: Box<dyn Iterator<Item = &mut Material>> = match &mut self.geometry {
            Geometry::Group(parts) => Box::new(parts.iter_mut().map(|p| &mut p.material)),
            _ => Box::new(std::iter::empty()),
        };
        std::iter::once(&mut self.material).chain(parts)
    }
}

/// Row-major vertex grid for a segmented plane in the XY plane.
pub fn plane_grid(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Vec<Vec3> {
    let cols = width_segments.max(1);
    let rows = height_segments.max(1);
    let mut out = Vec::with_capacity(((cols + 1) * (rows + 1)) as usize);
    for row in 0..=rows {
        let y = height * 0.5 - height * row as f32 / rows as f32;
        for col in 0..=cols {
            let x = -width * 0.5 + width * col as f32 / cols as f32;
            out.push(Vec3::new(x, y, 0.0));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_builds_vertex_grid() {
        let mesh = Mesh::new(
            Geometry::Plane { width: 10.0, height: 6.0, width_segments: 32, height_segments: 32 },
            Material::default(),
        );
        assert_eq!(mesh.vertices.len(), 33 * 33);
        assert_eq!(mesh.vertices[0], Vec3::new(-5.0, 3.0, 0.0));
        assert_eq!(*mesh.vertices.last().unwrap(), Vec3::new(5.0, -3.0, 0.0));
    }

    #[test]
    fn solid_shapes_carry_no_vertices() {
        let mesh = Mesh::new(Geometry::cube(2.0), Material::default());
        assert!(mesh.vertices.is_empty());
    }

    #[test]
    fn group_exposes_part_materials() {
        let mut mesh = Mesh::group(vec![
            MeshPart::new(Geometry::cube(1.0), Material::standard(Color::WHITE)),
            MeshPart::new(Geometry::sphere(0.5), Material::basic(Color::BLACK)),
        ]);
        for m in mesh.materials_mut() {
            m.emissive_intensity = 0.7;
        }
        if let Geometry::Group(parts) = &mesh.geometry {
            assert!(parts.iter().all(|p| p.material.emissive_intensity == 0.7));
        } else {
            panic!("expected group");
        }
    }
}
