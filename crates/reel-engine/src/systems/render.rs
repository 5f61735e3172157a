use glam::{EulerRot, Quat, Vec3};

use crate::components::entity::Entity;
use crate::components::mesh::{Geometry, Material, Mesh};
use crate::renderer::instance::{LightInstance, RenderBuffer, RenderInstance};

/// Pack every visible entity into the render buffer.
///
/// Group meshes expand to one instance per part with the part transform
/// composed onto the entity's. Meshes with CPU-side vertices append them to
/// `buffer.vertices`. Lights go to `buffer.lights`.
pub fn build_render_buffer<'a>(entities: impl Iterator<Item = &'a Entity>, buffer: &mut RenderBuffer) {
    buffer.clear();

    for entity in entities {
        if !entity.visible {
            continue;
        }

        if let Some(light) = &entity.light {
            buffer.lights.push(LightInstance {
                position: entity.position.to_array(),
                kind: light.kind.tag() as f32,
                color: light.color.to_array(),
                intensity: light.intensity,
                ground: light.ground.to_array(),
                range: light.range,
            });
        }

        let mesh = match &entity.mesh {
            Some(m) => m,
            None => continue,
        };

        match &mesh.geometry {
            Geometry::Group(parts) => {
                let rot = euler_quat(entity.rotation);
                for part in parts {
                    let position = entity.position + rot * (part.offset * entity.scale);
                    let (x, y, z) = (rot * euler_quat(part.rotation)).to_euler(EulerRot::XYZ);
                    buffer.push(instance(
                        entity,
                        position,
                        Vec3::new(x, y, z),
                        &part.geometry,
                        &part.material,
                        (0, 0),
                    ));
                }
            }
            geometry => {
                let span = push_vertices(mesh, &mut buffer.vertices);
                buffer.push(instance(
                    entity,
                    entity.position,
                    entity.rotation,
                    geometry,
                    &mesh.material,
                    span,
                ));
            }
        }
    }
}

fn euler_quat(r: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)
}

fn push_vertices(mesh: &Mesh, out: &mut Vec<f32>) -> (usize, usize) {
    let offset = out.len();
    for v in &mesh.vertices {
        out.extend_from_slice(&v.to_array());
    }
    (offset, mesh.vertices.len())
}

fn instance(
    entity: &Entity,
    position: Vec3,
    rotation: Vec3,
    geometry: &Geometry,
    material: &Material,
    (vertex_offset, vertex_count): (usize, usize),
) -> RenderInstance {
    RenderInstance {
        position: position.to_array(),
        rotation: rotation.to_array(),
        scale: entity.scale.to_array(),
        opacity: entity.opacity,
        color: material.color.to_array(),
        emissive: material.emissive_intensity,
        kind: geometry.kind_tag() as f32,
        entity: entity.id.0 as f32,
        vertex_offset: vertex_offset as f32,
        vertex_count: vertex_count as f32,
    }
}
