//! 3MF packages: a single mesh object in millimetres, built once.

use std::io::Cursor;

use lib3mf::{BuildItem, Mesh, MetadataEntry, Model, Object, Triangle, Vertex};
use plate_kernel::RenderMesh;

use crate::errors::ExportError;
use crate::indexed::IndexedMesh;

const OBJECT_ID: usize = 1;

fn package_error(err: lib3mf::Error) -> ExportError {
    ExportError::ThreeMf {
        reason: err.to_string(),
    }
}

pub fn write_3mf(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, ExportError> {
    let welded = IndexedMesh::weld(mesh)?;
    let mut shape = Mesh::new();
    for [x, y, z] in &welded.positions {
        shape.vertices.push(Vertex::new(*x as f64, *y as f64, *z as f64));
    }
    for [a, b, c] in &welded.triangles {
        shape.triangles.push(Triangle::new(*a as usize, *b as usize, *c as usize));
    }

    let mut object = Object::new(OBJECT_ID);
    object.name = Some(name.to_string());
    object.mesh = Some(shape);

    let mut model = Model::new();
    model.unit = "millimeter".to_string();
    model.metadata.push(MetadataEntry::new("Title".to_string(), name.to_string()));
    model.resources.objects.push(object);
    model.build.items.push(BuildItem::new(OBJECT_ID));

    let cursor = model.to_writer(Cursor::new(Vec::new())).map_err(package_error)?;
    Ok(cursor.into_inner())
}

/// Read the meshes of every build item back into one render mesh. Build
/// transforms are not applied.
pub fn read_3mf(bytes: &[u8]) -> Result<RenderMesh, ExportError> {
    let model = Model::from_reader(Cursor::new(bytes)).map_err(package_error)?;
    let mut out = RenderMesh::default();
    for item in &model.build.items {
        let Some(mesh) = model
            .resources
            .objects
            .iter()
            .find(|o| o.id == item.objectid)
            .and_then(|o| o.mesh.as_ref())
        else {
            continue;
        };
        let base = (out.vertices.len() / 3) as u32;
        for v in &mesh.vertices {
            out.vertices.extend_from_slice(&[v.x as f32, v.y as f32, v.z as f32]);
            out.normals.extend_from_slice(&[0.0, 0.0, 0.0]);
        }
        for t in &mesh.triangles {
            out.indices
                .extend_from_slice(&[base + t.v1 as u32, base + t.v2 as u32, base + t.v3 as u32]);
        }
    }
    if out.indices.is_empty() {
        return Err(ExportError::EmptyMesh);
    }
    Ok(out)
}
