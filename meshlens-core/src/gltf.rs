/// glTF 2.0 import and export.
///
/// Loading flattens every triangle primitive of every mesh into a single
/// [`Mesh`]; node transforms, materials and textures are ignored. Export
/// writes a self-contained `.gltf` JSON document whose single buffer is
/// embedded as a base64 data URI.
use std::collections::BTreeMap;
use std::path::Path;

use ::gltf::json as gj;
use ::gltf::mesh::Mode;
use ::gltf::Semantic;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use nalgebra::Point3;

use crate::error::LoadError;
use crate::geometry::Mesh;

/// Decode `.gltf` or `.glb` bytes.
///
/// `base` is the directory used to resolve relative buffer URIs; without it
/// only embedded buffers (GLB blob or data URIs) can be read.
pub fn parse_gltf(bytes: &[u8], base: Option<&Path>) -> Result<Mesh, LoadError> {
    let ::gltf::Gltf { document, blob } = ::gltf::Gltf::from_slice(bytes)?;
    let buffers = ::gltf::import_buffers(&document, base, blob)?;
    merge_primitives(&document, &buffers)
}

fn merge_primitives(
    document: &::gltf::Document,
    buffers: &[::gltf::buffer::Data],
) -> Result<Mesh, LoadError> {
    let mut parts = Vec::new();

    for (mesh_idx, mesh) in document.meshes().enumerate() {
        for (prim_idx, primitive) in mesh.primitives().enumerate() {
            if primitive.mode() != Mode::Triangles {
                warn!(
                    "skipping glTF mesh {mesh_idx} primitive {prim_idx}: mode {:?} is not triangles",
                    primitive.mode()
                );
                continue;
            }
            parts.push(read_primitive(&primitive, buffers, mesh_idx, prim_idx)?);
        }
    }

    let any_indexed = parts.iter().any(Mesh::is_indexed);
    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for part in parts {
        let (part_positions, part_indices) = part.into_parts();
        let total = positions.len() + part_positions.len();
        let end = u32::try_from(total).map_err(|_| LoadError::TooManyVertices(total))?;
        let base = positions.len() as u32;

        match part_indices {
            Some(local) => indices.extend(local.into_iter().map(|i| i + base)),
            // Mixed input: a non-indexed primitive becomes sequential triangles
            None if any_indexed => indices.extend(base..end),
            None => {}
        }
        positions.extend(part_positions);
    }

    debug!(
        "glTF: {} meshes merged into {} vertices ({})",
        document.meshes().len(),
        positions.len(),
        if any_indexed { "indexed" } else { "non-indexed" }
    );

    Ok(Mesh::new(positions, any_indexed.then_some(indices)))
}

/// Read one triangle primitive and check it on its own, before its indices
/// are shifted into the merged buffer.
fn read_primitive(
    primitive: &::gltf::Primitive,
    buffers: &[::gltf::buffer::Data],
    mesh_idx: usize,
    prim_idx: usize,
) -> Result<Mesh, LoadError> {
    let unreadable = |attribute: &'static str| LoadError::UnreadableAccessor {
        mesh: mesh_idx,
        primitive: prim_idx,
        attribute,
    };
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    // Zero-count accessors are never handed to the reader, it cannot size them
    let position_count = primitive
        .get(&Semantic::Positions)
        .map(|accessor| accessor.count())
        .ok_or(LoadError::MissingPositions {
            mesh: mesh_idx,
            primitive: prim_idx,
        })?;
    let mut positions: Vec<Point3<f32>> = if position_count == 0 {
        Vec::new()
    } else {
        reader
            .read_positions()
            .ok_or_else(|| unreadable("POSITION"))?
            .map(|[x, y, z]| Point3::new(x, y, z))
            .collect()
    };

    let indices = match primitive.indices() {
        None => None,
        Some(accessor) if accessor.count() == 0 => Some(Vec::new()),
        Some(_) => Some(
            reader
                .read_indices()
                .ok_or_else(|| unreadable("indices"))?
                .into_u32()
                .collect::<Vec<_>>(),
        ),
    };

    let mesh = match indices {
        Some(indices) => Mesh::indexed(positions, indices),
        None => {
            let whole = positions.len() / 3 * 3;
            if whole != positions.len() {
                warn!(
                    "glTF mesh {mesh_idx} primitive {prim_idx}: dropping {} positions that do not fill a triangle",
                    positions.len() - whole
                );
                positions.truncate(whole);
            }
            Mesh::soup(positions)
        }
    };
    mesh.validate()?;
    Ok(mesh)
}

/// Encode a mesh as a `.gltf` JSON document with an embedded buffer.
///
/// A triangle soup is written without an index accessor; positions that do
/// not complete a triangle are dropped since glTF cannot express them. An
/// indexed mesh keeps its index accessor even when it has no faces.
pub fn write_gltf(mesh: &Mesh) -> Result<Vec<u8>, LoadError> {
    mesh.validate()?;

    let positions = match mesh.indices() {
        Some(_) => mesh.positions(),
        None => &mesh.positions()[..mesh.face_count() * 3],
    };

    let mut context = ExportContext::new();
    let primitives = if positions.is_empty() {
        Vec::new()
    } else {
        vec![context.push_primitive(positions, mesh.indices(), gj::mesh::Mode::Triangles)]
    };
    context.finish(primitives)
}

/// Accumulates the JSON root and the single binary buffer of a document
struct ExportContext {
    root: gj::Root,
    buffer_data: Vec<u8>,
}

impl ExportContext {
    fn new() -> Self {
        Self {
            root: gj::Root::default(),
            buffer_data: Vec::new(),
        }
    }

    fn push_buffer_view(&mut self, data: &[u8], target: gj::buffer::Target) -> u32 {
        let offset = self.buffer_data.len();
        self.buffer_data.extend_from_slice(data);

        let view_idx = self.root.buffer_views.len() as u32;
        self.root.buffer_views.push(gj::buffer::View {
            buffer: gj::Index::new(0),
            byte_offset: Some(gj::validation::USize64(offset as u64)),
            byte_length: gj::validation::USize64(data.len() as u64),
            byte_stride: None,
            target: Some(gj::validation::Checked::Valid(target)),
            name: None,
            extensions: None,
            extras: gj::Extras::default(),
        });
        view_idx
    }

    fn push_accessor(
        &mut self,
        buffer_view: Option<u32>,
        count: usize,
        component_type: gj::accessor::ComponentType,
        type_: gj::accessor::Type,
        min: Option<gj::Value>,
        max: Option<gj::Value>,
    ) -> u32 {
        let acc_idx = self.root.accessors.len() as u32;
        self.root.accessors.push(gj::Accessor {
            buffer_view: buffer_view.map(gj::Index::new),
            byte_offset: buffer_view.map(|_| gj::validation::USize64(0)),
            count: gj::validation::USize64(count as u64),
            component_type: gj::validation::Checked::Valid(gj::accessor::GenericComponentType(
                component_type,
            )),
            type_: gj::validation::Checked::Valid(type_),
            min,
            max,
            normalized: false,
            name: None,
            sparse: None,
            extensions: None,
            extras: gj::Extras::default(),
        });
        acc_idx
    }

    /// Append the buffers of one primitive. An empty index list gets an
    /// accessor with no buffer view so the primitive stays indexed.
    fn push_primitive(
        &mut self,
        positions: &[Point3<f32>],
        indices: Option<&[u32]>,
        mode: gj::mesh::Mode,
    ) -> gj::mesh::Primitive {
        let position_bytes: Vec<u8> = positions
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .flat_map(f32::to_le_bytes)
            .collect();
        let view_idx = self.push_buffer_view(&position_bytes, gj::buffer::Target::ArrayBuffer);
        let (min, max) = position_min_max(positions);
        let position_accessor = self.push_accessor(
            Some(view_idx),
            positions.len(),
            gj::accessor::ComponentType::F32,
            gj::accessor::Type::Vec3,
            min,
            max,
        );

        let mut attributes = BTreeMap::new();
        attributes.insert(
            gj::validation::Checked::Valid(gj::mesh::Semantic::Positions),
            gj::Index::new(position_accessor),
        );

        let indices_accessor = match indices {
            Some(indices) => {
                let view_idx = if indices.is_empty() {
                    None
                } else {
                    let index_bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
                    Some(self.push_buffer_view(&index_bytes, gj::buffer::Target::ElementArrayBuffer))
                };
                let acc_idx = self.push_accessor(
                    view_idx,
                    indices.len(),
                    gj::accessor::ComponentType::U32,
                    gj::accessor::Type::Scalar,
                    None,
                    None,
                );
                Some(gj::Index::new(acc_idx))
            }
            None => None,
        };

        gj::mesh::Primitive {
            attributes,
            extensions: None,
            extras: gj::Extras::default(),
            indices: indices_accessor,
            material: None,
            mode: gj::validation::Checked::Valid(mode),
            targets: None,
        }
    }

    /// Wrap the primitives in one mesh, node and scene and serialize the root.
    /// Without primitives the document carries only its asset block.
    fn finish(mut self, primitives: Vec<gj::mesh::Primitive>) -> Result<Vec<u8>, LoadError> {
        self.root.asset = gj::Asset {
            generator: Some("meshlens".into()),
            version: "2.0".into(),
            ..Default::default()
        };

        if !primitives.is_empty() {
            self.root.meshes.push(gj::Mesh {
                name: None,
                primitives,
                weights: None,
                extensions: None,
                extras: gj::Extras::default(),
            });
            self.root.nodes.push(gj::Node {
                mesh: Some(gj::Index::new(0)),
                ..gj::Node::default()
            });
            self.root.scenes.push(gj::Scene {
                name: None,
                nodes: vec![gj::Index::new(0)],
                extensions: None,
                extras: gj::Extras::default(),
            });
            self.root.scene = Some(gj::Index::new(0));
        }

        if !self.buffer_data.is_empty() {
            self.root.buffers.push(gj::Buffer {
                byte_length: gj::validation::USize64(self.buffer_data.len() as u64),
                name: None,
                uri: Some(format!(
                    "data:application/octet-stream;base64,{}",
                    STANDARD.encode(&self.buffer_data)
                )),
                extensions: None,
                extras: gj::Extras::default(),
            });
        }

        self.root
            .to_vec_pretty()
            .map_err(|e| LoadError::Encode(format!("glTF JSON serialization failed: {e}")))
    }
}

fn position_min_max(positions: &[Point3<f32>]) -> (Option<gj::Value>, Option<gj::Value>) {
    if positions.is_empty() {
        return (None, None);
    }

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for c in 0..3 {
            min[c] = min[c].min(p[c]);
            max[c] = max[c].max(p[c]);
        }
    }
    (Some(gj::Value::from(min.to_vec())), Some(gj::Value::from(max.to_vec())))
}
