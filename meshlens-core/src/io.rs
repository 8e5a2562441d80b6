/// Format detection and file-level load/save entry points
use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::geometry::Mesh;
use crate::{gltf, obj, stl};

/// Mesh file formats understood by the loaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    Stl,
    Obj,
    Gltf,
}

impl MeshFormat {
    pub const ALL: [MeshFormat; 3] = [MeshFormat::Stl, MeshFormat::Obj, MeshFormat::Gltf];

    /// Detect the format from a file extension (`.glb` counts as glTF)
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "stl" => Ok(Self::Stl),
            "obj" => Ok(Self::Obj),
            "gltf" | "glb" => Ok(Self::Gltf),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Extension used when writing this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
            Self::Gltf => "gltf",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stl => "STL",
            Self::Obj => "OBJ",
            Self::Gltf => "GLTF",
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Load a mesh file, picking the parser from its extension
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path)?;
    let data = fs::read(path)?;

    let mesh = match format {
        // Relative buffer URIs resolve against the file's directory
        MeshFormat::Gltf => gltf::parse_gltf(&data, Some(path.parent().unwrap_or(Path::new("."))))?,
        _ => load_mesh_bytes(format, &data)?,
    };

    info!(
        "loaded {} as {}: {} vertices, {} faces{}",
        path.display(),
        format,
        mesh.vertex_count(),
        mesh.face_count(),
        if mesh.is_indexed() { "" } else { " (non-indexed)" }
    );
    Ok(mesh)
}

/// Decode in-memory file contents of a known format
pub fn load_mesh_bytes(format: MeshFormat, data: &[u8]) -> Result<Mesh, LoadError> {
    debug!("decoding {} bytes as {}", data.len(), format);
    match format {
        MeshFormat::Stl => stl::parse_stl(data),
        MeshFormat::Obj => {
            let text = std::str::from_utf8(data)
                .map_err(|e| LoadError::Obj { line: 0, message: e.to_string() })?;
            obj::parse_obj(text)
        }
        MeshFormat::Gltf => gltf::parse_gltf(data, None),
    }
}

/// Encode a mesh into the bytes of a file of the given format
pub fn encode_mesh(format: MeshFormat, mesh: &Mesh) -> Result<Vec<u8>, LoadError> {
    match format {
        MeshFormat::Stl => stl::write_binary_stl(mesh),
        MeshFormat::Obj => obj::write_obj(mesh).map(String::into_bytes),
        MeshFormat::Gltf => gltf::write_gltf(mesh),
    }
}

/// Write a mesh to disk, picking the encoder from the extension.
///
/// `.glb` output is not supported; write `.gltf` instead.
pub fn save_mesh(mesh: &Mesh, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path)?;
    if format == MeshFormat::Gltf && path.extension().is_some_and(|e| e.eq_ignore_ascii_case("glb")) {
        return Err(LoadError::UnsupportedFormat(format!(
            "{} (binary glTF output)",
            path.display()
        )));
    }

    let bytes = encode_mesh(format, mesh)?;
    fs::write(path, bytes)?;
    info!("wrote {} ({})", path.display(), format);
    Ok(())
}
