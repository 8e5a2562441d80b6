/// Error types shared by the analyzer, the format loaders and configuration
use thiserror::Error;

/// Index data that cannot describe a triangle mesh.
///
/// This is the only failure the topology analyzer reports. It is a permanent
/// defect of the input, never a transient condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedMeshError {
    #[error("index buffer length {len} is not a multiple of 3")]
    IndexCountNotMultipleOfThree { len: usize },

    #[error("index {index} at position {position} is out of range for {vertices} vertices")]
    IndexOutOfRange {
        index: u32,
        position: usize,
        vertices: usize,
    },
}

/// Errors raised while reading or writing mesh files.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    #[error("STL parse error: {0}")]
    Stl(String),

    #[error("OBJ parse error on line {line}: {message}")]
    Obj { line: usize, message: String },

    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("glTF mesh {mesh} primitive {primitive} has no POSITION attribute")]
    MissingPositions { mesh: usize, primitive: usize },

    #[error("glTF mesh {mesh} primitive {primitive}: {attribute} accessor has no readable buffer data")]
    UnreadableAccessor {
        mesh: usize,
        primitive: usize,
        attribute: &'static str,
    },

    #[error("{0} vertices cannot be addressed by 32-bit indices")]
    TooManyVertices(usize),

    #[error("malformed mesh: {0}")]
    Malformed(#[from] MalformedMeshError),

    #[error("encode error: {0}")]
    Encode(String),
}

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("[{section}] {field} must be a finite number, got {value}")]
    NonFinite {
        section: &'static str,
        field: &'static str,
        value: f32,
    },
}
