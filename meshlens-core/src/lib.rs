/// meshlens core library - mesh loading, topology statistics and transforms
///
/// This library holds the stateless pieces: STL/OBJ/glTF decoding, the
/// vertex/edge/face analyzer, whole-mesh reports and the affine transforms
/// driven by sliders or per-frame scripts.

pub mod animation;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod gltf;
pub mod io;
pub mod obj;
pub mod report;
pub mod stl;
pub mod topology;
pub mod transform;

// Re-export commonly used types
pub use animation::{AnimationSettings, BasicTransformations};
pub use config::Config;
pub use controller::{SliderRange, SliderRanges, TransformController};
pub use error::{ConfigError, LoadError, MalformedMeshError};
pub use geometry::{Aabb, Mesh, Triangle};
pub use io::{encode_mesh, load_mesh, load_mesh_bytes, save_mesh, MeshFormat};
pub use report::MeshReport;
pub use topology::{analyze, unique_edges, TopologyStats};
pub use transform::{RotationState, Transform};
