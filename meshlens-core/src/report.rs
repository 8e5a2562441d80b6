/// Whole-mesh measurements used to compare the same model across formats
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::MalformedMeshError;
use crate::geometry::Mesh;
use crate::io::MeshFormat;
use crate::topology::{analyze, undirected};

/// Counts, manifold checks and measurements for one loaded mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshReport {
    pub format: MeshFormat,
    pub vertices: usize,
    pub faces: usize,
    pub edges: usize,
    pub is_watertight: bool,
    pub is_winding_consistent: bool,
    pub volume: f32,
    pub surface_area: f32,
    pub duplicate_vertices: usize,
    pub bounds_min: Option<[f32; 3]>,
    pub bounds_max: Option<[f32; 3]>,
}

impl MeshReport {
    /// Measure a mesh as given.
    ///
    /// Manifold checks use the triangle index triples directly, so a soup
    /// (or an STL file that was not welded) is never watertight.
    pub fn from_mesh(format: MeshFormat, mesh: &Mesh) -> Result<Self, MalformedMeshError> {
        let stats = analyze(mesh)?;

        let mut undirected_uses: HashMap<(u32, u32), usize> = HashMap::new();
        let mut directed_uses: HashMap<(u32, u32), usize> = HashMap::new();
        for [a, b, c] in mesh.triangles() {
            for (from, to) in [(a, b), (b, c), (c, a)] {
                *undirected_uses.entry(undirected(from, to)).or_default() += 1;
                *directed_uses.entry((from, to)).or_default() += 1;
            }
        }

        let is_watertight =
            stats.faces > 0 && undirected_uses.values().all(|&uses| uses == 2);
        let is_winding_consistent = directed_uses.values().all(|&uses| uses == 1);

        let mut signed_volume = 0.0f32;
        let mut surface_area = 0.0f32;
        for triangle in mesh.triangle_positions() {
            let [v0, v1, v2] = triangle.vertices;
            signed_volume += v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0;
            surface_area += triangle.area();
        }

        let bounds = mesh.bounds();

        Ok(Self {
            format,
            vertices: stats.vertices,
            faces: stats.faces,
            edges: stats.edges,
            is_watertight,
            is_winding_consistent,
            volume: signed_volume.abs(),
            surface_area,
            duplicate_vertices: mesh.duplicate_vertex_count(),
            bounds_min: bounds.map(|b| b.min.coords.into()),
            bounds_max: bounds.map(|b| b.max.coords.into()),
        })
    }
}

/// Pretty-printed JSON array of reports
pub fn comparison_json(reports: &[MeshReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_cube_report() {
        let report = MeshReport::from_mesh(MeshFormat::Obj, &Mesh::cube(2.0)).unwrap();
        assert_eq!(report.vertices, 8);
        assert_eq!(report.faces, 12);
        assert_eq!(report.edges, 18);
        assert!(report.is_watertight);
        assert!(report.is_winding_consistent);
        assert_relative_eq!(report.volume, 8.0, epsilon = 1e-5);
        assert_relative_eq!(report.surface_area, 24.0, epsilon = 1e-5);
        assert_eq!(report.duplicate_vertices, 0);
        assert_eq!(report.bounds_min, Some([-1.0, -1.0, -1.0]));
        assert_eq!(report.bounds_max, Some([1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_tetrahedron_volume() {
        let report = MeshReport::from_mesh(MeshFormat::Gltf, &Mesh::tetrahedron(2.0)).unwrap();
        assert_relative_eq!(report.volume, 8.0 / 3.0, epsilon = 1e-5);
        assert!(report.is_watertight);
    }

    #[test]
    fn test_open_and_flipped_surfaces() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let quad = Mesh::indexed(positions.clone(), vec![0, 1, 2, 0, 2, 3]);
        let report = MeshReport::from_mesh(MeshFormat::Obj, &quad).unwrap();
        assert!(!report.is_watertight);
        assert!(report.is_winding_consistent);

        // Second triangle wound the other way repeats the directed edge 2 -> 0
        let flipped = Mesh::indexed(positions, vec![0, 1, 2, 0, 3, 2]);
        let report = MeshReport::from_mesh(MeshFormat::Obj, &flipped).unwrap();
        assert!(!report.is_winding_consistent);
    }

    #[test]
    fn test_soup_is_not_watertight() {
        let stl = crate::stl::parse_binary_stl(&crate::stl::write_binary_stl(&Mesh::cube(1.0)).unwrap())
            .unwrap();
        let report = MeshReport::from_mesh(MeshFormat::Stl, &stl).unwrap();
        assert!(!report.is_watertight);
        assert_eq!(report.edges, 18);
        assert_eq!(report.duplicate_vertices, 28);
    }

    #[test]
    fn test_empty_report() {
        let report = MeshReport::from_mesh(MeshFormat::Stl, &Mesh::empty()).unwrap();
        assert!(!report.is_watertight);
        assert_eq!(report.volume, 0.0);
        assert!(report.bounds_min.is_none());
    }

    #[test]
    fn test_comparison_json_fields() {
        let report = MeshReport::from_mesh(MeshFormat::Stl, &Mesh::cube(1.0)).unwrap();
        let json = comparison_json(&[report.clone()]).unwrap();
        assert!(json.contains("\"format\": \"stl\""));
        assert!(json.contains("\"duplicate_vertices\": 0"));
        let parsed: Vec<MeshReport> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![report]);
    }
}
