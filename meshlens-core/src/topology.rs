/// Vertex, edge and face counts derived from triangle index data
use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::MalformedMeshError;
use crate::geometry::Mesh;

/// Combinatorial summary of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TopologyStats {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
}

impl TopologyStats {
    /// `V - E + F`, equal to 2 for any closed genus-0 surface
    pub fn euler_characteristic(&self) -> i64 {
        self.vertices as i64 - self.edges as i64 + self.faces as i64
    }
}

/// Count vertices, unique undirected edges and faces.
///
/// For an indexed mesh the edge count is exact. A triangle soup carries no
/// shared-vertex information, so its edge count is estimated as
/// `floor(faces * 3 / 2)`, the value for a closed manifold. Weld the mesh
/// first with [`Mesh::welded`] to get a real count.
pub fn analyze(mesh: &Mesh) -> Result<TopologyStats, MalformedMeshError> {
    mesh.validate()?;

    let vertices = mesh.vertex_count();
    let faces = mesh.face_count();

    let edges = if mesh.is_indexed() {
        let mut edges = HashSet::with_capacity(faces * 3 / 2);
        for [a, b, c] in mesh.triangles() {
            edges.insert(undirected(a, b));
            edges.insert(undirected(b, c));
            edges.insert(undirected(a, c));
        }
        edges.len()
    } else {
        faces * 3 / 2
    };

    Ok(TopologyStats {
        vertices,
        edges,
        faces,
    })
}

/// Sorted undirected edges, the line list of a wireframe view.
///
/// A soup is treated as independent triangles over sequential indices.
pub fn unique_edges(mesh: &Mesh) -> Result<Vec<(u32, u32)>, MalformedMeshError> {
    mesh.validate()?;

    let mut edges = BTreeSet::new();
    for [a, b, c] in mesh.triangles() {
        edges.insert(undirected(a, b));
        edges.insert(undirected(b, c));
        edges.insert(undirected(a, c));
    }
    Ok(edges.into_iter().collect())
}

pub(crate) fn undirected(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn points(n: usize) -> Vec<Point3<f32>> {
        (0..n).map(|i| Point3::new(i as f32, (i * i) as f32, 0.0)).collect()
    }

    #[test]
    fn test_single_triangle() {
        let mesh = Mesh::indexed(points(3), vec![0, 1, 2]);
        assert_eq!(
            analyze(&mesh).unwrap(),
            TopologyStats {
                vertices: 3,
                edges: 3,
                faces: 1
            }
        );
    }

    #[test]
    fn test_quad_shares_diagonal() {
        let mesh = Mesh::indexed(points(4), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(
            analyze(&mesh).unwrap(),
            TopologyStats {
                vertices: 4,
                edges: 5,
                faces: 2
            }
        );
    }

    #[test]
    fn test_tetrahedron_satisfies_euler() {
        let stats = analyze(&Mesh::tetrahedron(1.0)).unwrap();
        assert_eq!(
            stats,
            TopologyStats {
                vertices: 4,
                edges: 6,
                faces: 4
            }
        );
        assert_eq!(stats.euler_characteristic(), 2);
    }

    #[test]
    fn test_cube_satisfies_euler() {
        let stats = analyze(&Mesh::cube(1.0)).unwrap();
        assert_eq!(stats.edges, 18);
        assert_eq!(stats.euler_characteristic(), 2);
    }

    #[test]
    fn test_empty_mesh() {
        let empty = TopologyStats::default();
        assert_eq!(analyze(&Mesh::indexed(vec![], vec![])).unwrap(), empty);
        assert_eq!(analyze(&Mesh::empty()).unwrap(), empty);
    }

    #[test]
    fn test_partial_triangle_is_rejected() {
        let mesh = Mesh::indexed(points(4), vec![0, 1, 2, 3]);
        assert_eq!(
            analyze(&mesh),
            Err(MalformedMeshError::IndexCountNotMultipleOfThree { len: 4 })
        );
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mesh = Mesh::indexed(points(3), vec![0, 1, 2, 2, 1, 3]);
        assert!(matches!(
            analyze(&mesh),
            Err(MalformedMeshError::IndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn test_edge_count_ignores_ordering() {
        let forward = Mesh::indexed(points(4), vec![0, 1, 2, 0, 2, 3, 0, 3, 1, 1, 3, 2]);
        // Same faces, reversed face order and rotated/flipped corners
        let shuffled = Mesh::indexed(points(4), vec![2, 3, 1, 1, 0, 3, 3, 2, 0, 2, 1, 0]);
        assert_eq!(
            analyze(&forward).unwrap().edges,
            analyze(&shuffled).unwrap().edges
        );
    }

    #[test]
    fn test_counts_follow_buffer_lengths() {
        let indices: Vec<u32> = (0..30).map(|i| (i * 7 % 10) as u32).collect();
        let mesh = Mesh::indexed(points(10), indices);
        let stats = analyze(&mesh).unwrap();
        assert_eq!(stats.vertices, 10);
        assert_eq!(stats.faces, 10);
    }

    #[test]
    fn test_soup_uses_estimate() {
        let mesh = Mesh::soup(points(10));
        assert_eq!(
            analyze(&mesh).unwrap(),
            TopologyStats {
                vertices: 10,
                edges: 4,
                faces: 3
            }
        );
    }

    #[test]
    fn test_welded_soup_gets_exact_edges() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(1.0, 1.0, 0.0);
        let d = Point3::new(0.0, 1.0, 0.0);
        let soup = Mesh::soup(vec![a, b, c, a, c, d]);
        assert_eq!(analyze(&soup).unwrap().edges, 3);
        assert_eq!(analyze(&soup.welded()).unwrap().edges, 5);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let mesh = Mesh::cube(3.0);
        assert_eq!(analyze(&mesh), analyze(&mesh));
    }

    #[test]
    fn test_unique_edges_sorted() {
        let mesh = Mesh::indexed(points(4), vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(
            unique_edges(&mesh).unwrap(),
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (2, 3)]
        );
    }
}
