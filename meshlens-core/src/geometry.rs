/// Geometry primitives: the indexed triangle mesh and its helpers
use std::collections::HashMap;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::MalformedMeshError;

/// A triangle given by its three corner positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Unnormalized face normal (`(v1 - v0) x (v2 - v0)`), length is twice the area
    pub fn cross(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Unit face normal following the counter-clockwise winding.
    /// Degenerate triangles yield the zero vector.
    pub fn normal(&self) -> Vector3<f32> {
        self.cross()
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn area(&self) -> f32 {
        self.cross().norm() * 0.5
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// An immutable triangle mesh.
///
/// `positions` holds one entry per vertex. When `indices` is present every
/// consecutive triple names one triangle; when it is absent the mesh is a
/// triangle soup where every three consecutive positions form a triangle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    positions: Vec<Point3<f32>>,
    indices: Option<Vec<u32>>,
}

impl Mesh {
    pub fn new(positions: Vec<Point3<f32>>, indices: Option<Vec<u32>>) -> Self {
        Self { positions, indices }
    }

    pub fn indexed(positions: Vec<Point3<f32>>, indices: Vec<u32>) -> Self {
        Self::new(positions, Some(indices))
    }

    pub fn soup(positions: Vec<Point3<f32>>) -> Self {
        Self::new(positions, None)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Hand back the position and index buffers
    pub fn into_parts(self) -> (Vec<Point3<f32>>, Option<Vec<u32>>) {
        (self.positions, self.indices)
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of whole triangles described by the mesh
    pub fn face_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Check the index buffer against the position buffer.
    ///
    /// A soup is always well formed; trailing positions that do not fill a
    /// triangle are ignored by every consumer.
    pub fn validate(&self) -> Result<(), MalformedMeshError> {
        let Some(indices) = &self.indices else {
            return Ok(());
        };

        if indices.len() % 3 != 0 {
            return Err(MalformedMeshError::IndexCountNotMultipleOfThree { len: indices.len() });
        }

        let vertices = self.positions.len();
        match indices
            .iter()
            .enumerate()
            .find(|(_, &index)| index as usize >= vertices)
        {
            Some((position, &index)) => Err(MalformedMeshError::IndexOutOfRange {
                index,
                position,
                vertices,
            }),
            None => Ok(()),
        }
    }

    /// Vertex index triples, sequential for a soup.
    ///
    /// Callers are expected to have validated the mesh; an index buffer with a
    /// trailing partial triangle simply stops early.
    pub fn triangles(&self) -> Triangles<'_> {
        Triangles {
            mesh: self,
            face: 0,
        }
    }

    /// Corner positions of every triangle. The mesh must be valid.
    pub fn triangle_positions(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.triangles().map(move |[a, b, c]| {
            Triangle::new(
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            )
        })
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Aabb { min, max })
    }

    /// Copy of the mesh translated so its bounding box is centred on the origin
    pub fn centered(&self) -> Self {
        match self.bounds() {
            Some(bounds) => {
                let offset = bounds.center().coords;
                Self {
                    positions: self.positions.iter().map(|p| p - offset).collect(),
                    indices: self.indices.clone(),
                }
            }
            None => self.clone(),
        }
    }

    /// Copy of the mesh with every position multiplied by an affine matrix
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        Self {
            positions: self
                .positions
                .iter()
                .map(|p| matrix.transform_point(p))
                .collect(),
            indices: self.indices.clone(),
        }
    }

    /// Merge bit-identical positions into shared vertices.
    ///
    /// The result is always indexed. Vertices keep their first-occurrence
    /// order, and `-0.0` is treated as `0.0`.
    pub fn welded(&self) -> Self {
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::with_capacity(self.positions.len());
        let mut positions = Vec::new();
        let remap: Vec<u32> = self
            .positions
            .iter()
            .map(|p| {
                *lookup.entry(position_key(p)).or_insert_with(|| {
                    positions.push(*p);
                    (positions.len() - 1) as u32
                })
            })
            .collect();

        let indices = match &self.indices {
            Some(indices) => indices
                .iter()
                .map(|&index| remap.get(index as usize).copied().unwrap_or(index))
                .collect(),
            None => remap[..self.face_count() * 3].to_vec(),
        };

        Self {
            positions,
            indices: Some(indices),
        }
    }

    /// Number of positions that repeat an earlier position exactly
    pub fn duplicate_vertex_count(&self) -> usize {
        let mut seen = HashMap::with_capacity(self.positions.len());
        for p in &self.positions {
            seen.entry(position_key(p)).or_insert(());
        }
        self.positions.len() - seen.len()
    }

    /// Regular tetrahedron inscribed in a cube of edge `size`, centred on the origin
    pub fn tetrahedron(size: f32) -> Self {
        let h = size / 2.0;
        Self::indexed(
            vec![
                Point3::new(h, h, h),
                Point3::new(h, -h, -h),
                Point3::new(-h, h, -h),
                Point3::new(-h, -h, h),
            ],
            vec![0, 1, 2, 0, 3, 1, 0, 2, 3, 1, 3, 2],
        )
    }

    /// Indexed cube with 8 shared corners and outward counter-clockwise faces
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        Self::indexed(
            vec![
                Point3::new(-h, -h, -h),
                Point3::new(h, -h, -h),
                Point3::new(h, h, -h),
                Point3::new(-h, h, -h),
                Point3::new(-h, -h, h),
                Point3::new(h, -h, h),
                Point3::new(h, h, h),
                Point3::new(-h, h, h),
            ],
            vec![
                4, 5, 6, 4, 6, 7, // front
                0, 3, 2, 0, 2, 1, // back
                3, 7, 6, 3, 6, 2, // top
                0, 1, 5, 0, 5, 4, // bottom
                1, 2, 6, 1, 6, 5, // right
                0, 4, 7, 0, 7, 3, // left
            ],
        )
    }
}

fn position_key(p: &Point3<f32>) -> [u32; 3] {
    // 0.0 and -0.0 compare equal but have different bit patterns
    let bits = |v: f32| if v == 0.0 { 0.0f32.to_bits() } else { v.to_bits() };
    [bits(p.x), bits(p.y), bits(p.z)]
}

/// Iterator over the vertex index triples of a [`Mesh`]
pub struct Triangles<'a> {
    mesh: &'a Mesh,
    face: usize,
}

impl Iterator for Triangles<'_> {
    type Item = [u32; 3];

    fn next(&mut self) -> Option<Self::Item> {
        if self.face >= self.mesh.face_count() {
            return None;
        }
        let base = self.face * 3;
        self.face += 1;
        match &self.mesh.indices {
            Some(indices) => Some([indices[base], indices[base + 1], indices[base + 2]]),
            None => {
                let base = base as u32;
                Some([base, base + 1, base + 2])
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.mesh.face_count().saturating_sub(self.face);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Triangles<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_triangle_normal_and_area() {
        let triangle = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        assert_relative_eq!(triangle.normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(triangle.area(), 2.0);
    }

    #[test]
    fn test_degenerate_triangle_normal_is_zero() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let triangle = Triangle::new(p, p, p);
        assert_eq!(triangle.normal(), Vector3::zeros());
    }

    #[test]
    fn test_soup_triangles_are_sequential() {
        let mesh = Mesh::soup(vec![Point3::origin(); 7]);
        let triangles: Vec<_> = mesh.triangles().collect();
        assert_eq!(triangles, vec![[0, 1, 2], [3, 4, 5]]);
        assert_eq!(mesh.triangles().len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_indices() {
        let positions = vec![Point3::origin(); 3];
        let partial = Mesh::indexed(positions.clone(), vec![0, 1, 2, 0]);
        assert_eq!(
            partial.validate(),
            Err(MalformedMeshError::IndexCountNotMultipleOfThree { len: 4 })
        );

        let out_of_range = Mesh::indexed(positions, vec![0, 1, 3]);
        assert_eq!(
            out_of_range.validate(),
            Err(MalformedMeshError::IndexOutOfRange {
                index: 3,
                position: 2,
                vertices: 3
            })
        );
    }

    #[test]
    fn test_bounds_and_centered() {
        let mesh = Mesh::soup(vec![
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(3.0, 6.0, 5.0),
            Point3::new(2.0, 4.0, 4.0),
        ]);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.max, Point3::new(3.0, 6.0, 5.0));
        assert_eq!(bounds.size(), Vector3::new(2.0, 4.0, 2.0));

        let centered = mesh.centered().bounds().unwrap();
        assert_relative_eq!(centered.center(), Point3::origin());
        assert!(Mesh::empty().bounds().is_none());
    }

    #[test]
    fn test_transformed_applies_translation() {
        let mesh = Mesh::tetrahedron(2.0);
        let moved = mesh.transformed(&Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(moved.indices(), mesh.indices());
        assert_relative_eq!(moved.positions()[0], Point3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_welded_soup_shares_corners() {
        // Two triangles of a quad written as a soup
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(1.0, 1.0, 0.0);
        let d = Point3::new(0.0, 1.0, 0.0);
        let mesh = Mesh::soup(vec![a, b, c, a, c, d]);
        assert_eq!(mesh.duplicate_vertex_count(), 2);

        let welded = mesh.welded();
        assert_eq!(welded.positions(), &[a, b, c, d]);
        assert_eq!(welded.indices(), Some(&[0, 1, 2, 0, 2, 3][..]));
    }

    #[test]
    fn test_welded_treats_negative_zero_as_zero() {
        let mesh = Mesh::soup(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(-0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        assert_eq!(mesh.welded().vertex_count(), 2);
    }

    #[test]
    fn test_welded_remaps_indexed_mesh() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let mesh = Mesh::indexed(
            vec![Point3::origin(), p, p, Point3::new(0.0, 1.0, 0.0)],
            vec![0, 1, 3, 0, 3, 2],
        );
        let welded = mesh.welded();
        assert_eq!(welded.vertex_count(), 3);
        assert_eq!(welded.indices(), Some(&[0, 1, 2, 0, 2, 1][..]));
    }

    #[test]
    fn test_cube_shape() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 12);
        assert!(cube.validate().is_ok());
        for triangle in cube.triangle_positions() {
            let centroid = (triangle.vertices[0].coords
                + triangle.vertices[1].coords
                + triangle.vertices[2].coords)
                / 3.0;
            assert!(triangle.normal().dot(&centroid) > 0.0, "face points inward");
        }
    }
}
