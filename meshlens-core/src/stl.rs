/// STL reader and writer for binary and ASCII formats
use nalgebra::Point3;
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::LoadError;
use crate::geometry::Mesh;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Parse a binary STL file into a triangle soup
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, LoadError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(LoadError::Stl("file too small to be a valid STL".to_string()));
    }

    // Skip 80-byte header
    let data = &data[HEADER_LEN..];

    let triangle_count = read_u32(data, 0) as usize;
    let mut positions = Vec::with_capacity(triangle_count.saturating_mul(3).min(data.len() / 12));
    let mut offset = 4;

    for _ in 0..triangle_count {
        if offset + FACET_LEN > data.len() {
            return Err(LoadError::Stl("unexpected end of file".to_string()));
        }

        // Stored facet normals are ignored, they are recomputed on demand
        offset += 12;

        for _ in 0..3 {
            positions.push(Point3::new(
                read_f32(data, offset),
                read_f32(data, offset + 4),
                read_f32(data, offset + 8),
            ));
            offset += 12;
        }

        // Skip attribute byte count (2 bytes)
        offset += 2;
    }

    Ok(Mesh::soup(positions))
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(data, offset))
}

/// Parse an ASCII STL file into a triangle soup
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, LoadError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(LoadError::Stl(format!("failed to parse ASCII STL: {:?}", e))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let positions = facets.into_iter().flatten().collect();
    Ok((input, Mesh::soup(positions)))
}

fn parse_facet(input: &str) -> IResult<&str, [Point3<f32>; 3]> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, [v1, v2, v3]))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, LoadError> {
    // Binary headers may also start with "solid", so an exact binary size wins
    if data.len() >= HEADER_LEN + 4 {
        let count = read_u32(data, HEADER_LEN) as usize;
        if count.checked_mul(FACET_LEN).and_then(|n| n.checked_add(HEADER_LEN + 4)) == Some(data.len()) {
            return parse_binary_stl(data);
        }
    }

    if data.len() > 5 && &data[0..5] == b"solid" {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}

/// Encode a mesh as binary STL with recomputed facet normals
pub fn write_binary_stl(mesh: &Mesh) -> Result<Vec<u8>, LoadError> {
    mesh.validate()?;

    let triangle_count = u32::try_from(mesh.face_count())
        .map_err(|_| LoadError::Encode("too many triangles for STL".to_string()))?;
    let mut data = Vec::with_capacity(HEADER_LEN + 4 + mesh.face_count() * FACET_LEN);

    let mut header = [b' '; HEADER_LEN];
    let label = b"meshlens binary STL";
    header[..label.len()].copy_from_slice(label);
    data.extend_from_slice(&header);
    data.extend_from_slice(&triangle_count.to_le_bytes());

    for triangle in mesh.triangle_positions() {
        let normal = triangle.normal();
        for value in normal.iter() {
            data.extend_from_slice(&value.to_le_bytes());
        }
        for vertex in &triangle.vertices {
            for value in vertex.coords.iter() {
                data.extend_from_slice(&value.to_le_bytes());
            }
        }
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(data)
}
