/// Wavefront OBJ reader and writer (positions and faces only)
use std::fmt::Write as _;

use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{char, i64 as signed, space0, space1},
    combinator::{all_consuming, opt},
    multi::many1,
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::LoadError;
use crate::geometry::Mesh;

/// Parse OBJ text into an indexed mesh.
///
/// Only `v` and `f` statements contribute geometry. Polygons are split into a
/// triangle fan around their first corner, and texture/normal references in
/// face tokens are skipped.
pub fn parse_obj(input: &str) -> Result<Mesh, LoadError> {
    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for (number, raw) in input.lines().enumerate() {
        let line = number + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();

        match content.split_whitespace().next() {
            Some("v") => {
                let (_, (x, y, z)) =
                    all_consuming(vertex_statement)(content).map_err(|e| syntax_error(line, e))?;
                positions.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let (_, refs) =
                    all_consuming(face_statement)(content).map_err(|e| syntax_error(line, e))?;
                if refs.len() < 3 {
                    return Err(LoadError::Obj {
                        line,
                        message: format!("face has {} vertices, expected at least 3", refs.len()),
                    });
                }
                let corners = refs
                    .into_iter()
                    .map(|r| resolve_index(r, positions.len(), line))
                    .collect::<Result<Vec<_>, _>>()?;
                for i in 1..corners.len() - 1 {
                    indices.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
                }
            }
            // Normals, texture coordinates, groups and materials carry no topology
            _ => {}
        }
    }

    let mesh = Mesh::indexed(positions, indices);
    mesh.validate()?;
    Ok(mesh)
}

fn vertex_statement(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = tag("v")(input)?;
    let (input, x) = preceded(space1, float)(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    // Optional homogeneous weight
    let (input, _) = opt(preceded(space1, float))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, (x, y, z)))
}

fn face_statement(input: &str) -> IResult<&str, Vec<i64>> {
    let (input, _) = tag("f")(input)?;
    let (input, refs) = many1(preceded(space1, face_ref))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, refs))
}

/// `v`, `v/t`, `v//n` or `v/t/n`; only the position reference is kept
fn face_ref(input: &str) -> IResult<&str, i64> {
    terminated(
        signed,
        opt(preceded(char('/'), take_till(|c: char| c.is_whitespace()))),
    )(input)
}

fn resolve_index(reference: i64, vertex_count: usize, line: usize) -> Result<u32, LoadError> {
    let resolved = match reference {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(vertex_count as i64 + r).filter(|&i| i >= 0),
    };
    resolved
        .and_then(|i| u32::try_from(i).ok())
        .ok_or_else(|| LoadError::Obj {
            line,
            message: format!("invalid vertex reference {reference}"),
        })
}

fn syntax_error(line: usize, error: nom::Err<nom::error::Error<&str>>) -> LoadError {
    LoadError::Obj {
        line,
        message: format!("{error}"),
    }
}

fn encode_error(error: std::fmt::Error) -> LoadError {
    LoadError::Encode(error.to_string())
}

/// Encode a mesh as OBJ text with 1-based face indices
pub fn write_obj(mesh: &Mesh) -> Result<String, LoadError> {
    mesh.validate()?;

    let mut out = String::new();
    writeln!(out, "# meshlens OBJ export").map_err(encode_error)?;
    for p in mesh.positions() {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z).map_err(encode_error)?;
    }
    for [a, b, c] in mesh.triangles() {
        writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1).map_err(encode_error)?;
    }

    Ok(out)
}
