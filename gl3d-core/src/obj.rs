/// Wavefront OBJ parser for positions, normals and faces.
///
/// Lines are parsed one at a time: `v x y z`, `vn x y z` and `f a b c ...`.
/// Other record kinds (`vt`, `o`, `g`, `usemtl`, ...) are skipped. Face
/// corners may be `i`, `i/t`, `i//n` or `i/t/n`; only the vertex index is
/// kept. Polygons are split into a triangle fan. When the file carries no
/// `vn` records, vertex normals are computed from the faces.
use nom::{
    bytes::complete::{take_till1, take_while},
    character::complete::{space0, space1, u32 as index},
    combinator::eof,
    multi::many1,
    number::complete::double,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use crate::error::MeshError;
use crate::math::Vec3;
use crate::mesh::Mesh;

fn keyword(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

fn coordinates(input: &str) -> IResult<&str, Vec3> {
    let (input, (x, y, z)) = tuple((
        preceded(space1, double),
        preceded(space1, double),
        preceded(space1, double),
    ))(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

fn corner(input: &str) -> IResult<&str, u32> {
    terminated(index, take_while(|c: char| c == '/' || c.is_ascii_digit()))(input)
}

fn corners(input: &str) -> IResult<&str, Vec<u32>> {
    terminated(many1(preceded(space1, corner)), tuple((space0, eof)))(input)
}

fn malformed(line: usize, message: impl Into<String>) -> MeshError {
    MeshError::Malformed {
        line,
        message: message.into(),
    }
}

/// Parses a vector record, allowing extra trailing fields such as `w`.
fn parse_vector(rest: &str, line: usize, what: &str) -> Result<Vec3, MeshError> {
    match coordinates(rest) {
        Ok((tail, v)) if tail.is_empty() || tail.starts_with(char::is_whitespace) => {
            if v.x.is_finite() && v.y.is_finite() && v.z.is_finite() {
                Ok(v)
            } else {
                Err(malformed(line, format!("{} components must be finite", what)))
            }
        }
        _ => Err(malformed(line, format!("expected three {} components", what))),
    }
}

/// Parses a face record into zero-based triangles.
fn parse_face(rest: &str, line: usize) -> Result<Vec<[u32; 3]>, MeshError> {
    let corners = match corners(rest) {
        Ok((_, corners)) if corners.len() >= 3 => corners,
        Ok(_) => return Err(malformed(line, "a face needs at least three vertices")),
        Err(_) => return Err(malformed(line, "expected positive vertex indices")),
    };
    if corners.contains(&0) {
        return Err(malformed(line, "vertex indices start at 1"));
    }
    let corners: Vec<u32> = corners.into_iter().map(|i| i - 1).collect();
    Ok((1..corners.len() - 1)
        .map(|i| [corners[0], corners[i], corners[i + 1]])
        .collect())
}

/// Parses OBJ text into a mesh with one normal per vertex.
///
/// Empty input yields an empty mesh.
pub fn parse_obj(input: &str) -> Result<Mesh, MeshError> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut faces = Vec::new();

    for (number, raw) in input.lines().enumerate() {
        let line = number + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        let Ok((rest, kind)) = keyword(content) else {
            continue;
        };
        match kind {
            "v" => positions.push(parse_vector(rest, line, "vertex")?),
            "vn" => normals.push(parse_vector(rest, line, "normal")?),
            "f" => faces.extend(parse_face(rest, line)?),
            _ => log::trace!("Skipping OBJ record {} on line {}", kind, line),
        }
    }

    if !normals.is_empty() && normals.len() != positions.len() {
        log::warn!(
            "OBJ has {} normals for {} vertices",
            normals.len(),
            positions.len()
        );
    }
    Mesh::from_parts(positions, faces, normals)
}

/// Parses optional OBJ text; absent text yields an empty mesh.
pub fn parse_obj_source(source: Option<&str>) -> Result<Mesh, MeshError> {
    match source {
        Some(text) => parse_obj(text),
        None => Ok(Mesh::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn test_single_triangle() {
        let mesh = parse_obj(TRIANGLE).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(mesh.normals.len(), 3);
        for normal in &mesh.normals {
            assert!(normal.approx_eq(Vec3::Z, 1e-12));
        }
    }

    #[test]
    fn test_parsing_is_repeatable() {
        assert_eq!(parse_obj(TRIANGLE).unwrap(), parse_obj(TRIANGLE).unwrap());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_obj("").unwrap().is_empty());
        assert!(parse_obj_source(None).unwrap().is_empty());
        assert!(parse_obj_source(Some("\n\n")).unwrap().is_empty());
    }

    #[test]
    fn test_parsed_normals_are_kept() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nvn 0 0 -1\nvn 0 0 -1\nf 1//1 2//2 3//3\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.normals, vec![Vec3::new(0.0, 0.0, -1.0); 3]);
    }

    #[test]
    fn test_tolerates_comments_and_crlf() {
        let text = "# exported\r\nv  0 0 0\r\nv\t1 0 0 1.0\r\nv 0 1 0 # apex\r\no tri\r\nvt 0 0\r\nf 1/1 2/1 3/1 \r\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.indices_u16().unwrap(), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_malformed_lines() {
        let err = parse_obj("v 0 0 0\nv 1 x 0\n").unwrap_err();
        assert!(matches!(err, MeshError::Malformed { line: 2, .. }));

        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, MeshError::Malformed { line: 4, .. }));

        let err = parse_obj("v 0 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, MeshError::Malformed { line: 2, .. }));

        let err = parse_obj("v 0 0 0\nf -1 -2 -3\n").unwrap_err();
        assert!(matches!(err, MeshError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_non_finite_coordinates_are_malformed() {
        for text in ["v nan 0 0\n", "v inf 0 0\n", "v 0 0 -infinity\n", "v 1e999 0 0\n"] {
            let err = parse_obj(text).unwrap_err();
            assert!(matches!(err, MeshError::Malformed { line: 1, .. }), "{}", text);
        }
        let err = parse_obj("v 0 0 0\nvn 0 NaN 1\n").unwrap_err();
        assert!(matches!(err, MeshError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_face_referencing_missing_vertex() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert_eq!(
            err,
            MeshError::VertexOutOfBounds {
                face: 0,
                index: 2,
                vertices: 2
            }
        );
    }
}
