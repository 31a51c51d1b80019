/// Static geometry generators
use crate::buffer::{GeometryBuffer, VertexAttribute};
use crate::math::Vec3;
use crate::mesh::Mesh;

/// Attribute names used by the generated geometry.
pub const POSITION_2D_ATTRIBUTE: &str = "inPosition";
pub const COLOR_2D_ATTRIBUTE: &str = "inColor";
pub const POSITION_ATTRIBUTE: &str = "aVertexPosition";
pub const COLOR_ATTRIBUTE: &str = "aVertexColor";
pub const TEX_COORD_ATTRIBUTE: &str = "aTextureCoord";

/// One cube side: outward normal, two in-plane axes with `u x v == normal`,
/// and a colour.
struct Side {
    normal: Vec3,
    u: Vec3,
    v: Vec3,
    color: [f32; 3],
}

const SIDES: [Side; 6] = [
    Side {
        normal: Vec3::X,
        u: Vec3::Y,
        v: Vec3::Z,
        color: [1.0, 0.0, 0.0],
    },
    Side {
        normal: Vec3::new(-1.0, 0.0, 0.0),
        u: Vec3::Z,
        v: Vec3::Y,
        color: [0.0, 1.0, 1.0],
    },
    Side {
        normal: Vec3::Y,
        u: Vec3::Z,
        v: Vec3::X,
        color: [0.0, 1.0, 0.0],
    },
    Side {
        normal: Vec3::new(0.0, -1.0, 0.0),
        u: Vec3::X,
        v: Vec3::Z,
        color: [1.0, 0.0, 1.0],
    },
    Side {
        normal: Vec3::Z,
        u: Vec3::X,
        v: Vec3::Y,
        color: [0.0, 0.0, 1.0],
    },
    Side {
        normal: Vec3::new(0.0, 0.0, -1.0),
        u: Vec3::Y,
        v: Vec3::X,
        color: [1.0, 1.0, 0.0],
    },
];

/// Corner offsets along (u, v), counter-clockwise seen from outside.
const CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// Two triangles per side, relative to the side's first vertex.
const SIDE_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

pub struct Geometry;

impl Geometry {
    /// A single coloured triangle: 2D position and RGB per vertex, 20 byte
    /// stride.
    pub fn triangle() -> GeometryBuffer {
        #[rustfmt::skip]
        let vertices = vec![
            -1.0, -1.0,   0.7, 0.0, 0.0,
             1.0,  0.0,   0.0, 0.7, 0.0,
             0.0,  1.0,   0.0, 0.0, 0.7,
        ];
        GeometryBuffer::new(
            vertices,
            vec![
                VertexAttribute::new(POSITION_2D_ATTRIBUTE, 2, 20, 0),
                VertexAttribute::new(COLOR_2D_ATTRIBUTE, 3, 20, 8),
            ],
            vec![0, 1, 2],
        )
    }

    /// A cube centred on the origin with a colour and texture coordinate
    /// stream. Every side has its own four vertices.
    pub fn cube(size: f64) -> GeometryBuffer {
        let mesh = Self::cube_mesh(size);
        let mut colors = Vec::with_capacity(24 * 3);
        let mut tex_coords = Vec::with_capacity(24 * 2);
        for side in &SIDES {
            for (u, v) in CORNERS {
                colors.extend_from_slice(&side.color);
                tex_coords.extend_from_slice(&[(u as f32 + 1.0) / 2.0, (v as f32 + 1.0) / 2.0]);
            }
        }

        GeometryBuffer::new(
            mesh.positions_f32(),
            vec![VertexAttribute::packed(POSITION_ATTRIBUTE, 3)],
            cube_indices(),
        )
        .with_colors(colors, VertexAttribute::packed(COLOR_ATTRIBUTE, 3))
        .with_tex_coords(tex_coords, VertexAttribute::packed(TEX_COORD_ATTRIBUTE, 2))
    }

    /// The cube as a mesh with flat side normals.
    pub fn cube_mesh(size: f64) -> Mesh {
        let half = size / 2.0;
        let mut mesh = Mesh::new();
        for side in &SIDES {
            let base = mesh.positions.len() as u32;
            for (u, v) in CORNERS {
                let corner = side.normal.add(side.u.mul(u)).add(side.v.mul(v));
                mesh.positions.push(corner.mul(half));
                mesh.normals.push(side.normal);
            }
            mesh.faces.push([base, base + 1, base + 2]);
            mesh.faces.push([base, base + 2, base + 3]);
        }
        mesh
    }
}

fn cube_indices() -> Vec<u16> {
    (0..SIDES.len() as u16)
        .flat_map(|side| SIDE_INDICES.iter().map(move |i| side * 4 + i))
        .collect()
}
