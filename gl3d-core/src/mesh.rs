/// Indexed triangle meshes with per-vertex normals.
use crate::buffer::{GeometryBuffer, VertexAttribute};
use crate::error::MeshError;
use crate::gpu::FLOAT_SIZE;
use crate::math::Vec3;

/// Largest vertex index a 16-bit index buffer can address.
pub const MAX_U16_INDEX: usize = u16::MAX as usize;

/// Floats per vertex in [`Mesh::interleaved`]: position then normal.
pub const INTERLEAVED_COMPONENTS: usize = 6;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    /// Zero-based vertex indices, counter-clockwise.
    pub faces: Vec<[u32; 3]>,
    pub normals: Vec<Vec3>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh, computing normals when `normals` is empty.
    pub fn from_parts(
        positions: Vec<Vec3>,
        faces: Vec<[u32; 3]>,
        normals: Vec<Vec3>,
    ) -> Result<Self, MeshError> {
        let mesh = Self {
            positions,
            faces,
            normals,
        };
        mesh.validate()?;
        Ok(if mesh.normals.is_empty() {
            mesh.with_computed_normals()
        } else {
            mesh
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.faces.is_empty()
    }

    /// Checks that every face references an existing vertex.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertices = self.positions.len();
        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices) {
                return Err(MeshError::VertexOutOfBounds {
                    face,
                    index,
                    vertices,
                });
            }
        }
        Ok(())
    }

    /// Replaces the normals with ones computed from the faces.
    pub fn with_computed_normals(mut self) -> Self {
        self.normals = compute_vertex_normals(&self.positions, &self.faces);
        self
    }

    pub fn positions_f32(&self) -> Vec<f32> {
        flatten(&self.positions)
    }

    pub fn normals_f32(&self) -> Vec<f32> {
        flatten(&self.normals)
    }

    /// Face indices for a 16-bit element buffer.
    pub fn indices_u16(&self) -> Result<Vec<u16>, MeshError> {
        self.faces
            .iter()
            .flatten()
            .map(|&index| {
                u16::try_from(index).map_err(|_| MeshError::IndexRangeExceeded {
                    index: index as usize,
                    max: MAX_U16_INDEX,
                })
            })
            .collect()
    }

    /// Position and normal per vertex, six floats each. Vertices without a
    /// normal get a zero normal.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.positions.len() * INTERLEAVED_COMPONENTS);
        for (i, position) in self.positions.iter().enumerate() {
            let normal = self.normals.get(i).copied().unwrap_or(Vec3::ZERO);
            data.extend(position.to_array().iter().map(|&c| c as f32));
            data.extend(normal.to_array().iter().map(|&c| c as f32));
        }
        data
    }

    /// Interleaved geometry with the given position and normal attribute
    /// names.
    pub fn to_geometry_buffer(
        &self,
        position_attribute: &str,
        normal_attribute: &str,
    ) -> Result<GeometryBuffer, MeshError> {
        let stride = INTERLEAVED_COMPONENTS as i32 * FLOAT_SIZE;
        Ok(GeometryBuffer::new(
            self.interleaved(),
            vec![
                VertexAttribute::new(position_attribute, 3, stride, 0),
                VertexAttribute::new(normal_attribute, 3, stride, 3 * FLOAT_SIZE),
            ],
            self.indices_u16()?,
        ))
    }

    /// Axis-aligned bounds as (min, max), absent for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(min, max), p| {
            (
                Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        }))
    }
}

fn flatten(values: &[Vec3]) -> Vec<f32> {
    values
        .iter()
        .flat_map(|v| v.to_array())
        .map(|c| c as f32)
        .collect()
}

/// Computes one normal per vertex.
///
/// Faces are visited in order; each face normal `(p2 - p1) x (p3 - p1)` is
/// added unnormalized to its three vertices, and every sum is normalized once
/// at the end. Vertices whose sum is zero get a zero normal.
pub fn compute_vertex_normals(positions: &[Vec3], faces: &[[u32; 3]]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; positions.len()];
    for face in faces {
        let [a, b, c] = face.map(|i| i as usize);
        let (Some(&p1), Some(&p2), Some(&p3)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let normal = p2.sub(p1).cross(p3.sub(p1));
        for index in [a, b, c] {
            sums[index] = sums[index].add(normal);
        }
    }
    sums.into_iter()
        .map(|sum| sum.normalized().unwrap_or(Vec3::ZERO))
        .collect()
}
