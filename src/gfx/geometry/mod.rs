//! # Procedural Geometry Generation
//!
//! CPU-side mesh descriptions, produced once by a generator and consumed
//! once by [`GeometryData::to_mesh`]. The GPU copy does not keep the
//! description alive.
//!
//! ## Supported Primitives
//!
//! - **Sphere**: UV sphere over arbitrary latitude/longitude ranges
//! - **Cylinder**: open cylinder side over a longitude range
//! - **Union**: several geometries concatenated into one index space
//!
//! ## Usage
//!
//! ```rust
//! use shortcrust::gfx::geometry::{union, Cylinder, Sphere};
//!
//! let globe = Sphere::default().build().unwrap();
//! let stand = Cylinder { height: 0.5, radius: 0.1, ..Default::default() }
//!     .build()
//!     .unwrap();
//!
//! let model = union(&[globe, stand]).unwrap();
//! assert!(model.validate().is_ok());
//! ```

pub mod primitives;

pub use primitives::*;

use std::rc::Rc;

use thiserror::Error;

use crate::gfx::mesh::Mesh;
use crate::gl_utils::{GlError, GraphicsApi};

/// Malformed generator parameters or a description that breaks its own invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{name} must be at least 1")]
    ZeroDivisions { name: &'static str },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("{name} range is empty or reversed: {min}..{max}")]
    BadRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{0} vertices do not fit a 32-bit index")]
    TooManyVertices(u64),
    #[error("attribute lengths differ: {positions} positions, {normals} normals, {tex_coords} texture coordinates")]
    LengthMismatch {
        positions: usize,
        normals: usize,
        tex_coords: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    #[error("index {index} at position {at} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        index: u32,
        at: usize,
        vertex_count: usize,
    },
}

/// Positions, normals, texture coordinates and triangle indices of one mesh.
///
/// The three attribute vectors run in parallel; `indices` is read in
/// triples, each one a counter-clockwise triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub positions: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            tex_coords: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub(crate) fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) {
        self.positions.push(position);
        self.normals.push(normal);
        self.tex_coords.push(tex_coord);
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the attribute vectors line up and every index is in range.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let vertex_count = self.positions.len();
        if self.normals.len() != vertex_count || self.tex_coords.len() != vertex_count {
            return Err(GeometryError::LengthMismatch {
                positions: vertex_count,
                normals: self.normals.len(),
                tex_coords: self.tex_coords.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::PartialTriangle(self.indices.len()));
        }
        if let Some((at, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfRange {
                index,
                at,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Concatenates `self` and `others` in order. See [`union`].
    pub fn union(&self, others: &[GeometryData]) -> Result<GeometryData, GeometryError> {
        let mut parts = Vec::with_capacity(others.len() + 1);
        parts.push(self);
        parts.extend(others.iter());
        union_refs(&parts)
    }

    /// Uploads this geometry into GPU buffers.
    pub fn to_mesh<G: GraphicsApi>(&self, gl: &Rc<G>) -> Result<Mesh<G>, GlError> {
        Mesh::new(gl, self)
    }
}

/// Merges geometries into one, rebasing each input's indices by the number
/// of vertices that precede it. Shared vertices are not deduplicated.
///
/// Fails with [`GeometryError::TooManyVertices`] when a rebased index would
/// not fit in 32 bits.
pub fn union(geometries: &[GeometryData]) -> Result<GeometryData, GeometryError> {
    let parts: Vec<&GeometryData> = geometries.iter().collect();
    union_refs(&parts)
}

fn union_refs(geometries: &[&GeometryData]) -> Result<GeometryData, GeometryError> {
    let offsets = rebase_offsets(geometries.iter().map(|g| g.vertex_count()))?;
    let vertex_total = geometries.iter().map(|g| g.vertex_count()).sum();
    let index_total = geometries.iter().map(|g| g.indices.len()).sum();
    let mut merged = GeometryData::with_capacity(vertex_total, index_total);

    for (geometry, offset) in geometries.iter().zip(offsets) {
        merged.positions.extend_from_slice(&geometry.positions);
        merged.normals.extend_from_slice(&geometry.normals);
        merged.tex_coords.extend_from_slice(&geometry.tex_coords);
        for &index in &geometry.indices {
            let rebased = index
                .checked_add(offset)
                .ok_or_else(|| {
                    GeometryError::TooManyVertices(u64::from(index) + u64::from(offset) + 1)
                })?;
            merged.indices.push(rebased);
        }
    }
    Ok(merged)
}

/// First vertex of each part in the merged index space.
fn rebase_offsets(
    vertex_counts: impl IntoIterator<Item = usize>,
) -> Result<Vec<u32>, GeometryError> {
    let mut offsets = Vec::new();
    let mut total = 0u64;
    for count in vertex_counts {
        offsets.push(u32::try_from(total).map_err(|_| GeometryError::TooManyVertices(total))?);
        total += count as u64;
    }
    // The last vertex must still be addressable
    if total > u64::from(u32::MAX) + 1 {
        return Err(GeometryError::TooManyVertices(total));
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(offset: f32) -> GeometryData {
        let mut g = GeometryData::new();
        g.push_vertex([offset, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]);
        g.push_vertex([offset + 1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]);
        g.push_vertex([offset, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]);
        g.indices = vec![0, 1, 2];
        g
    }

    #[test]
    fn test_union_rebases_second_geometry() {
        let a = Sphere {
            lat_divisions: 2,
            lng_divisions: 3,
            ..Default::default()
        }
        .build()
        .unwrap();
        let b = Cylinder {
            divisions: 4,
            ..Default::default()
        }
        .build()
        .unwrap();

        let merged = union(&[a.clone(), b.clone()]).unwrap();

        assert_eq!(merged.vertex_count(), a.vertex_count() + b.vertex_count());
        assert_eq!(&merged.indices[..a.indices.len()], &a.indices[..]);
        let offset = a.vertex_count() as u32;
        for (merged_index, original) in merged.indices[a.indices.len()..].iter().zip(&b.indices) {
            assert_eq!(*merged_index, original + offset);
        }
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn test_union_is_deterministic_and_ordered() {
        let parts = [triangle(0.0), triangle(5.0), triangle(10.0)];
        let first = union(&parts).unwrap();
        let second = union(&parts).unwrap();
        assert_eq!(first, second);

        assert_eq!(first.indices, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(first.positions[3], [5.0, 0.0, 0.0]);
        assert_eq!(first.positions[6], [10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_union_method_matches_free_function() {
        let a = triangle(0.0);
        let b = triangle(2.0);
        assert_eq!(a.union(&[b.clone()]).unwrap(), union(&[a, b]).unwrap());
    }

    #[test]
    fn test_union_of_nothing_is_empty() {
        let empty = union(&[]).unwrap();
        assert_eq!(empty.vertex_count(), 0);
        assert!(empty.indices.is_empty());
    }

    #[test]
    fn test_rebase_offsets_reject_32_bit_overflow() {
        assert_eq!(rebase_offsets([3, 4, 5]), Ok(vec![0, 3, 7]));
        assert_eq!(
            rebase_offsets([u32::MAX as usize, 1]),
            Ok(vec![0, u32::MAX])
        );
        assert_eq!(
            rebase_offsets([u32::MAX as usize, 2]),
            Err(GeometryError::TooManyVertices(u64::from(u32::MAX) + 2))
        );
    }

    #[test]
    fn test_union_rejects_index_past_32_bits() {
        let mut far = GeometryData::new();
        far.indices = vec![u32::MAX];

        assert_eq!(
            union(&[triangle(0.0), far]),
            Err(GeometryError::TooManyVertices(u64::from(u32::MAX) + 4))
        );
    }

    #[test]
    fn test_validate_catches_broken_descriptions() {
        let mut g = triangle(0.0);
        g.indices.push(0);
        assert_eq!(g.validate(), Err(GeometryError::PartialTriangle(4)));

        let mut g = triangle(0.0);
        g.indices[1] = 3;
        assert_eq!(
            g.validate(),
            Err(GeometryError::IndexOutOfRange {
                index: 3,
                at: 1,
                vertex_count: 3
            })
        );

        let mut g = triangle(0.0);
        g.normals.pop();
        assert!(matches!(
            g.validate(),
            Err(GeometryError::LengthMismatch { normals: 2, .. })
        ));
    }
}
