//! Assembled geometry record.

use crate::util::{BBox3d, DVec2, DVec3, DVec4};

/// Render-ready triangle mesh reconstructed from one geometry node.
///
/// After assembly all attribute buffers share a single index space: every
/// non-empty attribute array has the same length as `positions`, and
/// `triangles` holds flattened index triples into that unified space. The
/// record is never mutated once assembly completes.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    /// Control-point positions, expanded to the unified vertex space.
    pub positions: Vec<DVec3>,
    /// Per-vertex normals (empty if the file has no normal layer).
    pub normals: Vec<DVec3>,
    /// Per-vertex tangents (optional).
    pub tangents: Vec<DVec3>,
    /// Per-vertex RGBA colors (optional).
    pub colors: Vec<DVec4>,
    /// Per-vertex UV coordinates (optional).
    pub uvs: Vec<DVec2>,

    /// Per-loop indices into `positions` (the unified index space).
    pub position_indices: Vec<i32>,
    /// Per-loop indices into `normals` before the unified remap folded
    /// them onto `position_indices`; retained for diagnostics.
    pub normal_indices: Vec<i32>,
    /// See `normal_indices`.
    pub tangent_indices: Vec<i32>,
    /// See `normal_indices`.
    pub color_indices: Vec<i32>,
    /// See `normal_indices`.
    pub uv_indices: Vec<i32>,

    /// One material id per emitted triangle; empty when the file maps a
    /// single material to the whole mesh (`AllSame`) or has none.
    pub materials: Vec<i32>,
    /// Flattened triangle index triples into the unified vertex space.
    pub triangles: Vec<i32>,
}

impl Geometry {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices in the unified space.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of emitted triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Check if mesh has normals.
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Check if mesh has tangents.
    pub fn has_tangents(&self) -> bool {
        !self.tangents.is_empty()
    }

    /// Check if mesh has vertex colors.
    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    /// Check if mesh has UVs.
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Material id for a triangle, if per-triangle materials are present.
    pub fn material_for_triangle(&self, triangle: usize) -> Option<i32> {
        self.materials.get(triangle).copied()
    }

    /// Check if this is a usable mesh (has positions and triangles).
    pub fn is_valid(&self) -> bool {
        !self.positions.is_empty() && !self.triangles.is_empty()
    }

    /// Calculate the bounding box of the positions.
    pub fn compute_bounds(&self) -> BBox3d {
        let mut bounds = BBox3d::EMPTY;
        for &p in &self.positions {
            bounds.expand_by_point(p);
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_geometry() {
        let geom = Geometry::new();
        assert_eq!(geom.num_vertices(), 0);
        assert_eq!(geom.triangle_count(), 0);
        assert!(!geom.is_valid());
        assert!(!geom.has_normals());
        assert!(geom.compute_bounds().is_empty());
    }

    #[test]
    fn test_triangle_queries() {
        let geom = Geometry {
            positions: vec![DVec3::ZERO, DVec3::X, DVec3::Y],
            triangles: vec![0, 1, 2],
            materials: vec![7],
            ..Default::default()
        };
        assert!(geom.is_valid());
        assert_eq!(geom.triangle_count(), 1);
        assert_eq!(geom.material_for_triangle(0), Some(7));
        assert_eq!(geom.material_for_triangle(1), None);

        let bounds = geom.compute_bounds();
        assert_eq!(bounds.min, DVec3::ZERO);
        assert_eq!(bounds.max, DVec3::new(1.0, 1.0, 0.0));
    }
}
