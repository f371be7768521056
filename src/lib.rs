//! # fbx-geom
//!
//! Geometry import core for the binary FBX 3D interchange format: given an
//! already-tokenized element tree, reconstructs render-ready triangle
//! meshes (positions, normals, tangents, vertex colors, UVs, per-triangle
//! material ids) from the file's compact polygon-oriented encoding.
//!
//! The tokenizer that produces the element tree and the scene graph built
//! around the finished meshes live outside this crate; it consumes a
//! read-only [`tree::ElementTree`] and produces [`geom::Geometry`] records.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math re-exports
//! - [`tree`] - Arena-backed element/property tree and typed property tags
//! - [`decode`] - Bounds-checked typed array decoding (raw and zlib)
//! - [`geom`] - Triangulation, attribute layers, vertex expansion, assembly
//!
//! ## Example
//!
//! ```
//! use fbx_geom::prelude::*;
//!
//! let mut tree = ElementTree::new();
//! let geometry = tree.add_element(tree.root(), "Geometry");
//!
//! let vertices = tree.add_element(geometry, "Vertices");
//! tree.add_f64_array(vertices, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
//! let polygons = tree.add_element(geometry, "PolygonVertexIndex");
//! tree.add_i32_array(polygons, &[0, 1, -3]);
//!
//! let geom = build_geometry(&tree, geometry)?;
//! assert_eq!(geom.triangle_count(), 1);
//! # Ok::<(), fbx_geom::Error>(())
//! ```

pub mod decode;
pub mod geom;
pub mod tree;
pub mod util;

// Re-export commonly used types
pub use geom::{build_geometry, build_scene_geometries, Geometry};
pub use tree::{ElementId, ElementTree, PropertyId, TypeTag};
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::geom::{
        build_geometry, build_scene_geometries, Geometry, MappingMode, ReferenceMode,
    };
    pub use crate::tree::{ElementId, ElementTree, PropertyId, TypeTag};
    pub use crate::util::{Error, Result};
}
