//! Geometry reconstruction.
//!
//! - [`geometry`] - The assembled [`Geometry`] record
//! - [`layer`] - Attribute layer parsing (mapping/reference modes)
//! - [`triangulate`] - Polygon-loop fan triangulation
//! - [`expand`] - Vertex expansion into the unified index space
//! - [`assemble`] - Orchestration, one pass per geometry node

pub mod assemble;
pub mod expand;
pub mod geometry;
pub mod layer;
pub mod triangulate;

pub use assemble::{build_geometry, build_scene_geometries};
pub use expand::{expand, remap_to_unified, IndexTable};
pub use geometry::Geometry;
pub use layer::{parse_layer, parse_material_layer, AttributeLayer, MappingMode, ReferenceMode};
pub use triangulate::{polygon_span, polygon_spans, triangulate, PolygonSpan, Triangulation};
