//! Geometry assembly.
//!
//! Orchestrates the whole reconstruction for one geometry node: decode
//! positions and the polygon stream, triangulate, parse the material and
//! attribute layers, expand and remap every attribute into the unified
//! vertex space, and rewrite the triangle list through it.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::decode::{decode_array, decode_double_vec};
use crate::tree::{ElementId, ElementTree};
use crate::util::{DVec2, DVec3, DVec4, Error, Result};

use super::expand::{expand, remap_to_unified, IndexTable};
use super::geometry::Geometry;
use super::layer::{parse_layer, parse_material_layer};
use super::triangulate::{polygon_spans, triangulate};

fn required_property(
    tree: &ElementTree,
    element: ElementId,
    name: &str,
) -> Result<crate::tree::PropertyId> {
    tree.find_child(element, name)
        .and_then(|el| tree.first_property(el))
        .ok_or_else(|| Error::missing(name.to_string()))
}

/// Reconstruct the render-ready geometry for one `Geometry` element.
///
/// A decode failure on the positions or the polygon stream aborts the
/// record. A failing optional layer is dropped with a warning and the
/// remaining layers are kept; the returned record is always internally
/// consistent.
pub fn build_geometry(tree: &ElementTree, geometry_node: ElementId) -> Result<Geometry> {
    let positions: Vec<DVec3> =
        decode_double_vec(tree, required_property(tree, geometry_node, "Vertices")?)?;
    let mut position_indices: Vec<i32> =
        decode_array(tree, required_property(tree, geometry_node, "PolygonVertexIndex")?)?;

    // measure polygons while the stream still carries its terminal signs
    let spans = polygon_spans(&position_indices)?;
    let triangulation = triangulate(&mut position_indices);

    let mut geom = Geometry {
        positions,
        position_indices,
        triangles: triangulation.triangles,
        ..Default::default()
    };

    if let Some(layer) = tree.find_child(geometry_node, "LayerElementMaterial") {
        match parse_material_layer(tree, layer, &spans) {
            Ok(materials) => geom.materials = materials,
            Err(error) => warn!(%error, "dropping material layer"),
        }
    }

    if let Some(layer) = tree.find_child(geometry_node, "LayerElementNormal") {
        match parse_layer::<DVec3>(tree, layer, "Normals", "NormalsIndex", &geom.position_indices) {
            Ok(parsed) => {
                geom.normals = parsed.values;
                geom.normal_indices = parsed.indices;
            }
            Err(error) => warn!(%error, "dropping normal layer"),
        }
    }

    if let Some(layer) = tree.find_child(geometry_node, "LayerElementTangents") {
        // both child spellings occur in the wild
        let (value_name, index_name) = if tree.find_child(layer, "Tangents").is_some() {
            ("Tangents", "TangentsIndex")
        } else {
            ("Tangent", "TangentIndex")
        };
        match parse_layer::<DVec3>(tree, layer, value_name, index_name, &geom.position_indices) {
            Ok(parsed) => {
                geom.tangents = parsed.values;
                geom.tangent_indices = parsed.indices;
            }
            Err(error) => warn!(%error, "dropping tangent layer"),
        }
    }

    if let Some(layer) = tree.find_child(geometry_node, "LayerElementColor") {
        match parse_layer::<DVec4>(tree, layer, "Colors", "ColorIndex", &geom.position_indices) {
            Ok(parsed) => {
                geom.colors = parsed.values;
                geom.color_indices = parsed.indices;
            }
            Err(error) => warn!(%error, "dropping color layer"),
        }
    }

    if let Some(layer) = tree.find_child(geometry_node, "LayerElementUV") {
        match parse_layer::<DVec2>(tree, layer, "UV", "UVIndex", &geom.position_indices) {
            Ok(parsed) => {
                geom.uvs = parsed.values;
                geom.uv_indices = parsed.indices;
            }
            Err(error) => warn!(%error, "dropping uv layer"),
        }
    }

    // positions expand first: every later signature reads the position
    // indices as already split
    expand(
        &mut geom.positions,
        &mut geom.position_indices,
        &IndexTable {
            positions: &[],
            normals: &geom.normal_indices,
            tangents: &geom.tangent_indices,
            colors: &geom.color_indices,
            uvs: &geom.uv_indices,
        },
    )?;
    let unified_len = geom.positions.len();

    if !geom.normals.is_empty() {
        expand(
            &mut geom.normals,
            &mut geom.normal_indices,
            &IndexTable {
                positions: &geom.position_indices,
                normals: &[],
                tangents: &geom.tangent_indices,
                colors: &geom.color_indices,
                uvs: &geom.uv_indices,
            },
        )?;
        remap_to_unified(&mut geom.normals, &geom.normal_indices, &geom.position_indices, unified_len)?;
    }

    if !geom.tangents.is_empty() {
        expand(
            &mut geom.tangents,
            &mut geom.tangent_indices,
            &IndexTable {
                positions: &geom.position_indices,
                normals: &geom.normal_indices,
                tangents: &[],
                colors: &geom.color_indices,
                uvs: &geom.uv_indices,
            },
        )?;
        remap_to_unified(&mut geom.tangents, &geom.tangent_indices, &geom.position_indices, unified_len)?;
    }

    if !geom.colors.is_empty() {
        expand(
            &mut geom.colors,
            &mut geom.color_indices,
            &IndexTable {
                positions: &geom.position_indices,
                normals: &geom.normal_indices,
                tangents: &geom.tangent_indices,
                colors: &[],
                uvs: &geom.uv_indices,
            },
        )?;
        remap_to_unified(&mut geom.colors, &geom.color_indices, &geom.position_indices, unified_len)?;
    }

    if !geom.uvs.is_empty() {
        expand(
            &mut geom.uvs,
            &mut geom.uv_indices,
            &IndexTable {
                positions: &geom.position_indices,
                normals: &geom.normal_indices,
                tangents: &geom.tangent_indices,
                colors: &geom.color_indices,
                uvs: &[],
            },
        )?;
        remap_to_unified(&mut geom.uvs, &geom.uv_indices, &geom.position_indices, unified_len)?;
    }

    // triangle corners still hold control-point indices; resolve each
    // through its loop position into the unified space
    for (corner, &loop_pos) in triangulation.corner_to_loop.iter().enumerate() {
        geom.triangles[corner] = geom.position_indices[loop_pos];
    }

    debug!(
        vertices = geom.num_vertices(),
        triangles = geom.triangle_count(),
        polygons = spans.len(),
        "assembled geometry"
    );
    Ok(geom)
}

/// Build every geometry record under the tree's `Objects` element.
///
/// Records are independent (they share only the read-only tree), so they
/// are assembled in parallel. Each entry pairs the geometry element with
/// its outcome; one record's failure does not affect its siblings.
pub fn build_scene_geometries(
    tree: &ElementTree,
    root: ElementId,
) -> Result<Vec<(ElementId, Result<Geometry>)>> {
    let objects = tree
        .find_child(root, "Objects")
        .ok_or_else(|| Error::missing("Objects"))?;

    let nodes: Vec<ElementId> = tree
        .children(objects)
        .filter(|&el| tree.name(el) == "Geometry")
        .collect();

    Ok(nodes
        .into_par_iter()
        .map(|el| (el, build_geometry(tree, el)))
        .collect())
}
