//! Attribute layer parsing.
//!
//! A `LayerElement*` node describes one optional attribute (UV, normal,
//! tangent, color, material): how its values map onto the mesh
//! (`MappingInformationType`), whether they are selected through a
//! separate index array (`ReferenceInformationType`), and the value/index
//! arrays themselves. Layers are optional, but once a layer node exists
//! its value child is required.

use bytemuck::Pod;

use crate::decode::{decode_array, decode_double_vec};
use crate::tree::{ElementId, ElementTree};
use crate::util::{Error, Result};

use super::triangulate::PolygonSpan;

/// How a layer's values correspond to the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappingMode {
    /// One value per loop corner.
    ByPolygonVertex,
    /// One value per face.
    ByPolygon,
    /// One value per control point.
    ByVertex,
}

/// Whether a layer's values are pre-aligned to the mapping or selected
/// through an index array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceMode {
    Direct,
    IndexToDirect,
}

/// Decoded attribute layer: values plus one index per loop corner.
#[derive(Debug)]
pub struct AttributeLayer<T> {
    pub values: Vec<T>,
    pub indices: Vec<i32>,
    pub mapping: MappingMode,
}

fn child_string<'t>(
    tree: &'t ElementTree,
    element: ElementId,
    name: &str,
) -> Result<Option<&'t str>> {
    let Some(child) = tree.find_child(element, name) else {
        return Ok(None);
    };
    let Some(prop) = tree.first_property(child) else {
        return Ok(None);
    };
    tree.string_value(prop).map(Some)
}

fn mapping_mode(tree: &ElementTree, layer: ElementId) -> Result<MappingMode> {
    match child_string(tree, layer, "MappingInformationType")? {
        None => Ok(MappingMode::ByPolygonVertex),
        Some("ByPolygonVertex") => Ok(MappingMode::ByPolygonVertex),
        Some("ByPolygon") => Ok(MappingMode::ByPolygon),
        Some("ByVertice") | Some("ByVertex") => Ok(MappingMode::ByVertex),
        Some(other) => Err(Error::unsupported(format!("mapping mode \"{other}\""))),
    }
}

fn reference_mode(tree: &ElementTree, layer: ElementId) -> Result<ReferenceMode> {
    match child_string(tree, layer, "ReferenceInformationType")? {
        None | Some("Direct") => Ok(ReferenceMode::Direct),
        Some("IndexToDirect") => Ok(ReferenceMode::IndexToDirect),
        Some(other) => Err(Error::unsupported(format!("reference mode \"{other}\""))),
    }
}

/// Generate the index array for a layer that shipped without one.
///
/// `ByPolygon` has no evidenced default and fails loudly rather than
/// guessing a broadcast policy.
fn default_indices(mapping: MappingMode, position_indices: &[i32]) -> Result<Vec<i32>> {
    match mapping {
        MappingMode::ByPolygonVertex => Ok((0..position_indices.len() as i32).collect()),
        MappingMode::ByVertex => Ok(position_indices.to_vec()),
        MappingMode::ByPolygon => {
            Err(Error::unsupported("default index generation for ByPolygon mapping"))
        }
    }
}

/// Parse one attribute layer.
///
/// `value_name`/`index_name` are the layer's value and index child names
/// (e.g. `"UV"`/`"UVIndex"`); `position_indices` is the normalized
/// per-loop control-point index array, which fixes the loop-vertex count
/// and seeds `ByVertex` default indices.
pub fn parse_layer<T: Pod>(
    tree: &ElementTree,
    layer: ElementId,
    value_name: &str,
    index_name: &str,
    position_indices: &[i32],
) -> Result<AttributeLayer<T>> {
    let value_prop = tree
        .find_child(layer, value_name)
        .and_then(|el| tree.first_property(el))
        .ok_or_else(|| Error::missing(format!("{}/{value_name}", tree.name(layer))))?;

    let mapping = mapping_mode(tree, layer)?;
    let reference = reference_mode(tree, layer)?;

    let mut indices = match reference {
        ReferenceMode::Direct => Vec::new(),
        ReferenceMode::IndexToDirect => {
            // a missing index node falls back to default generation
            match tree.find_child(layer, index_name).and_then(|el| tree.first_property(el)) {
                Some(prop) => decode_array::<i32>(tree, prop)?,
                None => Vec::new(),
            }
        }
    };

    let values = decode_double_vec::<T>(tree, value_prop)?;
    if values.is_empty() {
        return Err(Error::decode(format!("{} has an empty value array", tree.name(layer))));
    }

    if indices.is_empty() {
        indices = default_indices(mapping, position_indices)?;
    } else if indices.len() != position_indices.len() {
        return Err(Error::shape("layer indices", position_indices.len(), indices.len()));
    }

    Ok(AttributeLayer { values, indices, mapping })
}

/// Parse the material layer into one material id per emitted triangle.
///
/// Supported combinations are `ByPolygon`/`IndexToDirect`, which expands
/// the per-polygon id list across each polygon's triangles, and `AllSame`,
/// which yields an empty list (a single implicit material).
pub fn parse_material_layer(
    tree: &ElementTree,
    layer: ElementId,
    spans: &[PolygonSpan],
) -> Result<Vec<i32>> {
    let mapping = child_string(tree, layer, "MappingInformationType")?
        .ok_or_else(|| Error::missing("LayerElementMaterial/MappingInformationType"))?;
    let reference = child_string(tree, layer, "ReferenceInformationType")?
        .ok_or_else(|| Error::missing("LayerElementMaterial/ReferenceInformationType"))?;

    if mapping == "ByPolygon" && reference == "IndexToDirect" {
        let ids_prop = tree
            .find_child(layer, "Materials")
            .and_then(|el| tree.first_property(el))
            .ok_or_else(|| Error::missing("LayerElementMaterial/Materials"))?;
        let ids: Vec<i32> = decode_array(tree, ids_prop)?;
        if ids.len() != spans.len() {
            return Err(Error::shape("per-polygon materials", spans.len(), ids.len()));
        }

        let triangle_count = spans.iter().map(|s| s.triangles).sum();
        let mut materials = Vec::with_capacity(triangle_count);
        for (&id, span) in ids.iter().zip(spans) {
            materials.extend(std::iter::repeat_n(id, span.triangles));
        }
        Ok(materials)
    } else if mapping == "AllSame" {
        Ok(Vec::new())
    } else {
        Err(Error::unsupported(format!(
            "material mapping \"{mapping}\"/\"{reference}\""
        )))
    }
}
