//! Vertex expansion and unified remapping.
//!
//! A hardware index buffer addresses every attribute with one index per
//! vertex, but the file lets positions, normals, tangents, colors, and UVs
//! disagree at a shared control point: the same index can be referenced
//! from loop corners that resolve to different attribute combinations.
//! Expansion splits such entries: the conflicting corner gets a duplicate
//! value appended at the end of the buffer and its index redirected there,
//! until no index is referenced with two distinct attribute signatures.
//!
//! Attributes expand in a fixed order (positions, normals, tangents,
//! colors, UVs): each later attribute's signatures read the position
//! indices as already expanded, and the final remap folds every attribute
//! buffer onto that position index space.

use std::collections::HashMap;

use crate::util::{Error, Result};

/// Per-loop index arrays of the attributes *not* being expanded.
///
/// The slot belonging to the attribute under expansion must be left empty:
/// its own identity is what splitting redefines, so it must not force a
/// split by itself. Empty slots read as `-1` in every signature.
#[derive(Default)]
pub struct IndexTable<'a> {
    pub positions: &'a [i32],
    pub normals: &'a [i32],
    pub tangents: &'a [i32],
    pub colors: &'a [i32],
    pub uvs: &'a [i32],
}

/// The attribute combination one loop corner resolves to.
///
/// Two corners can share a buffer index only if their signatures are
/// equal on every non-excluded field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct VertexSignature {
    position: i32,
    normal: i32,
    tangent: i32,
    color: i32,
    uv: i32,
}

impl VertexSignature {
    fn at(table: &IndexTable<'_>, loop_pos: usize) -> Self {
        let pick = |indices: &[i32]| {
            if indices.is_empty() {
                -1
            } else {
                indices[loop_pos]
            }
        };
        Self {
            position: pick(table.positions),
            normal: pick(table.normals),
            tangent: pick(table.tangents),
            color: pick(table.colors),
            uv: pick(table.uvs),
        }
    }
}

fn check_table_lengths(table: &IndexTable<'_>, loop_count: usize) -> Result<()> {
    for indices in [table.positions, table.normals, table.tangents, table.colors, table.uvs] {
        if !indices.is_empty() && indices.len() != loop_count {
            return Err(Error::shape("attribute index arrays", loop_count, indices.len()));
        }
    }
    Ok(())
}

/// Split shared buffer entries until every index is referenced with a
/// single attribute signature.
///
/// `values`/`indices` belong to the attribute being expanded; `others`
/// carries the remaining index arrays (its slot for this attribute left
/// empty). Entries of `indices` are redirected in place and `values` grows
/// by one duplicated entry per split.
pub fn expand<T: Copy>(
    values: &mut Vec<T>,
    indices: &mut [i32],
    others: &IndexTable<'_>,
) -> Result<()> {
    if indices.is_empty() {
        return Ok(());
    }
    check_table_lengths(others, indices.len())?;

    let mut seen: HashMap<i32, VertexSignature> = HashMap::with_capacity(indices.len());

    for i in 0..indices.len() {
        let index = indices[i];
        if index < 0 || index as usize >= values.len() {
            return Err(Error::decode(format!(
                "attribute index {index} out of range at loop position {i}"
            )));
        }
        let signature = VertexSignature::at(others, i);
        match seen.get(&index) {
            None => {
                seen.insert(index, signature);
            }
            Some(&prior) if prior != signature => {
                // the shared entry cannot serve both corners: append a
                // duplicate and redirect this corner to it
                let split = values.len() as i32;
                values.push(values[index as usize]);
                indices[i] = split;
                seen.insert(split, signature);
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Fold an expanded attribute buffer onto the unified position index space.
///
/// Rebuilds `values` at `unified_len` entries so that for every loop
/// position `i`, slot `position_indices[i]` holds the value that
/// `attr_indices[i]` selected before the remap. After this, the position
/// index array addresses the attribute directly.
pub fn remap_to_unified<T: Copy + Default>(
    values: &mut Vec<T>,
    attr_indices: &[i32],
    position_indices: &[i32],
    unified_len: usize,
) -> Result<()> {
    if values.is_empty() {
        return Ok(());
    }
    if attr_indices.len() != position_indices.len() {
        return Err(Error::shape("remap index arrays", position_indices.len(), attr_indices.len()));
    }

    let old = std::mem::take(values);
    let mut unified = vec![T::default(); unified_len];
    for (&dst, &src) in position_indices.iter().zip(attr_indices) {
        if dst < 0 || dst as usize >= unified.len() {
            return Err(Error::decode(format!("position index {dst} out of unified range")));
        }
        if src < 0 || src as usize >= old.len() {
            return Err(Error::decode(format!("attribute index {src} out of range")));
        }
        unified[dst as usize] = old[src as usize];
    }
    *values = unified;
    Ok(())
}
