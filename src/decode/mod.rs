//! Typed array decoding for element properties.
//!
//! An array property's payload window is `[count: u32][encoding: u32]
//! [byte_length: u32][payload]`. `encoding == 0` stores flat element bytes,
//! `encoding == 1` a zlib stream that inflates to `count * element_size`
//! bytes. Input is untrusted: every declared size is checked against both
//! the property's own byte boundary and the caller's destination capacity
//! before any copy or inflate happens.
//!
//! On top of the byte-level decode sit two reinterpretation layers: flat
//! scalar arrays can be read as fixed-width records (3-wide positions,
//! 4-wide colors), and double-precision records decode transparently from
//! either `d` or `f` payloads, upconverting the latter.

mod inflate;

pub use inflate::inflate_into;

use bytemuck::Pod;

use crate::tree::{ArrayHeader, ElementTree, PropertyId, TypeTag, ARRAY_HEADER_SIZE};
use crate::tree::{ENCODING_DEFLATE, ENCODING_RAW};
use crate::util::{Error, Result};

/// Decode an array property's elements into `dest`, which fixes the
/// maximum byte capacity. Fails without touching `dest` if the declared
/// sizes violate either the property boundary or the capacity.
pub fn decode_into(tree: &ElementTree, property: PropertyId, dest: &mut [u8]) -> Result<()> {
    let tag = tree.tag(property);
    let element_size = tag
        .element_size()
        .ok_or_else(|| Error::decode(format!("property '{}' is not an array", tag.as_char())))?;

    let window = tree.payload(property);
    let header = ArrayHeader::parse(window)?;
    let payload = &window[ARRAY_HEADER_SIZE..];

    match header.encoding {
        ENCODING_RAW => {
            let len = header.byte_length as usize;
            if len > payload.len() {
                return Err(Error::decode("array payload extends past property end"));
            }
            if len > dest.len() {
                return Err(Error::decode("array payload exceeds destination capacity"));
            }
            dest[..len].copy_from_slice(&payload[..len]);
            Ok(())
        }
        ENCODING_DEFLATE => {
            let decoded_len = element_size * header.count as usize;
            if decoded_len > dest.len() {
                return Err(Error::decode("decoded array exceeds destination capacity"));
            }
            let compressed_len = header.byte_length as usize;
            if compressed_len > payload.len() {
                return Err(Error::decode("compressed payload extends past property end"));
            }
            inflate_into(&payload[..compressed_len], &mut dest[..decoded_len])
        }
        other => Err(Error::decode(format!("unknown array encoding {other}"))),
    }
}

/// Decode an array property into records of type `T`, reinterpreting the
/// flat element stream at `T`'s width. The element count must divide
/// evenly into records.
pub fn decode_array<T: Pod>(tree: &ElementTree, property: PropertyId) -> Result<Vec<T>> {
    let tag = tree.tag(property);
    let element_size = tag
        .element_size()
        .ok_or_else(|| Error::decode(format!("property '{}' is not an array", tag.as_char())))?;

    let record_size = std::mem::size_of::<T>();
    if record_size % element_size != 0 {
        return Err(Error::decode(format!(
            "record of {record_size} bytes is not a multiple of {element_size}-byte elements"
        )));
    }
    let width = record_size / element_size;

    let count = ArrayHeader::parse(tree.payload(property))?.count as usize;
    if count % width != 0 {
        return Err(Error::decode(format!(
            "element count {count} does not divide into {width}-wide records"
        )));
    }

    let mut out = vec![T::zeroed(); count / width];
    decode_into(tree, property, bytemuck::cast_slice_mut(&mut out))?;
    Ok(out)
}

/// Decode a double-precision vector array (`T` built from f64 fields,
/// e.g. `DVec3`). Accepts either a `d` payload, decoded directly, or an
/// `f` payload upconverted field by field; the record shape the caller
/// asked for is preserved either way.
pub fn decode_double_vec<T: Pod>(tree: &ElementTree, property: PropertyId) -> Result<Vec<T>> {
    let record_size = std::mem::size_of::<T>();
    if record_size % std::mem::size_of::<f64>() != 0 {
        return Err(Error::decode(format!(
            "record of {record_size} bytes has no f64 field layout"
        )));
    }
    let width = record_size / std::mem::size_of::<f64>();

    match tree.tag(property) {
        TypeTag::DoubleArray => decode_array::<T>(tree, property),
        TypeTag::FloatArray => {
            let singles: Vec<f32> = decode_array(tree, property)?;
            if singles.len() % width != 0 {
                return Err(Error::decode(format!(
                    "element count {} does not divide into {width}-wide records",
                    singles.len()
                )));
            }
            let mut out = vec![T::zeroed(); singles.len() / width];
            let fields: &mut [f64] = bytemuck::cast_slice_mut(&mut out);
            for (field, single) in fields.iter_mut().zip(&singles) {
                *field = f64::from(*single);
            }
            Ok(out)
        }
        other => Err(Error::decode(format!(
            "expected float or double array, got '{}'",
            other.as_char()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ElementId, ElementTree};
    use crate::util::{DVec2, DVec3};
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn tree_with_element() -> (ElementTree, ElementId) {
        let mut tree = ElementTree::new();
        let el = tree.add_element(tree.root(), "Vertices");
        (tree, el)
    }

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_raw_roundtrip_i32() {
        let (mut tree, el) = tree_with_element();
        let prop = tree.add_i32_array(el, &[0, 1, 2, -4]);
        let decoded: Vec<i32> = decode_array(&tree, prop).unwrap();
        assert_eq!(decoded, vec![0, 1, 2, -4]);
    }

    #[test]
    fn test_raw_roundtrip_i64() {
        let (mut tree, el) = tree_with_element();
        let prop = tree.add_i64_array(el, &[i64::MIN, 0, i64::MAX]);
        let decoded: Vec<i64> = decode_array(&tree, prop).unwrap();
        assert_eq!(decoded, vec![i64::MIN, 0, i64::MAX]);
    }

    #[test]
    fn test_compressed_roundtrip_f64() {
        let (mut tree, el) = tree_with_element();
        let values = [0.0f64, 1.5, -2.25, 1e100, f64::MIN_POSITIVE, 42.0];
        let compressed = deflate(bytemuck::cast_slice(&values));
        let prop = tree.add_array(
            el,
            TypeTag::DoubleArray,
            values.len() as u32,
            ENCODING_DEFLATE,
            &compressed,
        );
        let decoded: Vec<f64> = decode_array(&tree, prop).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_record_reinterpretation() {
        let (mut tree, el) = tree_with_element();
        let prop = tree.add_f64_array(el, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let decoded: Vec<DVec3> = decode_array(&tree, prop).unwrap();
        assert_eq!(decoded, vec![DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.0, 5.0, 6.0)]);
    }

    #[test]
    fn test_record_width_must_divide() {
        let (mut tree, el) = tree_with_element();
        // 5 scalars cannot form 2-wide records
        let prop = tree.add_f64_array(el, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(decode_array::<DVec2>(&tree, prop).is_err());
    }

    #[test]
    fn test_float_payload_upconverts() {
        let (mut tree, el) = tree_with_element();
        let prop = tree.add_f32_array(el, &[0.5, 1.0, -2.0, 8.0, 0.25, -1.0]);
        let decoded: Vec<DVec3> = decode_double_vec(&tree, prop).unwrap();
        assert_eq!(decoded[0], DVec3::new(0.5, 1.0, -2.0));
        assert_eq!(decoded[1], DVec3::new(8.0, 0.25, -1.0));
    }

    #[test]
    fn test_double_vec_rejects_int_payload() {
        let (mut tree, el) = tree_with_element();
        let prop = tree.add_i32_array(el, &[1, 2, 3]);
        assert!(decode_double_vec::<DVec3>(&tree, prop).is_err());
    }

    #[test]
    fn test_raw_payload_window_overrun() {
        let (mut tree, el) = tree_with_element();
        // header claims 16 payload bytes but only 4 follow
        let mut window = Vec::new();
        ArrayHeader { count: 4, encoding: ENCODING_RAW, byte_length: 16 }.write(&mut window);
        window.extend_from_slice(&[0u8; 4]);
        let prop = tree.add_property(el, TypeTag::Int32Array, &window);
        assert!(decode_array::<i32>(&tree, prop).is_err());
    }

    #[test]
    fn test_compressed_capacity_bound() {
        let (mut tree, el) = tree_with_element();
        let values = [1i32, 2, 3, 4];
        let compressed = deflate(bytemuck::cast_slice(&values));
        // count claims 4 elements; destination sized for 2 must be refused
        let prop = tree.add_array(el, TypeTag::Int32Array, 4, ENCODING_DEFLATE, &compressed);
        let mut small = [0u8; 8];
        assert!(decode_into(&tree, prop, &mut small).is_err());
    }

    #[test]
    fn test_unknown_encoding_fails() {
        let (mut tree, el) = tree_with_element();
        let prop = tree.add_array(el, TypeTag::Int32Array, 1, 2, &[0u8; 4]);
        assert!(decode_array::<i32>(&tree, prop).is_err());
    }

    #[test]
    fn test_scalar_property_is_not_an_array() {
        let (mut tree, el) = tree_with_element();
        let prop = tree.add_string(el, "ByPolygonVertex");
        assert!(decode_array::<i32>(&tree, prop).is_err());
    }

    #[test]
    fn test_truncated_header() {
        let (mut tree, el) = tree_with_element();
        let prop = tree.add_property(el, TypeTag::Int32Array, &[0u8; 8]);
        assert!(decode_array::<i32>(&tree, prop).is_err());
    }
}
