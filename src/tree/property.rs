//! Property type tags and array payload headers.

use byteorder::{LittleEndian, ReadBytesExt};

use crate::util::{Error, Result};

/// One-character type tag of an element property.
///
/// Scalar kinds carry their value directly in the payload window; array
/// kinds carry a 12-byte `[count][encoding][byte_length]` header followed
/// by raw or zlib-compressed element bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// 32-bit signed integer scalar
    Int32 = b'I',
    /// 64-bit signed integer scalar
    Int64 = b'L',
    /// 32-bit float scalar
    Float = b'F',
    /// 64-bit float scalar
    Double = b'D',
    /// UTF-8 string
    String = b'S',
    /// Array of 32-bit signed integers
    Int32Array = b'i',
    /// Array of 64-bit signed integers
    Int64Array = b'l',
    /// Array of 32-bit floats
    FloatArray = b'f',
    /// Array of 64-bit floats
    DoubleArray = b'd',
}

impl TypeTag {
    /// Parse a tag from its one-character file encoding.
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            b'I' => Some(Self::Int32),
            b'L' => Some(Self::Int64),
            b'F' => Some(Self::Float),
            b'D' => Some(Self::Double),
            b'S' => Some(Self::String),
            b'i' => Some(Self::Int32Array),
            b'l' => Some(Self::Int64Array),
            b'f' => Some(Self::FloatArray),
            b'd' => Some(Self::DoubleArray),
            _ => None,
        }
    }

    /// The one-character file encoding of this tag.
    pub const fn as_char(self) -> char {
        self as u8 as char
    }

    /// Whether this tag is one of the array kinds.
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            Self::Int32Array | Self::Int64Array | Self::FloatArray | Self::DoubleArray
        )
    }

    /// Size in bytes of one element, for array kinds.
    pub const fn element_size(self) -> Option<usize> {
        match self {
            Self::Int32Array | Self::FloatArray => Some(4),
            Self::Int64Array | Self::DoubleArray => Some(8),
            _ => None,
        }
    }
}

/// Size of the array property header: `[count: u32][encoding: u32][byte_length: u32]`.
pub const ARRAY_HEADER_SIZE: usize = 12;

/// Payload encoding: flat element bytes.
pub const ENCODING_RAW: u32 = 0;
/// Payload encoding: zlib-compressed element bytes.
pub const ENCODING_DEFLATE: u32 = 1;

/// Parsed header of an array property window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayHeader {
    /// Number of elements in the decoded array.
    pub count: u32,
    /// Payload encoding (0 = raw, 1 = zlib).
    pub encoding: u32,
    /// Byte length of the payload as stored in the file.
    pub byte_length: u32,
}

impl ArrayHeader {
    /// Parse the header from the start of a property window.
    pub fn parse(window: &[u8]) -> Result<Self> {
        if window.len() < ARRAY_HEADER_SIZE {
            return Err(Error::decode("array property header truncated"));
        }
        let mut cur = window;
        let read = |cur: &mut &[u8]| -> Result<u32> {
            cur.read_u32::<LittleEndian>()
                .map_err(|e| Error::decode(format!("array header: {e}")))
        };
        Ok(Self {
            count: read(&mut cur)?,
            encoding: read(&mut cur)?,
            byte_length: read(&mut cur)?,
        })
    }

    /// Append the header bytes to a window being assembled.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&self.encoding.to_le_bytes());
        out.extend_from_slice(&self.byte_length.to_le_bytes());
    }
}
