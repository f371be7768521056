//! Error types for the FBX geometry import core.

use thiserror::Error;

/// Main error type for geometry import operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required child node or property is absent
    #[error("Missing node: {0}")]
    MissingNode(String),

    /// Mapping or reference mode not recognized, or an unsupported
    /// default-index generation was requested
    #[error("Unsupported mapping: {0}")]
    UnsupportedMapping(String),

    /// Header or size bounds violated while decoding a property payload
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// A decoded array length disagrees with the expected element count
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl Error {
    /// Create a missing-node error.
    pub fn missing(node: impl Into<String>) -> Self {
        Self::MissingNode(node.into())
    }

    /// Create an unsupported-mapping error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedMapping(msg.into())
    }

    /// Create a decode-failure error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeFailure(msg.into())
    }

    /// Create a shape-mismatch error.
    pub fn shape(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { context, expected, actual }
    }
}

/// Result type alias for geometry import operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::missing("LayerElementUV/UV");
        assert!(e.to_string().contains("LayerElementUV/UV"));

        let e = Error::shape("uv indices", 6, 4);
        assert!(e.to_string().contains("6"));
        assert!(e.to_string().contains("4"));
    }

    #[test]
    fn test_error_helpers() {
        assert!(matches!(Error::unsupported("x"), Error::UnsupportedMapping(_)));
        assert!(matches!(Error::decode("x"), Error::DecodeFailure(_)));
    }
}
