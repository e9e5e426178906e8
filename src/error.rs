//! # Error Types
//!
//! This module defines the error type shared by every symbology encoder.
//!
//! Each `encode` call produces at most one diagnostic: either the symbol is
//! fully populated, or exactly one of these variants is returned and no
//! geometry is emitted. The variant is the stable *category*; the payload is
//! the human-readable message.

use thiserror::Error;

/// Main error type for cebra encoding operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Payload contains characters outside the symbology's alphabet
    #[error("Invalid character: {0}")]
    InvalidCharacter(String),

    /// Payload too short or too long for the symbology or selected version
    #[error("Length out of range: {0}")]
    LengthOutOfRange(String),

    /// Mutually exclusive options were combined
    #[error("Incompatible options: {0}")]
    IncompatibleOptions(String),

    /// Data does not fit any permitted version/ECC at the requested settings
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Assertion-level failure; must not fire in released code
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl Error {
    /// Stable category name, independent of the message text.
    ///
    /// Tests and callers that need to branch on the failure kind match on
    /// this rather than on the formatted message.
    pub fn category(&self) -> &'static str {
        match self {
            Error::InvalidCharacter(_) => "InvalidCharacter",
            Error::LengthOutOfRange(_) => "LengthOutOfRange",
            Error::IncompatibleOptions(_) => "IncompatibleOptions",
            Error::CapacityExceeded(_) => "CapacityExceeded",
            Error::InternalInvariant(_) => "InternalInvariant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_is_stable() {
        assert_eq!(
            Error::InvalidCharacter("x".into()).category(),
            "InvalidCharacter"
        );
        assert_eq!(
            Error::CapacityExceeded("too much".into()).category(),
            "CapacityExceeded"
        );
    }

    #[test]
    fn test_message_includes_detail() {
        let e = Error::LengthOutOfRange("input exceeds 80 characters".into());
        assert_eq!(
            e.to_string(),
            "Length out of range: input exceeds 80 characters"
        );
    }
}
