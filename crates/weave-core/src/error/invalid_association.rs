use super::Error;

/// Error when an association declaration cannot be wired.
///
/// This occurs when:
/// - The association kind is not one of `oneToOne`, `oneToMany`, `manyToMany`
/// - The association declaration has an unsupported shape
/// - The two sides of a many-to-many association name different through tables
/// - A model would end up with two associations under the same accessor
///
/// These errors abort registry construction.
#[derive(Debug)]
pub(super) struct InvalidAssociation {
    message: Box<str>,
}

impl std::error::Error for InvalidAssociation {}

impl core::fmt::Display for InvalidAssociation {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid association: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid association (configuration) error.
    pub fn invalid_association(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidAssociation(InvalidAssociation {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error, or any error it wraps, is an invalid
    /// association error.
    pub fn is_invalid_association(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidAssociation(_)))
    }
}
