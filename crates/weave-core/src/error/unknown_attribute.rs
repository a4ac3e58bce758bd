use super::Error;

/// Error raised by a strict `fill` when a key is neither an attribute nor an
/// association of the model.
#[derive(Debug)]
pub(super) struct UnknownAttribute {
    model: Box<str>,
    attribute: Box<str>,
}

impl std::error::Error for UnknownAttribute {}

impl core::fmt::Display for UnknownAttribute {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "model `{}` has no attribute or association named `{}`",
            self.model, self.attribute
        )
    }
}

impl Error {
    pub fn unknown_attribute(model: &str, attribute: &str) -> Error {
        Error::from(super::ErrorKind::UnknownAttribute(UnknownAttribute {
            model: model.into(),
            attribute: attribute.into(),
        }))
    }

    pub fn is_unknown_attribute(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::UnknownAttribute(_)))
    }
}
