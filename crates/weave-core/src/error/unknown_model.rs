use super::Error;

/// Error when a name does not match any registered model.
#[derive(Debug)]
pub(super) struct UnknownModel {
    name: Box<str>,
    known: Vec<String>,
}

impl std::error::Error for UnknownModel {}

impl core::fmt::Display for UnknownModel {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "there is no model named `{}`, registered models are: {}",
            self.name,
            self.known.join(", ")
        )
    }
}

impl Error {
    /// Creates an unknown model (reference) error listing every registered
    /// model name.
    pub fn unknown_model<I>(name: &str, known: I) -> Error
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Error::from(super::ErrorKind::UnknownModel(UnknownModel {
            name: name.into(),
            known: known.into_iter().map(Into::into).collect(),
        }))
    }

    pub fn is_unknown_model(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::UnknownModel(_)))
    }
}
