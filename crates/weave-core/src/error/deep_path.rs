use super::Error;

/// Context layer naming the instance, by its position in a hydrated graph,
/// whose persistence failed.
#[derive(Debug)]
pub(super) struct DeepPath {
    path: Box<str>,
}

impl std::error::Error for DeepPath {}

impl core::fmt::Display for DeepPath {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "while saving `{}`", self.path)
    }
}

impl Error {
    /// Creates a deep-path context layer, meant to be passed to
    /// [`Error::context`].
    pub fn deep_path(path: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DeepPath(DeepPath {
            path: path.into().into(),
        }))
    }

    /// Deep path of the instance that originated the failure, i.e. the
    /// innermost deep-path layer of the chain.
    pub fn origin_path(&self) -> Option<&str> {
        self.deep_paths().last()
    }

    /// Every deep-path layer of the chain, outermost (root instance) first.
    pub fn deep_paths(&self) -> impl Iterator<Item = &str> {
        self.chain().filter_map(|err| match err.kind() {
            super::ErrorKind::DeepPath(layer) => Some(&*layer.path),
            _ => None,
        })
    }
}
