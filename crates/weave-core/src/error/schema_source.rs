use super::Error;

/// Context layer pointing at the schema declaration that failed to wire.
#[derive(Debug)]
pub(super) struct SchemaSource {
    schema: Box<str>,
    location: Box<str>,
    declaration: Box<str>,
}

impl std::error::Error for SchemaSource {}

impl core::fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "schema `{}` at {}, associations with {}",
            self.schema, self.location, self.declaration
        )
    }
}

impl Error {
    /// Creates a context layer naming the declaring schema, where it was
    /// defined, and the offending association declaration.
    pub fn schema_source(schema: &str, location: &str, declaration: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::SchemaSource(SchemaSource {
            schema: schema.into(),
            location: location.into(),
            declaration: declaration.into().into(),
        }))
    }

    /// Returns the declaring schema name when this error went through
    /// association wiring.
    pub fn schema_name(&self) -> Option<&str> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::SchemaSource(source) => Some(&*source.schema),
            _ => None,
        })
    }
}
