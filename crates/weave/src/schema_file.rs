//! Discovery and loading of schema files.
//!
//! A schema file is a TOML document named after the model it declares, for
//! example `schemas/Post.toml`:
//!
//! ```toml
//! [attributes.id]
//! type = "integer"
//! primary_key = true
//! auto = "increment"
//!
//! [attributes.title]
//! type = "string"
//! transforms = ["trim"]
//!
//! [associations]
//! oneToMany = ["User"]
//! manyToMany = [["Tag", { through = "PostTag" }]]
//! ```

use crate::Result;

use std::path::Path;
use weave_core::{schema::SchemaDefinition, Error};

/// Extension of schema files
pub const EXTENSION: &str = "toml";

/// Lists the schema names in `dir`, sorted. Only regular files with the
/// schema extension are considered; subdirectories are not descended into.
pub fn discover_schemas(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .map_err(|err| Error::from(err).context(weave_core::err!("reading {}", dir.display())))?;

    let mut names = vec![];

    for entry in entries {
        let path = entry?.path();

        if !path.is_file() || !path.extension().is_some_and(|ext| ext == EXTENSION) {
            continue;
        }

        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            names.push(stem.to_string());
        }
    }

    names.sort();
    Ok(names)
}

/// Reads and parses `<dir>/<name>.toml`, remembering the path as the
/// definition's source.
pub fn load_schema(dir: impl AsRef<Path>, name: &str) -> Result<SchemaDefinition> {
    let path = dir.as_ref().join(format!("{name}.{EXTENSION}"));

    let src = std::fs::read_to_string(&path)
        .map_err(|err| Error::from(err).context(weave_core::err!("reading {}", path.display())))?;

    let definition: SchemaDefinition = toml::from_str(&src).map_err(|err| {
        Error::from(anyhow::Error::from(err))
            .context(weave_core::err!("parsing schema `{name}` at {}", path.display()))
    })?;

    Ok(definition.source(path))
}
