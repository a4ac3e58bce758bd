mod config;
pub use config::{Config, FillMode, SyncOptions};

pub mod db;
pub use db::Db;

mod instance;
pub use instance::{EdgeContext, Input, Instance, Related};

pub mod logging;

mod model;
pub use model::ModelHandle;

mod persistable;
pub use persistable::Persistable;

pub mod schema_file;

pub use weave_core::{
    driver,
    schema::{self, AssociationKind, AssociationOptions, Attribute, AttributeType, SchemaDefinition},
    Driver, Error, Registry, Row, Value,
};

/// A Result type alias that uses weave's [`Error`] type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

pub use async_trait::async_trait;
