mod response;
pub use response::{Response, Rows};

pub mod operation;
pub use operation::Operation;

use crate::{async_trait, schema::Registry, Value};

use std::{fmt::Debug, sync::Arc};

/// The persistence primitives the registry and the deep-save algorithm are
/// built on.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Register the models, and their association edges, with the driver.
    async fn register_schema(&mut self, registry: &Registry) -> crate::Result<()>;

    /// Establish the connection described by the opaque connection options.
    ///
    /// Called by the connect-and-sync loop before every attempt.
    async fn connect(&self, options: &Value) -> crate::Result<()>;

    /// Execute a database operation
    async fn exec(&self, registry: &Arc<Registry>, op: Operation) -> crate::Result<Response>;
}
