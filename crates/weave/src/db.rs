mod builder;
pub use builder::Builder;

mod connect;

use crate::{Config, ModelHandle, Result};

use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use weave_core::{
    driver::{Operation, Response},
    Driver, Registry,
};

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    registry: Arc<Registry>,
    driver: Arc<dyn Driver>,
    config: Config,

    /// Flips to `true` once the connect-and-sync loop succeeded
    ready: watch::Receiver<bool>,

    /// The connect-and-sync loop, stopped when the last handle drops
    connect_task: JoinHandle<()>,
}

/// A database handle: the registered models plus the driver they persist
/// through. Cloning is cheap.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.shared.registry
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.shared.driver
    }

    /// Resolves once the database is connected and its schema synced.
    ///
    /// Connection failures are retried indefinitely, so this only returns an
    /// error if the connect-and-sync loop stopped without succeeding.
    pub async fn ready(&self) -> Result<()> {
        let mut ready = self.shared.ready.clone();
        ready
            .wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| weave_core::err!("the connect-and-sync loop stopped before the database was ready"))
    }

    pub fn is_ready(&self) -> bool {
        *self.shared.ready.borrow()
    }

    /// Returns a handle to the model registered under `name`.
    pub fn model(&self, name: &str) -> Result<ModelHandle> {
        let model = self.shared.registry.model_by_name(name)?;
        Ok(ModelHandle::new(self.clone(), model.id))
    }

    /// Execute a driver operation
    pub async fn exec(&self, op: impl Into<Operation>) -> Result<Response> {
        let op = op.into();
        tracing::trace!(op = op.name(), "exec");
        self.shared.driver.exec(&self.shared.registry, op).await
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.connect_task.abort();
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("models", &self.shared.registry.names().collect::<Vec<_>>())
            .field("driver", &self.shared.driver)
            .field("ready", &self.is_ready())
            .finish()
    }
}
