use super::{connect, Db, Shared};
use crate::{schema_file, Config, Result};

use std::sync::Arc;
use tokio::sync::watch;
use weave_core::{schema::SchemaDefinition, Driver, Registry};

#[derive(Debug, Default)]
pub struct Builder {
    config: Config,

    /// Schema definitions in registration order
    definitions: Vec<(String, SchemaDefinition)>,
}

impl Builder {
    pub fn config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    /// Queue a schema definition for registration under `name`.
    pub fn register(&mut self, name: impl Into<String>, definition: SchemaDefinition) -> &mut Self {
        self.definitions.push((name.into(), definition));
        self
    }

    /// Queue every schema file found in the configured schema directory.
    pub fn load_schemas_dir(&mut self) -> Result<&mut Self> {
        let dir = self.config.schemas_dir.clone();

        for name in schema_file::discover_schemas(&dir)? {
            let definition = schema_file::load_schema(&dir, &name)?;
            tracing::debug!(schema = %name, dir = %dir.display(), "loaded schema file");
            self.definitions.push((name, definition));
        }

        Ok(self)
    }

    /// Registers the queued definitions and wires their associations.
    pub fn build_registry(&self) -> Result<Registry> {
        let mut registry = Registry::new(self.config.define.clone());

        for (name, definition) in &self.definitions {
            let id = registry.register_model(name, definition.clone());
            tracing::debug!(model = %name, id = id.0, "registered model");
        }

        registry.wire_all_associations()?;
        Ok(registry)
    }

    /// Builds the registry, hands it to the driver and starts the
    /// connect-and-sync loop in the background. Use [`Db::ready`] to wait
    /// for it.
    pub async fn build(&mut self, mut driver: impl Driver) -> Result<Db> {
        let registry = self.build_registry()?;
        driver.register_schema(&registry).await?;

        let registry = Arc::new(registry);
        let driver: Arc<dyn Driver> = Arc::new(driver);
        let (ready_tx, ready) = watch::channel(false);

        let connect_task = tokio::spawn(connect::connect_and_sync(
            driver.clone(),
            registry.clone(),
            self.config.clone(),
            ready_tx,
        ));

        Ok(Db {
            shared: Arc::new(Shared {
                registry,
                driver,
                config: self.config.clone(),
                ready,
                connect_task,
            }),
        })
    }
}
