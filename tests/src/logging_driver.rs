use std::sync::{Arc, Mutex};
use weave_core::{
    async_trait,
    driver::{Driver, Operation, Response},
    Registry, Result, Value,
};

/// Shared log of the operations executed through a [`LoggingDriver`]
pub type OpsLog = Arc<Mutex<Vec<DriverOp>>>;

/// A driver wrapper that logs all operations for testing purposes
#[derive(Debug)]
pub struct LoggingDriver {
    /// The underlying driver that actually executes operations
    inner: Box<dyn Driver>,

    /// Log of all operations executed through this driver
    ops_log: OpsLog,
}

#[derive(Debug, Clone)]
pub struct DriverOp {
    pub operation: Operation,
    pub response: Response,
}

impl LoggingDriver {
    pub fn new(driver: impl Driver) -> Self {
        Self {
            inner: Box::new(driver),
            ops_log: OpsLog::default(),
        }
    }

    /// Get a handle to access the operations log
    pub fn ops_log_handle(&self) -> OpsLog {
        self.ops_log.clone()
    }
}

#[async_trait]
impl Driver for LoggingDriver {
    async fn register_schema(&mut self, registry: &Registry) -> Result<()> {
        self.inner.register_schema(registry).await
    }

    async fn connect(&self, options: &Value) -> Result<()> {
        self.inner.connect(options).await
    }

    async fn exec(&self, registry: &Arc<Registry>, operation: Operation) -> Result<Response> {
        let response = self.inner.exec(registry, operation.clone()).await?;

        self.ops_log
            .lock()
            .expect("Failed to acquire ops log lock")
            .push(DriverOp {
                operation,
                response: response.clone(),
            });

        Ok(response)
    }
}
