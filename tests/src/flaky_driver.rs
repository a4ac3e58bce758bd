use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use weave_core::{
    async_trait,
    driver::{Driver, Operation, Response},
    Error, Registry, Result, Value,
};

/// A driver whose first `failures` connection attempts fail.
#[derive(Debug)]
pub struct FlakyDriver {
    inner: Box<dyn Driver>,
    failures: usize,
    attempts: Arc<AtomicUsize>,
}

impl FlakyDriver {
    pub fn new(driver: impl Driver, failures: usize) -> Self {
        Self {
            inner: Box::new(driver),
            failures,
            attempts: Arc::default(),
        }
    }

    /// Number of `connect` calls so far, shared with the driver once it
    /// moved into a `Db`.
    pub fn attempts_handle(&self) -> Arc<AtomicUsize> {
        self.attempts.clone()
    }
}

#[async_trait]
impl Driver for FlakyDriver {
    async fn register_schema(&mut self, registry: &Registry) -> Result<()> {
        self.inner.register_schema(registry).await
    }

    async fn connect(&self, options: &Value) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if attempt <= self.failures {
            return Err(Error::connection_failed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("connection refused (attempt {attempt})"),
            )));
        }

        self.inner.connect(options).await
    }

    async fn exec(&self, registry: &Arc<Registry>, operation: Operation) -> Result<Response> {
        self.inner.exec(registry, operation).await
    }
}
