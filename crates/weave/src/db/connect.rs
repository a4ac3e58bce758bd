use crate::{Config, Result};

use std::sync::Arc;
use tokio::sync::watch;
use weave_core::{
    driver::operation::{SyncSchema, Transaction},
    Driver, Error, Registry,
};

/// Connects and syncs the schema, retrying after `config.retry_timeout`
/// until it succeeds. Readiness is published once, on success.
pub(super) async fn connect_and_sync(
    driver: Arc<dyn Driver>,
    registry: Arc<Registry>,
    config: Config,
    ready: watch::Sender<bool>,
) {
    let mut attempt = 0_u64;

    loop {
        attempt += 1;

        match attempt_once(&*driver, &registry, &config).await {
            Ok(()) => {
                tracing::debug!(attempt, "database connected and synced");
                ready.send_replace(true);
                return;
            }
            Err(err) => {
                let err = if err.is_connection_failed() {
                    err
                } else {
                    Error::connection_failed(err)
                };

                tracing::warn!(
                    attempt,
                    retry_in_ms = config.retry_timeout,
                    error = %err,
                    "could not connect to the database"
                );

                tokio::time::sleep(config.retry_delay()).await;
            }
        }
    }
}

async fn attempt_once(driver: &dyn Driver, registry: &Arc<Registry>, config: &Config) -> Result<()> {
    driver.connect(&config.connection).await?;
    driver.exec(registry, Transaction::Start.into()).await?;

    let synced = async {
        let sync = SyncSchema {
            force: config.sync.force,
            alter: config.sync.alter,
        };
        driver.exec(registry, sync.into()).await?;
        driver.exec(registry, Transaction::Commit.into()).await?;
        Ok::<_, Error>(())
    }
    .await;

    if synced.is_err() {
        if let Err(err) = driver.exec(registry, Transaction::Rollback.into()).await {
            tracing::warn!(error = %err, "rollback after a failed sync failed");
        }
    }

    synced
}
