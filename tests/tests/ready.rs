use std::{sync::atomic::Ordering, time::Duration};
use tests::prelude::*;
use weave::{Config, SyncOptions};

fn fast_retry() -> Config {
    Config::new().retry_timeout(Duration::from_millis(10))
}

#[tokio::test]
async fn ready_after_failed_connection_attempts() {
    weave::logging::init();

    let driver = FlakyDriver::new(Memory::new(), 2);
    let attempts = driver.attempts_handle();

    let mut builder = shop();
    builder.config(fast_retry());
    let db = builder.build(driver).await.unwrap();

    db.ready().await.unwrap();
    assert!(db.is_ready());
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn readiness_stays_pending_while_connecting_fails() {
    let driver = FlakyDriver::new(Memory::new(), usize::MAX);
    let attempts = driver.attempts_handle();

    let mut builder = shop();
    builder.config(fast_retry());
    let db = builder.build(driver).await.unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(100), db.ready()).await;
    assert!(waited.is_err());
    assert!(!db.is_ready());
    assert!(attempts.load(Ordering::SeqCst) > 1);
}

#[tokio::test]
async fn connect_syncs_inside_a_transaction() {
    let driver = Memory::new();
    let logging = LoggingDriver::new(driver.clone());
    let ops = logging.ops_log_handle();

    let mut builder = shop();
    builder.config(Config::new().sync(SyncOptions {
        force: true,
        alter: false,
    }));
    let db = builder.build(logging).await.unwrap();
    db.ready().await.unwrap();

    let names: Vec<_> = ops
        .lock()
        .unwrap()
        .iter()
        .map(|op| op.operation.name())
        .collect();
    assert_eq!(names, ["transaction", "sync_schema", "transaction"]);

    assert!(driver.is_connected());
    assert_eq!(driver.tables(), ["customer", "order", "item", "ItemTag", "tag"]);
}

#[tokio::test]
async fn connection_options_reach_the_driver() {
    let mut builder = shop();
    builder.config(
        Config::new()
            .merge(json!({"connectionOptions": {"host": "db.internal"}}))
            .unwrap(),
    );

    let (db, _) = build(&mut builder).await;
    assert_eq!(db.config().connection, json!({"host": "db.internal"}));
}
