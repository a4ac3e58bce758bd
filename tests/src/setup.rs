//! Shared schemas and database setup.

use crate::{LoggingDriver, OpsLog};

use weave::{
    db::Builder,
    schema::{AssociationOptions, Attribute, AttributeType, Transform},
    AssociationKind, Db, SchemaDefinition,
};
use weave_driver_memory::Memory;

/// The shop schema: customers place orders made of items, items are tagged
/// through the `ItemTag` join table.
pub fn shop() -> Builder {
    let mut builder = Db::builder();

    builder
        .register(
            "Customer",
            SchemaDefinition::new()
                .attribute("id", Attribute::id())
                .attribute("name", Attribute::new(AttributeType::String)),
        )
        .register(
            "Order",
            SchemaDefinition::new()
                .attribute("id", Attribute::id())
                .attribute("number", Attribute::new(AttributeType::String).unique())
                .attribute("total", Attribute::new(AttributeType::Integer))
                .association(AssociationKind::OneToMany, "Customer"),
        )
        .register(
            "Item",
            SchemaDefinition::new()
                .attribute("id", Attribute::id())
                .attribute(
                    "sku",
                    Attribute::new(AttributeType::String)
                        .transform(Transform::Trim)
                        .transform(Transform::Uppercase),
                )
                .attribute(
                    "quantity",
                    Attribute::new(AttributeType::Integer).not_null(),
                )
                .association(AssociationKind::OneToMany, "Order")
                .association(
                    AssociationKind::ManyToMany,
                    ("Tag", AssociationOptions::new().through("ItemTag")),
                ),
        )
        .register(
            "Tag",
            SchemaDefinition::new()
                .attribute("id", Attribute::id())
                .attribute("name", Attribute::new(AttributeType::String).unique()),
        );

    builder
}

/// Builds the database on an in-memory driver and waits until it is ready.
/// The returned driver handle shares the database's tables.
pub async fn build(builder: &mut Builder) -> (Db, Memory) {
    let driver = Memory::new();
    let db = builder.build(driver.clone()).await.unwrap();
    db.ready().await.unwrap();
    (db, driver)
}

/// Like [`build`], logging every operation executed after the database
/// became ready.
pub async fn build_logged(builder: &mut Builder) -> (Db, Memory, OpsLog) {
    let driver = Memory::new();
    let logging = LoggingDriver::new(driver.clone());
    let ops = logging.ops_log_handle();

    let db = builder.build(logging).await.unwrap();
    db.ready().await.unwrap();

    // Drop the connect-and-sync operations
    ops.lock().unwrap().clear();
    (db, driver, ops)
}
