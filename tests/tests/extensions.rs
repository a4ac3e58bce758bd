use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use tests::prelude::*;
use weave::{
    schema::{HookKind, Transform},
    Attribute, AttributeType, SchemaDefinition,
};

type Log = Arc<Mutex<Vec<String>>>;

fn hooked(log: &Log) -> SchemaDefinition {
    let hook = |kind: HookKind, log: &Log| {
        let log = log.clone();
        move |_row: &mut weave::Row| -> weave::Result<()> {
            log.lock().unwrap().push(format!("{kind:?}"));
            Ok(())
        }
    };

    SchemaDefinition::new()
        .attribute("id", Attribute::id())
        .attribute(
            "name",
            Attribute::new(AttributeType::String).transform(Transform::Trim),
        )
        .attribute("slug", Attribute::new(AttributeType::String))
        .hook(HookKind::BeforeSave, |row| {
            let slug = row
                .get("name")
                .and_then(Value::as_str)
                .map(|name| name.to_lowercase().replace(' ', "-"));
            if let Some(slug) = slug {
                row.insert("slug".to_string(), slug.into());
            }
            Ok(())
        })
        .hook(HookKind::BeforeSave, hook(HookKind::BeforeSave, log))
        .hook(HookKind::BeforeCreate, hook(HookKind::BeforeCreate, log))
        .hook(HookKind::AfterCreate, hook(HookKind::AfterCreate, log))
        .hook(HookKind::AfterSave, hook(HookKind::AfterSave, log))
        .method("greeting", |row, args| {
            let name = row.get("name").and_then(Value::as_str).unwrap_or("nobody");
            let punctuation = args.first().and_then(Value::as_str).unwrap_or(".");
            Ok(format!("Hello, {name}{punctuation}").into())
        })
        .static_method("table", |_| Ok("category".into()))
}

async fn setup(log: &Log) -> Db {
    let mut builder = Db::builder();
    builder.register("Category", hooked(log));
    build(&mut builder).await.0
}

#[tokio::test]
async fn hooks_run_around_insert_and_update() {
    let log = Log::default();
    let db = setup(&log).await;

    let mut category = db
        .model("Category")
        .unwrap()
        .create(json!({"name": " Home Office "}))
        .await
        .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        ["BeforeSave", "BeforeCreate", "AfterCreate", "AfterSave"]
    );
    assert_eq!(category.get("slug"), Some(&json!("home-office")));

    log.lock().unwrap().clear();
    category.set("name", "Garden").unwrap();
    category.deep_save(None).await.unwrap();

    assert_eq!(*log.lock().unwrap(), ["BeforeSave", "AfterSave"]);
    assert_eq!(category.get("slug"), Some(&json!("garden")));
}

#[tokio::test]
async fn failing_hook_aborts_the_save() {
    let mut builder = Db::builder();
    builder.register(
        "Category",
        SchemaDefinition::new()
            .attribute("id", Attribute::id())
            .hook(HookKind::BeforeCreate, |_| {
                Err(weave_core::err!("categories are read-only"))
            }),
    );
    let (db, driver) = build(&mut builder).await;

    let err = db
        .model("Category")
        .unwrap()
        .create(json!({}))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "while saving `Category`: categories are read-only"
    );
    assert!(driver.rows("category").is_empty());
}

#[tokio::test]
async fn instance_and_static_methods() {
    let db = setup(&Log::default()).await;
    let categories = db.model("Category").unwrap();

    let category = categories.build(json!({"name": "Books"})).await.unwrap();
    assert_eq!(
        category.call("greeting", &[json!("!")]).unwrap(),
        json!("Hello, Books!")
    );
    assert_eq!(categories.call_static("table", &[]).unwrap(), json!("category"));

    let err = category.call("missing", &[]).unwrap_err();
    assert_eq!(err.to_string(), "model `Category` has no method `missing`");
}
