use pretty_assertions::assert_eq;
use std::path::Path;
use tests::prelude::*;
use weave::{schema::Relation, Config};

fn write(dir: &Path, name: &str, src: &str) {
    std::fs::write(dir.join(format!("{name}.toml")), src).unwrap();
}

const USER: &str = r#"
[attributes.id]
type = "integer"
primary_key = true
auto = "increment"

[attributes.email]
type = "string"
unique = true
transforms = ["trim", "lowercase"]
"#;

const POST: &str = r#"
[attributes.id]
type = "integer"
primary_key = true
auto = "increment"

[attributes.title]
type = "string"

[associations]
oneToMany = ["User"]
manyToMany = [["Tag", { through = "PostTag" }]]
"#;

const TAG: &str = r#"
[attributes.id]
type = "integer"
primary_key = true
auto = "increment"

[attributes.name]
type = "string"

[associations]
manyToMany = ["Post"]
"#;

fn schemas() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "User", USER);
    write(dir.path(), "Post", POST);
    write(dir.path(), "Tag", TAG);
    dir
}

fn builder(dir: &Path) -> weave::db::Builder {
    let mut builder = Db::builder();
    builder.config(Config::new().schemas_dir(dir));
    builder.load_schemas_dir().unwrap();
    builder
}

#[tokio::test]
async fn loads_and_wires_schema_files() {
    let dir = schemas();
    let (db, _) = build(&mut builder(dir.path())).await;

    let registry = db.registry();
    assert_eq!(registry.names().collect::<Vec<_>>(), ["Post", "Tag", "User"]);

    let post = registry.model_by_name("Post").unwrap();
    assert_eq!(post.table_name, "post");
    assert_eq!(post.source.as_deref(), Some(dir.path().join("Post.toml").as_path()));
    assert_eq!(post.association("user").unwrap().relation, Relation::BelongsTo);

    let tags = post.association("tags").unwrap();
    assert_eq!(tags.through_name(), Some("PostTag"));

    // `Tag` declares the same association without a through table and
    // inherits `PostTag`
    let tag = registry.model_by_name("Tag").unwrap();
    let posts = tag.association("posts").unwrap();
    assert_eq!(posts.relation, Relation::BelongsToMany);
    assert_eq!(posts.through_name(), Some("PostTag"));

    let user = registry.model_by_name("User").unwrap();
    assert_eq!(user.association("posts").unwrap().relation, Relation::HasMany);
}

#[tokio::test]
async fn graph_saves_through_file_schemas() {
    let dir = schemas();
    let (db, driver) = build(&mut builder(dir.path())).await;

    let post = db
        .model("Post")
        .unwrap()
        .create(json!({
            "title": "hello",
            "user": {"email": "  Ann@Example.com "},
            "tags": [{"name": "rust", "PostTag": {}}, {"name": "orm"}],
        }))
        .await
        .unwrap();

    assert_eq!(post.get("user_id"), Some(&json!(1)));
    assert_eq!(driver.rows("user")[0]["email"], json!("ann@example.com"));
    assert_eq!(driver.rows("PostTag").len(), 2);
    assert_eq!(post.related("tags").unwrap().len(), 2);
}

#[tokio::test]
async fn conflicting_through_tables_abort_build() {
    let dir = schemas();
    write(
        dir.path(),
        "Tag",
        &TAG.replace(r#"manyToMany = ["Post"]"#, r#"manyToMany = [["Post", { through = "Labels" }]]"#),
    );

    let err = builder(dir.path())
        .build(Memory::new())
        .await
        .unwrap_err();

    assert!(err.is_invalid_association());
    assert_eq!(err.schema_name(), Some("Tag"));
    assert!(err.to_string().contains("Tag.toml"), "{err}");
}

#[tokio::test]
async fn unknown_target_aborts_build() {
    let dir = schemas();
    write(dir.path(), "Post", &POST.replace(r#"["User"]"#, r#"["Usr"]"#));

    let err = builder(dir.path())
        .build(Memory::new())
        .await
        .unwrap_err();

    assert!(err.is_unknown_model());
    assert_eq!(err.schema_name(), Some("Post"));
}

#[tokio::test]
async fn malformed_schema_file_names_the_file() {
    let dir = schemas();
    write(dir.path(), "Bad", "attributes = 3");

    let mut builder = Db::builder();
    builder.config(Config::new().schemas_dir(dir.path()));
    let err = builder.load_schemas_dir().unwrap_err();

    assert!(err.to_string().starts_with("parsing schema `Bad` at "), "{err}");
}
