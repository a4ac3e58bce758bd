use pretty_assertions::assert_eq;
use tests::prelude::*;
use weave::{driver::Operation, EdgeContext};
use weave_core::value::row_from_value;

fn row(value: Value) -> weave::Row {
    row_from_value(value).unwrap()
}

fn order_graph() -> Value {
    json!({
        "number": "A-1",
        "customer": {"name": "ann"},
        "items": [
            {"sku": "ab", "quantity": 2, "tags": [{"name": "new", "ItemTag": {"note": "x"}}]},
            {"sku": "cd", "quantity": 1},
        ],
    })
}

#[tokio::test]
async fn create_persists_the_whole_graph() {
    let (db, driver) = build(&mut shop()).await;

    let order = db
        .model("Order")
        .unwrap()
        .create(order_graph())
        .await
        .unwrap();

    assert!(order.is_persisted());
    assert_eq!(order.get("id"), Some(&json!(1)));
    assert_eq!(order.get("customer_id"), Some(&json!(1)));
    assert!(order.pending().is_empty());

    assert_eq!(
        driver.rows("order"),
        [row(json!({"id": 1, "number": "A-1", "total": null, "customer_id": 1}))]
    );
    assert_eq!(
        driver.rows("customer"),
        [row(json!({"id": 1, "name": "ann"}))]
    );
    assert_eq!(
        driver.rows("item"),
        [
            row(json!({"id": 1, "sku": "AB", "quantity": 2, "order_id": 1})),
            row(json!({"id": 2, "sku": "CD", "quantity": 1, "order_id": 1})),
        ]
    );
    assert_eq!(driver.rows("tag"), [row(json!({"id": 1, "name": "new"}))]);
    assert_eq!(
        driver.rows("ItemTag"),
        [row(json!({"note": "x", "item_id": 1, "tag_id": 1}))]
    );
}

#[tokio::test]
async fn items_are_linked_after_both_are_persisted() {
    let (db, driver, ops) = build_logged(&mut shop()).await;

    let mut order = db.model("Order").unwrap().new_instance();
    let values = json!({
        "total": 100,
        "items": [{"sku": "X", "quantity": 1}, {"sku": "Y", "quantity": 1}],
    });
    order.fill_and_save(values.into()).await.unwrap();

    assert_eq!(driver.rows("order")[0]["total"], json!(100));

    let items = driver.rows("item");
    let skus: Vec<_> = items.iter().map(|item| &item["sku"]).collect();
    assert_eq!(skus, [&json!("X"), &json!("Y")]);
    assert!(items.iter().all(|item| item["order_id"] == json!(1)));

    let ops = ops.lock().unwrap();
    let names: Vec<_> = ops.iter().map(|op| op.operation.name()).collect();
    assert_eq!(
        names,
        ["insert", "create_related", "create_related", "set_association"]
    );
}

#[tokio::test]
async fn refilling_a_created_instance_keeps_its_values() {
    let (db, _) = build(&mut shop()).await;
    let data = json!({"sku": "ab", "quantity": 3, "gift": true});

    let order = db
        .model("Order")
        .unwrap()
        .create(json!({"number": "A-1"}))
        .await
        .unwrap();

    let mut item = order.create_related("items", data.clone()).await.unwrap();
    let values = item.values().clone();

    item.fill(data.into()).await.unwrap();
    assert_eq!(item.values(), &values);
    assert_eq!(item.changed().count(), 0);
    assert_eq!(item.extras().get("gift"), Some(&json!(true)));
}

#[tokio::test]
async fn persisted_children_become_loaded_associations() {
    let (db, _) = build(&mut shop()).await;

    let order = db
        .model("Order")
        .unwrap()
        .create(order_graph())
        .await
        .unwrap();

    let items = order.related("items").unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(Instance::is_persisted));
    assert_eq!(items.as_many().unwrap()[1].deep_path(), "Order.items[1]");

    let customer = order.related("customer").unwrap().as_one().unwrap();
    assert_eq!(customer.get("id"), Some(&json!(1)));

    let first = &items.as_many().unwrap()[0];
    let tag = first.related("tags").unwrap().as_many().unwrap();
    assert_eq!(tag[0].get("name"), Some(&json!("new")));
    assert_eq!(tag[0].extras().get("ItemTag"), Some(&json!({"note": "x"})));
}

#[tokio::test]
async fn children_are_created_through_the_parent_then_linked() {
    let (db, _, ops) = build_logged(&mut shop()).await;

    db.model("Order")
        .unwrap()
        .create(json!({"number": "A-1", "items": [{"sku": "a", "quantity": 1}]}))
        .await
        .unwrap();

    let ops = ops.lock().unwrap();
    let names: Vec<_> = ops.iter().map(|op| op.operation.name()).collect();
    assert_eq!(names, ["insert", "create_related", "set_association"]);

    let Operation::CreateRelated(create) = &ops[1].operation else {
        panic!("expected create_related, got {:#?}", ops[1].operation);
    };
    assert_eq!(create.association, "items");
    assert_eq!(create.key, row(json!({"id": 1})));

    let Operation::SetAssociation(link) = &ops[2].operation else {
        panic!("expected set_association, got {:#?}", ops[2].operation);
    };
    assert_eq!(link.association, "items");
    assert_eq!(link.targets.len(), 1);
    assert_eq!(link.targets[0].key, row(json!({"id": 1})));
}

#[tokio::test]
async fn root_save_never_uses_create_related() {
    let (db, _, ops) = build_logged(&mut shop()).await;

    let mut item = db.model("Item").unwrap().new_instance();
    item.fill_and_save(json!({"sku": "a", "quantity": 1}).into())
        .await
        .unwrap();

    let ops = ops.lock().unwrap();
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0].operation, Operation::Insert(_)));
}

#[tokio::test]
async fn existing_instances_are_linked_not_created() {
    let (db, driver) = build(&mut shop()).await;

    let tag = db
        .model("Tag")
        .unwrap()
        .create(json!({"name": "sale"}))
        .await
        .unwrap();

    let item = db
        .model("Item")
        .unwrap()
        .create(Input::object([
            ("sku", Input::from(json!("a"))),
            ("quantity", Input::from(json!(3))),
            ("tags", Input::from(vec![tag])),
        ]))
        .await
        .unwrap();

    assert_eq!(driver.rows("tag").len(), 1);
    assert_eq!(
        driver.rows("ItemTag"),
        [row(json!({"item_id": item.get("id").unwrap(), "tag_id": 1}))]
    );
}

#[tokio::test]
async fn saving_again_updates_changed_attributes_only() {
    let (db, driver, ops) = build_logged(&mut shop()).await;

    let mut customer = db
        .model("Customer")
        .unwrap()
        .create(json!({"name": "ann"}))
        .await
        .unwrap();

    customer.deep_save(None).await.unwrap();
    assert_eq!(ops.lock().unwrap().len(), 1);

    customer.set("name", "bea").unwrap();
    assert_eq!(customer.changed().collect::<Vec<_>>(), ["name"]);
    customer.deep_save(None).await.unwrap();

    let ops = ops.lock().unwrap();
    let Operation::Update(update) = &ops[1].operation else {
        panic!("expected update, got {:#?}", ops[1].operation);
    };
    assert_eq!(update.values, row(json!({"name": "bea"})));
    assert_eq!(customer.changed().count(), 0);
    assert_eq!(driver.rows("customer")[0]["name"], json!("bea"));
}

#[tokio::test]
async fn failures_carry_the_deep_path() {
    let (db, _) = build(&mut shop()).await;

    let err = db
        .model("Order")
        .unwrap()
        .create(json!({
            "number": "A-1",
            "items": [{"sku": "a", "quantity": 1}, {"sku": "b"}],
        }))
        .await
        .unwrap_err();

    assert!(err.is_driver_operation_failed());
    assert_eq!(err.origin_path(), Some("Order.items[1]"));
    assert_eq!(
        err.to_string(),
        "while saving `Order`: while saving `Order.items[1]`: `item.quantity` cannot be null"
    );
}

#[tokio::test]
async fn failures_are_not_rolled_back() {
    let (db, driver) = build(&mut shop()).await;

    db.model("Order")
        .unwrap()
        .create(json!({"number": "A-1", "items": [{"sku": "b"}]}))
        .await
        .unwrap_err();

    assert_eq!(driver.rows("order").len(), 1);
    assert!(driver.rows("item").is_empty());
}

#[tokio::test]
async fn failed_save_keeps_pending_children_for_a_retry() {
    let (db, driver) = build(&mut shop()).await;

    let mut order = db.model("Order").unwrap().new_instance();
    order
        .fill(json!({"number": "A-1", "items": [{"sku": "b"}]}).into())
        .await
        .unwrap();
    order.deep_save(None).await.unwrap_err();

    assert!(order.is_persisted());
    assert_eq!(order.pending().len(), 1);
    assert!(driver.rows("item").is_empty());

    order
        .fill(json!({"items": [{"sku": "b", "quantity": 2}]}).into())
        .await
        .unwrap();
    assert_eq!(order.pending().len(), 1);
    order.deep_save(None).await.unwrap();

    assert!(order.pending().is_empty());
    assert_eq!(driver.rows("order").len(), 1);
    // The failed insert consumed the first id
    assert_eq!(
        driver.rows("item"),
        [row(json!({"id": 2, "sku": "B", "quantity": 2, "order_id": 1}))]
    );
}

#[tokio::test]
async fn retry_does_not_recreate_stored_children() {
    let (db, driver) = build(&mut shop()).await;

    let mut order = db.model("Order").unwrap().new_instance();
    order
        .fill(json!({"number": "A-1", "items": [{"sku": "a", "quantity": 1}, {"sku": "b"}]}).into())
        .await
        .unwrap();
    order.deep_save(None).await.unwrap_err();

    let items = order.pending()[0].1.as_many().unwrap();
    assert!(items[0].is_persisted());
    assert_eq!(items[0].get("id"), Some(&json!(1)));
    assert!(!items[1].is_persisted());

    let err = order.deep_save(None).await.unwrap_err();
    assert_eq!(err.origin_path(), Some("Order.items[1]"));
    assert_eq!(driver.rows("item").len(), 1);
}

#[tokio::test]
async fn saving_through_an_edge_to_another_model_is_rejected() {
    let (db, driver) = build(&mut shop()).await;

    let customer = db
        .model("Customer")
        .unwrap()
        .create(json!({"name": "ann"}))
        .await
        .unwrap();

    let mut item = db
        .model("Item")
        .unwrap()
        .build(json!({"sku": "a", "quantity": 1}))
        .await
        .unwrap();

    let cx = EdgeContext {
        association: "orders",
        parent: &customer,
    };
    let err = item.deep_save(Some(cx)).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "while saving `Item`: validation failed: `Item` cannot be saved through \
         `Customer.orders`, which holds `Order` records"
    );
    assert!(driver.rows("order").is_empty());
    assert!(driver.rows("item").is_empty());
    assert_eq!(item.get("sku"), Some(&json!("A")));
    assert_eq!(item.is_new_record(), Some(true));
}

#[tokio::test]
async fn create_related_requires_a_persisted_parent() {
    let (db, _) = build(&mut shop()).await;

    let order = db.model("Order").unwrap().new_instance();
    let err = order
        .create_related("items", json!({"sku": "a", "quantity": 1}))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "`Order` must be saved before using its `items` association"
    );
}

#[tokio::test]
async fn create_related_creates_through_the_association() {
    let (db, driver) = build(&mut shop()).await;

    let order = db
        .model("Order")
        .unwrap()
        .create(json!({"number": "A-1"}))
        .await
        .unwrap();

    let item = order
        .create_related("items", json!({"sku": "a", "quantity": 4}))
        .await
        .unwrap();

    assert_eq!(item.deep_path(), "Order.items");
    assert_eq!(item.get("order_id"), order.get("id"));
    assert_eq!(driver.rows("item")[0]["order_id"], json!(1));
}

#[tokio::test]
async fn set_association_replaces_links() {
    let (db, driver) = build(&mut shop()).await;
    let items = db.model("Item").unwrap();

    let mut item = items
        .create(json!({"sku": "a", "quantity": 1, "tags": [{"name": "one"}, {"name": "two"}]}))
        .await
        .unwrap();
    assert_eq!(driver.rows("ItemTag").len(), 2);

    let other = items
        .create(json!({"sku": "b", "quantity": 1, "tags": [{"name": "three"}]}))
        .await
        .unwrap();

    // Re-point the first item at the second item's tag only
    let tags = other.related("tags").unwrap();
    let count = item.set_association("tags", tags).await.unwrap();
    assert_eq!(count, 1);

    let links: Vec<_> = driver
        .rows("ItemTag")
        .into_iter()
        .filter(|link| link["item_id"] == json!(1))
        .collect();
    assert_eq!(links, [row(json!({"item_id": 1, "tag_id": 3}))]);

    // Saving with nothing pending leaves the links alone
    item.deep_save(None).await.unwrap();
    assert_eq!(driver.rows("ItemTag").len(), 2);
}

#[tokio::test]
async fn belongs_to_link_updates_local_foreign_key() {
    let (db, driver) = build(&mut shop()).await;

    let customer = db
        .model("Customer")
        .unwrap()
        .create(json!({"name": "ann"}))
        .await
        .unwrap();

    let order = db
        .model("Order")
        .unwrap()
        .create(Input::object([
            ("number", Input::from(json!("A-1"))),
            ("customer", Input::from(customer)),
        ]))
        .await
        .unwrap();

    assert_eq!(order.get("customer_id"), Some(&json!(1)));
    assert_eq!(driver.rows("order")[0]["customer_id"], json!(1));
    assert_eq!(driver.rows("customer").len(), 1);
}
