//! Flows against a real MongoDB. Skipped unless `TEST_MONGODB_URI` is set.

use bson::doc;
use serde_json::json;
use storefront_api::{
    config::AppConfig,
    db::{Collection, StoreError},
    dto::{cart::ReplaceCartRequest, catalog::ProductRequest, orders::CreateOrderRequest},
    middleware::auth::AuthUser,
    models::{CartItem, OrderStatus, Product, Role},
    repository::{self, ListOptions},
    services::{cart_service, crud_service, order_service},
    state::AppState,
};

fn test_state() -> Option<AppState> {
    let Ok(uri) = std::env::var("TEST_MONGODB_URI") else {
        eprintln!("Skipping test: set TEST_MONGODB_URI to run store flow tests.");
        return None;
    };
    let mut config = AppConfig::new(uri, "flow-test-secret");
    config.mongodb_db = format!("storefront_test_{}", uuid::Uuid::new_v4().simple());
    Some(AppState::from_config(&config).expect("state"))
}

fn admin() -> AuthUser {
    AuthUser {
        user_id: "admin-1".into(),
        name: "Admin".into(),
        email: "admin@example.com".into(),
        role: Role::Admin,
    }
}

fn shopper() -> AuthUser {
    AuthUser {
        user_id: "user-1".into(),
        name: "Shopper".into(),
        email: "shopper@example.com".into(),
        role: Role::User,
    }
}

#[tokio::test]
async fn product_crud_round_trip() -> anyhow::Result<()> {
    let Some(state) = test_state() else {
        return Ok(());
    };

    let payload: ProductRequest = serde_json::from_value(json!({
        "name": "Test",
        "description": "d",
        "price": 10,
        "stock": 5
    }))?;
    let created: Product = crud_service::create(&state, &admin(), payload).await?;
    assert_eq!(created.id.len(), 24);
    assert_eq!(created.price, 10.0);
    assert_eq!(created.created_at, created.updated_at);

    let raw = repository::get_by_id(&state.db, Collection::Products, &created.id)
        .await?
        .expect("stored product");
    assert!(raw.contains_key("id"));
    assert!(!raw.contains_key("_id"));

    let patch: ProductRequest = serde_json::from_value(json!({ "price": "12.5" }))?;
    let updated: Product = crud_service::update(&state, &admin(), &created.id, patch).await?;
    assert_eq!(updated.price, 12.5);
    assert_eq!(updated.name, "Test");
    assert!(updated.updated_at >= created.updated_at);

    let missing = "000000000000000000000000";
    let err = repository::update(&state.db, Collection::Products, missing, doc! { "name": "x" })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert_eq!(
        repository::count(&state.db, Collection::Products, doc! {}).await?,
        1
    );

    let err = repository::remove(&state.db, Collection::Products, missing)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    crud_service::delete::<Product>(&state, &admin(), &created.id).await?;
    assert!(repository::find::<Product>(&state.db, &created.id).await?.is_none());

    state.db.drop_database().await?;
    state.db.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn bulk_operations_report_counts() -> anyhow::Result<()> {
    let Some(state) = test_state() else {
        return Ok(());
    };

    let ids = repository::insert_many(
        &state.db,
        Collection::Offers,
        vec![
            doc! { "title": "A", "order": 2 },
            doc! { "title": "B", "order": 1 },
            doc! { "title": "C", "order": 3 },
        ],
    )
    .await?;
    assert_eq!(ids.len(), 3);

    let sorted = repository::get_all(
        &state.db,
        Collection::Offers,
        doc! {},
        ListOptions::sorted(doc! { "order": 1 }),
    )
    .await?;
    let titles: Vec<&str> = sorted.iter().filter_map(|d| d.get_str("title").ok()).collect();
    assert_eq!(titles, vec!["B", "A", "C"]);

    let matched = repository::update_many(
        &state.db,
        Collection::Offers,
        doc! { "order": { "$gte": 2 } },
        doc! { "active": false },
    )
    .await?;
    assert_eq!(matched, 2);

    let deleted =
        repository::delete_many(&state.db, Collection::Offers, doc! { "active": false }).await?;
    assert_eq!(deleted, 2);

    state.db.drop_database().await?;
    state.db.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn checkout_clears_the_mirrored_cart() -> anyhow::Result<()> {
    let Some(state) = test_state() else {
        return Ok(());
    };
    let user = shopper();

    let line = CartItem {
        id: "p1".into(),
        name: "Lamp".into(),
        price: 10.0,
        image: None,
        quantity: 2,
        color: None,
        size: None,
    };
    let stored = cart_service::replace_cart(
        &state,
        &user,
        &user.user_id,
        ReplaceCartRequest { items: vec![line] },
    )
    .await?;
    assert_eq!(stored.len(), 1);

    let payload: CreateOrderRequest = serde_json::from_value(json!({
        "items": [{"id": "p1", "name": "Lamp", "price": 10, "quantity": 2}],
        "customer": {"name": "Shopper", "email": "shopper@example.com"}
    }))?;
    let order = order_service::create_order(&state, Some(&user), payload).await?;
    assert_eq!(order.user_id, user.user_id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.totals.total, 20.0);

    assert!(cart_service::get_cart(&state, &user, &user.user_id).await?.is_empty());
    assert_eq!(
        order_service::list_orders(&state, &user, &Default::default()).await.len(),
        1
    );

    state.db.drop_database().await?;
    state.db.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn scratch_database_is_dropped_after_use() -> anyhow::Result<()> {
    let Some(state) = test_state() else {
        return Ok(());
    };
    let name = state.db.name().to_string();

    let payload: ProductRequest = serde_json::from_value(json!({"name": "Mug", "price": 4}))?;
    let _: Product = crud_service::create(&state, &admin(), payload).await?;
    assert!(state.db.list_database_names().await?.contains(&name));

    state.db.drop_database().await?;
    assert!(!state.db.list_database_names().await?.contains(&name));

    state.db.shutdown().await;
    Ok(())
}
