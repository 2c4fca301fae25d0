use anyhow::Context;
use bson::{Document, doc};
use storefront_api::{
    config::database_from_env,
    db::{Collection, Database},
    models::Role,
    repository,
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db = Database::new(database_from_env()?);
    db.init().await?;

    let email = std::env::var("SEED_ADMIN_EMAIL").context("SEED_ADMIN_EMAIL must be set")?;
    let password =
        std::env::var("SEED_ADMIN_PASSWORD").context("SEED_ADMIN_PASSWORD must be set")?;
    let admin_id = ensure_admin(&db, &email, &password).await?;

    let category_ids = seed_categories(&db).await?;
    seed_products(&db, &category_ids).await?;
    db.shutdown().await;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

/// Creates the admin, or promotes and re-keys an existing account.
async fn ensure_admin(db: &Database, email: &str, password: &str) -> anyhow::Result<String> {
    let email = email.trim().to_lowercase();
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let user = repository::upsert(
        db,
        Collection::Users,
        doc! { "email": &email },
        doc! {
            "name": "Administrator",
            "email": &email,
            "password": password_hash,
            "role": Role::Admin.as_str(),
        },
    )
    .await?;

    println!("Ensured admin {email}");
    Ok(user.get_str("id").unwrap_or_default().to_string())
}

/// Only seeds an empty collection, returning the category ids by name.
async fn seed_categories(db: &Database) -> anyhow::Result<Vec<(String, String)>> {
    let names = [
        ("Electronics", "Phones, audio and accessories"),
        ("Fashion", "Clothing, shoes and bags"),
        ("Home & Living", "Furniture, decor and kitchen"),
    ];

    if repository::count(db, Collection::Categories, doc! {}).await? == 0 {
        let docs: Vec<Document> = names
            .iter()
            .map(|(name, description)| doc! { "name": *name, "description": *description })
            .collect();
        repository::insert_many(db, Collection::Categories, docs).await?;
        println!("Seeded categories");
    }

    let existing = repository::get_all(
        db,
        Collection::Categories,
        doc! {},
        repository::ListOptions::default(),
    )
    .await?;
    Ok(existing
        .iter()
        .filter_map(|c| {
            Some((
                c.get_str("name").ok()?.to_string(),
                c.get_str("id").ok()?.to_string(),
            ))
        })
        .collect())
}

async fn seed_products(db: &Database, categories: &[(String, String)]) -> anyhow::Result<()> {
    if repository::count(db, Collection::Products, doc! {}).await? > 0 {
        println!("Products already present, skipping");
        return Ok(());
    }

    let category = |name: &str| {
        categories
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| id.clone())
    };

    let products = [
        ("Wireless Earbuds", "Noise cancelling, 24h battery", 2499.0, 40, "Electronics", true),
        ("Phone Stand", "Aluminium desk stand", 499.0, 120, "Electronics", false),
        ("Linen Shirt", "Breathable summer shirt", 1299.0, 60, "Fashion", true),
        ("Canvas Tote", "Everyday carry bag", 699.0, 80, "Fashion", false),
        ("Ceramic Mug", "350ml, dishwasher safe", 349.0, 150, "Home & Living", true),
    ];

    let docs: Vec<Document> = products
        .iter()
        .map(|(name, description, price, stock, category_name, featured)| {
            let mut product = doc! {
                "name": *name,
                "description": *description,
                "price": *price,
                "stock": *stock as i64,
                "featured": *featured,
            };
            if let Some(id) = category(*category_name) {
                product.insert("category", id);
            }
            product
        })
        .collect();

    let ids = repository::insert_many(db, Collection::Products, docs).await?;
    println!("Seeded {} products", ids.len());
    Ok(())
}
