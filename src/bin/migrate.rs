use anyhow::Context;
use storefront_api::{config::database_from_env, db::Database, migration};

/// Usage: `migrate <local-storage-dump.json>`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: migrate <local-storage-dump.json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let dump: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&raw).context("dump must be a JSON object of local-storage keys")?;

    let plan = migration::plan(&dump);
    for key in &plan.skipped {
        tracing::warn!(key = %key, "skipping key");
    }
    if plan.batches.is_empty() {
        println!("Nothing to migrate");
        return Ok(());
    }

    let db = Database::new(database_from_env()?);
    db.init().await?;
    let total = plan.document_count();
    let report = migration::run(&db, plan).await?;
    db.shutdown().await;

    for (collection, count) in &report.inserted {
        println!("{collection}: {count} documents");
    }
    println!("Migrated {total} documents");
    Ok(())
}
