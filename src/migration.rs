//! One-time copy of a browser local-storage dump into the store.
//!
//! The dump is a JSON object of local-storage keys. Values are either JSON
//! or, as the browser keeps them, JSON encoded in a string.

use bson::Document;
use serde_json::{Map, Value};

use crate::{
    db::{Collection, Database, StoreResult},
    normalize::PUBLIC_ID,
    repository,
};

/// Previous client-side ids are kept under this field.
pub const LEGACY_ID: &str = "legacyId";

#[derive(Debug, Default)]
pub struct MigrationPlan {
    pub batches: Vec<(Collection, Vec<Document>)>,
    pub skipped: Vec<String>,
}

impl MigrationPlan {
    pub fn document_count(&self) -> usize {
        self.batches.iter().map(|(_, docs)| docs.len()).sum()
    }

    fn push(&mut self, collection: Collection, docs: Vec<Document>) {
        if docs.is_empty() {
            return;
        }
        match self.batches.iter_mut().find(|(c, _)| *c == collection) {
            Some((_, batch)) => batch.extend(docs),
            None => self.batches.push((collection, docs)),
        }
    }
}

#[derive(Debug, Default)]
pub struct MigrationReport {
    pub inserted: Vec<(Collection, usize)>,
}

enum Target {
    List(Collection),
    Orders(String),
    Cart(String),
}

fn target(key: &str) -> Option<Target> {
    if let Some(user_id) = key.strip_prefix("orders_") {
        return Some(Target::Orders(user_id.to_string()));
    }
    if let Some(user_id) = key.strip_prefix("cart_") {
        return Some(Target::Cart(user_id.to_string()));
    }
    let collection = match key {
        "products" => Collection::Products,
        "categories" => Collection::Categories,
        "advertisements" => Collection::Advertisements,
        "heroSlides" => Collection::HeroSlides,
        "testimonials" => Collection::Testimonials,
        "offers" => Collection::Offers,
        "splitCards" => Collection::SplitCards,
        "animatedBanners" => Collection::AnimatedBanners,
        _ => return None,
    };
    Some(Target::List(collection))
}

/// Decode a local-storage value, unwrapping string-encoded JSON and cache
/// entries written as `{ storedAt, value }`.
fn decode_value(value: &Value) -> Option<Value> {
    let value = match value {
        Value::String(raw) => serde_json::from_str(raw).ok()?,
        other => other.clone(),
    };
    match value {
        Value::Object(mut map) if map.contains_key("storedAt") && map.contains_key("value") => {
            map.remove("value")
        }
        other => Some(other),
    }
}

fn to_document(value: Value) -> Option<Document> {
    let Value::Object(mut map) = value else {
        return None;
    };
    if let Some(id) = map.remove(PUBLIC_ID) {
        map.insert(LEGACY_ID.to_string(), id);
    }
    map.remove("_id");
    bson::to_document(&map).ok()
}

fn to_documents(value: Value) -> Vec<Document> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(to_document).collect(),
        _ => Vec::new(),
    }
}

/// Map every recognised key to its collection. Derived keys such as
/// `featuredProducts` and anything unparsable are reported as skipped.
pub fn plan(dump: &Map<String, Value>) -> MigrationPlan {
    let mut plan = MigrationPlan::default();

    for (key, raw) in dump {
        let (Some(target), Some(value)) = (target(key), decode_value(raw)) else {
            plan.skipped.push(key.clone());
            continue;
        };

        match target {
            Target::List(collection) => plan.push(collection, to_documents(value)),
            Target::Orders(user_id) => {
                let orders = to_documents(value)
                    .into_iter()
                    .map(|mut order| {
                        if !order.contains_key("userId") {
                            order.insert("userId", user_id.as_str());
                        }
                        order
                    })
                    .collect();
                plan.push(Collection::Orders, orders);
            }
            Target::Cart(user_id) => {
                let items: Vec<Document> = to_documents(value);
                if items.is_empty() {
                    continue;
                }
                let mut cart = Document::new();
                cart.insert("userId", user_id.as_str());
                cart.insert("items", items);
                plan.push(Collection::Cart, vec![cart]);
            }
        }
    }

    plan
}

pub async fn run(db: &Database, plan: MigrationPlan) -> StoreResult<MigrationReport> {
    let mut report = MigrationReport::default();
    for (collection, docs) in plan.batches {
        let ids = repository::insert_many(db, collection, docs).await?;
        tracing::info!(collection = %collection, count = ids.len(), "collection migrated");
        report.inserted.push((collection, ids.len()));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dump(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn batch(plan: &MigrationPlan, collection: Collection) -> &[Document] {
        plan.batches
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, docs)| docs.as_slice())
            .unwrap_or(&[])
    }

    #[test]
    fn maps_keys_to_collections() {
        let plan = plan(&dump(json!({
            "products": "[{\"id\":\"p1\",\"name\":\"Lamp\",\"price\":10}]",
            "heroSlides": [{"title": "Hello"}],
            "featuredProducts": [{"id": "p1"}],
            "theme": "dark",
        })));

        let products = batch(&plan, Collection::Products);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].get_str(LEGACY_ID).unwrap(), "p1");
        assert!(!products[0].contains_key("id"));

        assert_eq!(batch(&plan, Collection::HeroSlides).len(), 1);
        assert!(plan.skipped.contains(&"featuredProducts".to_string()));
        assert!(plan.skipped.contains(&"theme".to_string()));
    }

    #[test]
    fn per_user_keys_carry_the_user() {
        let plan = plan(&dump(json!({
            "orders_u1": [{"id": "o1", "items": [], "status": "pending"}],
            "cart_u1": [{"id": "p1", "name": "Lamp", "price": 10, "quantity": 2}],
            "cart_guest": "[]",
        })));

        let orders = batch(&plan, Collection::Orders);
        assert_eq!(orders[0].get_str("userId").unwrap(), "u1");

        let carts = batch(&plan, Collection::Cart);
        assert_eq!(carts.len(), 1);
        assert_eq!(carts[0].get_str("userId").unwrap(), "u1");
        assert_eq!(carts[0].get_array("items").unwrap().len(), 1);
        assert_eq!(plan.document_count(), 2);
    }

    #[test]
    fn unparsable_values_are_skipped() {
        let plan = plan(&dump(json!({ "categories": "{oops" })));
        assert!(plan.batches.is_empty());
        assert_eq!(plan.skipped, vec!["categories".to_string()]);
    }

    #[test]
    fn cached_entries_are_unwrapped() {
        let plan = plan(&dump(json!({
            "categories": {"storedAt": "2024-01-01T00:00:00Z", "value": [{"name": "Fashion"}]},
        })));
        assert_eq!(batch(&plan, Collection::Categories).len(), 1);
    }
}
