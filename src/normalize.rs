//! Rewrites the store's internal `_id` into the public string `id`.

use bson::{Bson, Document, oid::ObjectId};

pub const INTERNAL_ID: &str = "_id";
pub const PUBLIC_ID: &str = "id";

/// Normalize a single document, a list of documents, or pass anything else
/// through untouched.
pub fn normalize(value: Bson) -> Bson {
    match value {
        Bson::Document(doc) => Bson::Document(normalize_document(doc)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

/// Documents without `_id` come back unchanged.
pub fn normalize_document(mut doc: Document) -> Document {
    let Some(internal) = doc.remove(INTERNAL_ID) else {
        return doc;
    };

    let mut out = Document::new();
    out.insert(PUBLIC_ID, public_id(&internal));
    for (key, value) in doc {
        if key != PUBLIC_ID {
            out.insert(key, value);
        }
    }
    out
}

pub fn normalize_all(docs: Vec<Document>) -> Vec<Document> {
    docs.into_iter().map(normalize_document).collect()
}

pub fn public_id(internal: &Bson) -> String {
    match internal {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `None` when the string is not a valid object id.
pub fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn replaces_object_id_with_hex_string() {
        let oid = ObjectId::new();
        let doc = normalize_document(doc! { "_id": oid, "name": "Lamp", "price": 10.5 });

        assert!(!doc.contains_key("_id"));
        assert_eq!(doc.get_str("id").unwrap(), oid.to_hex());
        assert_eq!(doc.get_str("name").unwrap(), "Lamp");
        assert_eq!(doc.keys().next().map(String::as_str), Some("id"));
    }

    #[test]
    fn lists_keep_length_and_order() {
        let ids: Vec<ObjectId> = (0..3).map(|_| ObjectId::new()).collect();
        let list = Bson::Array(
            ids.iter()
                .map(|oid| Bson::Document(doc! { "_id": *oid }))
                .collect(),
        );

        let Bson::Array(items) = normalize(list) else {
            panic!("expected an array");
        };
        assert_eq!(items.len(), 3);
        for (item, oid) in items.iter().zip(&ids) {
            let doc = item.as_document().unwrap();
            assert_eq!(doc.get_str("id").unwrap(), oid.to_hex());
        }
    }

    #[test]
    fn already_normalized_is_unchanged() {
        let once = normalize_document(doc! { "_id": ObjectId::new(), "name": "x" });
        let twice = normalize_document(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn non_documents_pass_through() {
        assert_eq!(normalize(Bson::Null), Bson::Null);
        assert_eq!(normalize(Bson::Int32(4)), Bson::Int32(4));
        assert_eq!(
            normalize(Bson::String("plain".into())),
            Bson::String("plain".into())
        );
    }

    #[test]
    fn string_ids_are_kept_verbatim() {
        let doc = normalize_document(doc! { "_id": "guest", "items": [] });
        assert_eq!(doc.get_str("id").unwrap(), "guest");
    }

    #[test]
    fn stale_public_id_is_overwritten() {
        let oid = ObjectId::new();
        let doc = normalize_document(doc! { "_id": oid, "id": "legacy-7" });
        assert_eq!(doc.get_str("id").unwrap(), oid.to_hex());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("not-an-id").is_none());
        let oid = ObjectId::new();
        assert_eq!(parse_id(&oid.to_hex()), Some(oid));
    }
}
