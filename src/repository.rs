//! Generic document CRUD on top of [`Database`].
//!
//! Every read returns normalized documents (public `id`, no `_id`). Reads
//! report failures as `Err` like writes do; callers that render lists decide
//! to degrade with [`Availability::or_empty`], which keeps that choice
//! visible at the call site.

use bson::{Bson, DateTime, Document, doc};
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    db::{Collection, Database, StoreError, StoreResult},
    normalize::{INTERNAL_ID, PUBLIC_ID, normalize_all, normalize_document, parse_id},
};

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub sort: Option<Document>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
}

impl ListOptions {
    pub fn sorted(sort: Document) -> Self {
        Self {
            sort: Some(sort),
            ..Self::default()
        }
    }
}

pub async fn get_all(
    db: &Database,
    collection: Collection,
    filter: Document,
    options: ListOptions,
) -> StoreResult<Vec<Document>> {
    let coll = db.collection(collection).await?;
    // `_id` grows with insertion, so this is insertion order.
    let sort = options.sort.unwrap_or_else(|| doc! { INTERNAL_ID: 1 });
    let mut find = coll.find(filter).sort(sort);
    if let Some(limit) = options.limit {
        find = find.limit(limit);
    }
    if let Some(skip) = options.skip {
        find = find.skip(skip);
    }
    let docs: Vec<Document> = find.await?.try_collect().await?;
    Ok(normalize_all(docs))
}

/// Malformed ids and misses both yield `Ok(None)`.
pub async fn get_by_id(
    db: &Database,
    collection: Collection,
    id: &str,
) -> StoreResult<Option<Document>> {
    let Some(oid) = parse_id(id) else {
        return Ok(None);
    };
    find_one(db, collection, doc! { INTERNAL_ID: oid }).await
}

pub async fn find_one(
    db: &Database,
    collection: Collection,
    filter: Document,
) -> StoreResult<Option<Document>> {
    let coll = db.collection(collection).await?;
    Ok(coll.find_one(filter).await?.map(normalize_document))
}

pub async fn count(db: &Database, collection: Collection, filter: Document) -> StoreResult<u64> {
    let coll = db.collection(collection).await?;
    Ok(coll.count_documents(filter).await?)
}

pub async fn create(
    db: &Database,
    collection: Collection,
    mut data: Document,
) -> StoreResult<Document> {
    strip_ids(&mut data);
    stamp_new(&mut data, DateTime::now());

    let coll = db.collection(collection).await?;
    let inserted = coll.insert_one(data).await?;
    let stored = coll
        .find_one(doc! { INTERNAL_ID: inserted.inserted_id })
        .await?
        .ok_or(StoreError::NotFound { collection })?;

    tracing::debug!(collection = %collection, "document created");
    Ok(normalize_document(stored))
}

/// Partial merge of `patch` into the document. A miss is reported as
/// [`StoreError::NotFound`] and writes nothing.
pub async fn update(
    db: &Database,
    collection: Collection,
    id: &str,
    mut patch: Document,
) -> StoreResult<Document> {
    let oid = parse_id(id).ok_or(StoreError::NotFound { collection })?;
    strip_ids(&mut patch);
    patch.remove(CREATED_AT);
    patch.insert(UPDATED_AT, DateTime::now());

    let coll = db.collection(collection).await?;
    let updated = coll
        .find_one_and_update(doc! { INTERNAL_ID: oid }, doc! { "$set": patch })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(StoreError::NotFound { collection })?;

    tracing::debug!(collection = %collection, id = %id, "document updated");
    Ok(normalize_document(updated))
}

pub async fn remove(db: &Database, collection: Collection, id: &str) -> StoreResult<()> {
    let oid = parse_id(id).ok_or(StoreError::NotFound { collection })?;
    let coll = db.collection(collection).await?;
    let result = coll.delete_one(doc! { INTERNAL_ID: oid }).await?;
    if result.deleted_count == 0 {
        return Err(StoreError::NotFound { collection });
    }
    tracing::debug!(collection = %collection, id = %id, "document removed");
    Ok(())
}

/// Insert or replace the single document matching `filter`, keeping its
/// original `createdAt`.
pub async fn upsert(
    db: &Database,
    collection: Collection,
    filter: Document,
    mut data: Document,
) -> StoreResult<Document> {
    strip_ids(&mut data);
    data.remove(CREATED_AT);
    let now = DateTime::now();
    data.insert(UPDATED_AT, now);

    let coll = db.collection(collection).await?;
    let stored = coll
        .find_one_and_update(
            filter,
            doc! { "$set": data, "$setOnInsert": { CREATED_AT: now } },
        )
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(StoreError::NotFound { collection })?;
    Ok(normalize_document(stored))
}

/// Returns the public ids in input order.
pub async fn insert_many(
    db: &Database,
    collection: Collection,
    docs: Vec<Document>,
) -> StoreResult<Vec<String>> {
    if docs.is_empty() {
        return Ok(Vec::new());
    }
    let now = DateTime::now();
    let docs: Vec<Document> = docs
        .into_iter()
        .map(|mut doc| {
            strip_ids(&mut doc);
            stamp_new(&mut doc, now);
            doc
        })
        .collect();

    let coll = db.collection(collection).await?;
    let result = coll.insert_many(docs).await?;
    let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
    ids.sort_by_key(|(index, _)| *index);

    tracing::info!(collection = %collection, count = ids.len(), "documents inserted");
    Ok(ids
        .iter()
        .map(|(_, id)| crate::normalize::public_id(id))
        .collect())
}

/// Returns the number of matched documents.
pub async fn update_many(
    db: &Database,
    collection: Collection,
    filter: Document,
    mut patch: Document,
) -> StoreResult<u64> {
    strip_ids(&mut patch);
    patch.remove(CREATED_AT);
    patch.insert(UPDATED_AT, DateTime::now());

    let coll = db.collection(collection).await?;
    let result = coll.update_many(filter, doc! { "$set": patch }).await?;
    Ok(result.matched_count)
}

pub async fn delete_many(
    db: &Database,
    collection: Collection,
    filter: Document,
) -> StoreResult<u64> {
    let coll = db.collection(collection).await?;
    let result = coll.delete_many(filter).await?;
    Ok(result.deleted_count)
}

fn strip_ids(doc: &mut Document) {
    doc.remove(INTERNAL_ID);
    doc.remove(PUBLIC_ID);
}

fn stamp_new(doc: &mut Document, now: DateTime) {
    doc.insert(CREATED_AT, now);
    doc.insert(UPDATED_AT, now);
}

/// A typed view over one collection.
pub trait Record: DeserializeOwned + Send + Sync + Unpin + 'static {
    const COLLECTION: Collection;
    /// Human name used in error messages, e.g. "Product".
    const LABEL: &'static str;
}

pub fn encode<T: Serialize>(value: &T) -> StoreResult<Document> {
    Ok(bson::to_document(value)?)
}

pub fn decode<R: Record>(doc: Document) -> StoreResult<R> {
    Ok(bson::from_document(doc)?)
}

/// Documents that no longer match the record shape are skipped and logged.
pub fn decode_all<R: Record>(docs: Vec<Document>) -> Vec<R> {
    docs.into_iter()
        .filter_map(|doc| match bson::from_document::<R>(doc) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(
                    collection = %R::COLLECTION,
                    error = %err,
                    "skipping malformed document"
                );
                None
            }
        })
        .collect()
}

pub async fn list<R: Record>(
    db: &Database,
    filter: Document,
    options: ListOptions,
) -> StoreResult<Vec<R>> {
    Ok(decode_all(get_all(db, R::COLLECTION, filter, options).await?))
}

pub async fn find<R: Record>(db: &Database, id: &str) -> StoreResult<Option<R>> {
    get_by_id(db, R::COLLECTION, id)
        .await?
        .map(decode)
        .transpose()
}

pub async fn find_by<R: Record>(db: &Database, filter: Document) -> StoreResult<Option<R>> {
    find_one(db, R::COLLECTION, filter)
        .await?
        .map(decode)
        .transpose()
}

pub async fn insert<R: Record>(db: &Database, data: Document) -> StoreResult<R> {
    decode(create(db, R::COLLECTION, data).await?)
}

pub async fn patch<R: Record>(db: &Database, id: &str, data: Document) -> StoreResult<R> {
    decode(update(db, R::COLLECTION, id, data).await?)
}

pub async fn delete<R: Record>(db: &Database, id: &str) -> StoreResult<()> {
    remove(db, R::COLLECTION, id).await
}

/// Presentation-side adapter for reads that favor availability: a failed
/// read is logged and rendered as the empty value.
pub trait Availability<T> {
    fn or_empty(self, collection: Collection) -> T;
}

impl<T: Default> Availability<T> for StoreResult<T> {
    fn or_empty(self, collection: Collection) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    collection = %collection,
                    error = %err,
                    "read failed, serving empty result"
                );
                T::default()
            }
        }
    }
}
