//! Request payloads. Each is validated once here and stored as a typed
//! document; nothing downstream sees untyped JSON.

use bson::Document;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{AppError, AppResult},
    repository,
};

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod content;
pub mod orders;
pub mod payments;

/// A create/update body for one collection. Fields are optional so a
/// missing one is reported as "Required fields missing" rather than a
/// deserializer error.
pub trait Payload: DeserializeOwned + Serialize + Send + 'static {
    fn validate_create(&self) -> AppResult<()>;

    fn validate_update(&self) -> AppResult<()> {
        Ok(())
    }

    fn to_document(&self) -> AppResult<Document> {
        Ok(repository::encode(self)?)
    }
}

pub(crate) fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

pub(crate) fn require(ok: bool) -> AppResult<()> {
    if ok { Ok(()) } else { Err(AppError::missing_fields()) }
}
