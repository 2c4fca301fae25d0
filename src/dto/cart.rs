use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::CartItem,
};

/// Full cart snapshot; the mirror is last-write-wins.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReplaceCartRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl ReplaceCartRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.items.iter().any(|item| item.quantity <= 0) {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serialized as a bare array of lines.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartList(pub Vec<CartItem>);
