use bson::doc;

use crate::{
    db::Collection,
    dto::content::WishlistRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, WishlistEntry},
    repository::{self, Availability, ListOptions},
    state::AppState,
};

pub async fn list_wishlist(state: &AppState, user: &AuthUser) -> Vec<WishlistEntry> {
    repository::list::<WishlistEntry>(
        &state.db,
        doc! { "userId": &user.user_id },
        ListOptions::sorted(doc! { "createdAt": -1 }),
    )
    .await
    .or_empty(Collection::Wishlist)
}

/// Adding a product twice returns the existing entry.
pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: WishlistRequest,
) -> AppResult<WishlistEntry> {
    let product_id = payload
        .product_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(AppError::missing_fields)?;

    if repository::find::<Product>(&state.db, &product_id).await?.is_none() {
        return Err(AppError::BadRequest("Product not found".into()));
    }

    let key = doc! { "userId": &user.user_id, "productId": &product_id };
    let stored = repository::upsert(&state.db, Collection::Wishlist, key.clone(), key).await?;
    let entry: WishlistEntry = repository::decode(stored)?;

    tracing::debug!(user_id = %user.user_id, product_id = %product_id, "wishlist updated");
    Ok(entry)
}

pub async fn remove_from_wishlist(state: &AppState, user: &AuthUser, id: &str) -> AppResult<()> {
    let entry = repository::find::<WishlistEntry>(&state.db, id)
        .await?
        .filter(|entry| entry.user_id == user.user_id)
        .ok_or(AppError::NotFound("Wishlist entry"))?;

    repository::delete::<WishlistEntry>(&state.db, &entry.id)
        .await
        .map_err(|err| AppError::from_store(err, "Wishlist entry"))
}
