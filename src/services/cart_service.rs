//! Server side of the cart mirror. The cart of record lives on the client;
//! this collection holds the last snapshot a signed-in client pushed.

use bson::doc;
use serde::Serialize;

use crate::{
    db::{Collection, StoreResult},
    dto::cart::ReplaceCartRequest,
    error::AppResult,
    middleware::auth::{AuthUser, ensure_access},
    models::{CartDocument, CartItem},
    repository::{self, Availability},
    state::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartSnapshot<'a> {
    user_id: &'a str,
    items: &'a [CartItem],
}

pub async fn get_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: &str,
) -> AppResult<Vec<CartItem>> {
    ensure_access(user, user_id)?;
    let cart = repository::find_by::<CartDocument>(&state.db, doc! { "userId": user_id })
        .await
        .or_empty(Collection::Cart);
    Ok(cart.map(|c| c.items).unwrap_or_default())
}

pub async fn replace_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: &str,
    payload: ReplaceCartRequest,
) -> AppResult<Vec<CartItem>> {
    ensure_access(user, user_id)?;
    payload.validate()?;

    let snapshot = repository::encode(&CartSnapshot {
        user_id,
        items: &payload.items,
    })?;
    let stored = repository::upsert(
        &state.db,
        Collection::Cart,
        doc! { "userId": user_id },
        snapshot,
    )
    .await?;
    let cart: CartDocument = repository::decode(stored)?;

    tracing::debug!(user_id = %user_id, lines = cart.items.len(), "cart mirror replaced");
    Ok(cart.items)
}

pub async fn clear_cart(state: &AppState, user: &AuthUser, user_id: &str) -> AppResult<()> {
    ensure_access(user, user_id)?;
    clear_for_user(state, user_id).await?;
    Ok(())
}

pub async fn clear_for_user(state: &AppState, user_id: &str) -> StoreResult<u64> {
    repository::delete_many(&state.db, Collection::Cart, doc! { "userId": user_id }).await
}
