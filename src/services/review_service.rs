use bson::doc;

use crate::{
    db::Collection,
    dto::content::ReviewRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, Review},
    repository::{self, Availability},
    routes::params::ListQuery,
    state::AppState,
};

pub async fn list_reviews(state: &AppState, query: &ListQuery) -> Vec<Review> {
    let filter = match query.product_id.as_ref().filter(|id| !id.is_empty()) {
        Some(product_id) => doc! { "productId": product_id.as_str() },
        None => doc! {},
    };
    let options = query.list_options(Some(doc! { "createdAt": -1 }));
    repository::list::<Review>(&state.db, filter, options)
        .await
        .or_empty(Collection::Reviews)
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: ReviewRequest,
) -> AppResult<Review> {
    payload.validate()?;
    let product_id = payload.product_id.unwrap_or_default();

    if repository::find::<Product>(&state.db, &product_id).await?.is_none() {
        return Err(AppError::BadRequest("Product not found".into()));
    }

    let review: Review = repository::insert(
        &state.db,
        doc! {
            "productId": &product_id,
            "userId": &user.user_id,
            "name": &user.name,
            "rating": payload.rating.unwrap_or_default(),
            "comment": payload.comment.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(review_id = %review.id, product_id = %product_id, "review added");
    Ok(review)
}

/// Authors may remove their own reviews; admins any.
pub async fn delete_review(state: &AppState, user: &AuthUser, id: &str) -> AppResult<()> {
    let review = repository::find::<Review>(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Review"))?;
    if !user.can_access(&review.user_id) {
        return Err(AppError::Forbidden);
    }
    repository::delete::<Review>(&state.db, id)
        .await
        .map_err(|err| AppError::from_store(err, "Review"))
}
