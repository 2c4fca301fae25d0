use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};

use crate::{
    dto::content::WishlistRequest,
    error::{AppResult, ErrorBody},
    extract::AppJson,
    middleware::auth::AuthUser,
    models::WishlistEntry,
    response::Deleted,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist).post(add_to_wishlist))
        .route("/{id}", delete(remove_from_wishlist))
}

#[utoipa::path(
    get,
    path = "/api/wishlist",
    responses(
        (status = 200, description = "Caller's wishlist", body = Vec<WishlistEntry>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<Vec<WishlistEntry>> {
    Json(wishlist_service::list_wishlist(&state, &user).await)
}

#[utoipa::path(
    post,
    path = "/api/wishlist",
    request_body = WishlistRequest,
    responses(
        (status = 200, description = "Added to wishlist", body = WishlistEntry),
        (status = 400, description = "Unknown product", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<WishlistRequest>,
) -> AppResult<Json<WishlistEntry>> {
    Ok(Json(wishlist_service::add_to_wishlist(&state, &user, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/{id}",
    params(
        ("id" = String, Path, description = "Wishlist entry ID")
    ),
    responses(
        (status = 200, description = "Removed from wishlist", body = Deleted),
        (status = 404, description = "Wishlist entry not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Deleted>> {
    wishlist_service::remove_from_wishlist(&state, &user, &id).await?;
    Ok(Json(Deleted::new(id)))
}
