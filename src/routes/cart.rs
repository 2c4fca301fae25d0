use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::cart::{CartList, ReplaceCartRequest},
    error::{AppResult, ErrorBody},
    extract::AppJson,
    middleware::auth::AuthUser,
    response::Deleted,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{user_id}",
        get(get_cart).put(replace_cart).delete(clear_cart),
    )
}

#[utoipa::path(
    get,
    path = "/api/cart/{user_id}",
    params(
        ("user_id" = String, Path, description = "Cart owner")
    ),
    responses(
        (status = 200, description = "Mirrored cart lines", body = CartList),
        (status = 403, description = "Not the cart owner", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<CartList>> {
    let items = cart_service::get_cart(&state, &user, &user_id).await?;
    Ok(Json(CartList(items)))
}

#[utoipa::path(
    put,
    path = "/api/cart/{user_id}",
    params(
        ("user_id" = String, Path, description = "Cart owner")
    ),
    request_body = ReplaceCartRequest,
    responses(
        (status = 200, description = "Cart snapshot stored", body = CartList),
        (status = 400, description = "Invalid cart line", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn replace_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<String>,
    AppJson(payload): AppJson<ReplaceCartRequest>,
) -> AppResult<Json<CartList>> {
    let items = cart_service::replace_cart(&state, &user, &user_id, payload).await?;
    Ok(Json(CartList(items)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{user_id}",
    params(
        ("user_id" = String, Path, description = "Cart owner")
    ),
    responses(
        (status = 200, description = "Cart cleared", body = Deleted)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<Deleted>> {
    cart_service::clear_cart(&state, &user, &user_id).await?;
    Ok(Json(Deleted::new(user_id)))
}
