use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};

use crate::{
    dto::content::ReviewRequest,
    error::{AppResult, ErrorBody},
    extract::{AppJson, AppQuery},
    middleware::auth::AuthUser,
    models::Review,
    response::Deleted,
    routes::params::ListQuery,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/{id}", delete(delete_review))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    params(ListQuery),
    responses(
        (status = 200, description = "Reviews, newest first", body = Vec<Review>)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Json<Vec<Review>> {
    Json(review_service::list_reviews(&state, &query).await)
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review added", body = Review),
        (status = 400, description = "Invalid review", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ReviewRequest>,
) -> AppResult<Json<Review>> {
    Ok(Json(review_service::create_review(&state, &user, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(
        ("id" = String, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review removed", body = Deleted),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Review not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Deleted>> {
    review_service::delete_review(&state, &user, &id).await?;
    Ok(Json(Deleted::new(id)))
}
