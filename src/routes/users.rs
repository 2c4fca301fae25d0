use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::{AppResult, ErrorBody},
    extract::AppQuery,
    middleware::auth::AuthUser,
    models::User,
    routes::params::ListQuery,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_users))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(ListQuery),
    responses(
        (status = 200, description = "Registered users", body = Vec<User>),
        (status = 403, description = "Admin only", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(auth_service::list_users(&state, &user, &query).await?))
}
