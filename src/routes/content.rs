//! One generic router for every admin-managed collection without extra
//! rules: categories and the homepage content collections.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use crate::{
    dto::Payload,
    error::AppResult,
    extract::{AppJson, AppQuery},
    middleware::auth::AuthUser,
    repository::Record,
    response::Deleted,
    routes::params::ListQuery,
    services::crud_service,
    state::AppState,
};

pub fn router<R, P>() -> Router<AppState>
where
    R: Record + Serialize,
    P: Payload,
{
    Router::new()
        .route("/", get(list::<R>).post(create::<R, P>))
        .route("/{id}", get(show::<R>).put(update::<R, P>).delete(remove::<R>))
}

async fn list<R: Record + Serialize>(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Json<Vec<R>> {
    let filter = crud_service::list_filter(R::COLLECTION, &query);
    Json(crud_service::list::<R>(&state, filter, &query).await)
}

async fn show<R: Record + Serialize>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<R>> {
    Ok(Json(crud_service::get::<R>(&state, &id).await?))
}

async fn create<R: Record + Serialize, P: Payload>(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<P>,
) -> AppResult<Json<R>> {
    Ok(Json(crud_service::create::<R, P>(&state, &user, payload).await?))
}

async fn update<R: Record + Serialize, P: Payload>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<P>,
) -> AppResult<Json<R>> {
    Ok(Json(crud_service::update::<R, P>(&state, &user, &id, payload).await?))
}

async fn remove<R: Record + Serialize>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Deleted>> {
    crud_service::delete::<R>(&state, &user, &id).await?;
    Ok(Json(Deleted::new(id)))
}
