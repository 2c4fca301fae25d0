use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::catalog::ProductRequest,
    error::{AppResult, ErrorBody},
    extract::{AppJson, AppQuery},
    middleware::auth::AuthUser,
    models::Product,
    response::Deleted,
    routes::params::ListQuery,
    services::{crud_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/featured", get(featured_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ListQuery),
    responses(
        (status = 200, description = "List products", body = Vec<Product>),
        (status = 500, description = "Database unreachable", body = ErrorBody)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product_service::list_products(&state, &query).await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/products/featured",
    params(ListQuery),
    responses(
        (status = 200, description = "Featured products", body = Vec<Product>)
    ),
    tag = "Products"
)]
pub async fn featured_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Json<Vec<Product>> {
    Json(product_service::featured_products(&state, &query).await)
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = Product),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    Ok(Json(crud_service::get::<Product>(&state, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Create product", body = Product),
        (status = 400, description = "Required fields missing", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ProductRequest>,
) -> AppResult<Json<Product>> {
    let product = crud_service::create::<Product, _>(&state, &user, payload).await?;
    Ok(Json(product))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ProductRequest>,
) -> AppResult<Json<Product>> {
    let product = crud_service::update::<Product, _>(&state, &user, &id, payload).await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product", body = Deleted),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Deleted>> {
    crud_service::delete::<Product>(&state, &user, &id).await?;
    Ok(Json(Deleted::new(id)))
}
