use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderName, Request, Response, StatusCode, Uri},
    routing::get,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    dto::{
        catalog::CategoryRequest,
        content::{
            AdvertisementRequest, AnimatedBannerRequest, HeroSlideRequest, OfferRequest,
            SplitCardRequest, TestimonialRequest,
        },
    },
    error::ErrorBody,
    models::{Advertisement, AnimatedBanner, Category, HeroSlide, Offer, SplitCard, Testimonial},
    state::AppState,
};

pub mod auth;
pub mod cart;
pub mod content;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

const REQUEST_ID_HEADER: &str = "x-request-id";

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/categories", content::router::<Category, CategoryRequest>())
        .nest("/advertisements", content::router::<Advertisement, AdvertisementRequest>())
        .nest("/hero-slides", content::router::<HeroSlide, HeroSlideRequest>())
        .nest("/testimonials", content::router::<Testimonial, TestimonialRequest>())
        .nest("/offers", content::router::<Offer, OfferRequest>())
        .nest("/split-cards", content::router::<SplitCard, SplitCardRequest>())
        .nest("/animated-banners", content::router::<AnimatedBanner, AnimatedBannerRequest>())
        .nest("/reviews", reviews::router())
        .nest("/wishlist", wishlist::router())
        .nest("/orders", orders::router())
        .nest("/cart", cart::router())
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/payments", payments::router())
}

/// The full application with middleware, ready to serve.
pub fn app(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::debug!(method = %request.method(), uri = %request.uri(), "request started");
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(ConcurrencyLimitLayer::new(100))
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: format!("No route for {}", uri.path()),
        }),
    )
}
