use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payments::{
        CreatePaymentRequest, PaymentOrderResponse, PaymentVerification, VerifyPaymentRequest,
    },
    error::{AppResult, ErrorBody},
    extract::AppJson,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_payment_order))
        .route("/verify", post(verify_payment))
}

#[utoipa::path(
    post,
    path = "/api/payments/orders",
    request_body = CreatePaymentRequest,
    responses(
        (status = 200, description = "Gateway order created", body = ApiResponse<PaymentOrderResponse>),
        (status = 500, description = "Gateway unavailable or not configured", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreatePaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentOrderResponse>>> {
    let order = payment_service::start_checkout(&state, payload).await?;
    tracing::info!(user_id = %user.user_id, gateway_order_id = %order.order_id, "checkout started");
    Ok(Json(ApiResponse::success("Payment order created", order)))
}

#[utoipa::path(
    post,
    path = "/api/payments/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Signature verified", body = ApiResponse<PaymentVerification>),
        (status = 400, description = "Invalid payment signature", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentVerification>>> {
    let verification = payment_service::confirm_payment(&state, &user, payload).await?;
    Ok(Json(ApiResponse::success("Payment verified", verification)))
}
