//! Thin wrapper over the hosted checkout gateway. The browser widget does
//! the real work; the server only creates gateway orders and checks the
//! signature the widget hands back.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    config::PaymentConfig,
    dto::payments::{
        CreatePaymentRequest, PaymentOrderResponse, PaymentVerification, VerifyPaymentRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    services::order_service,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment gateway keys are not configured")]
    NotConfigured,

    #[error("payment gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment gateway rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid payment signature")]
    InvalidSignature,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Serialize)]
struct CreateGatewayOrder<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

pub struct PaymentGateway {
    http: reqwest::Client,
    key_id: Option<String>,
    key_secret: Option<SecretString>,
    api_base: String,
    currency: String,
}

impl PaymentGateway {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
        }
    }

    pub fn key_id(&self) -> Result<&str, PaymentError> {
        self.key_id.as_deref().ok_or(PaymentError::NotConfigured)
    }

    pub fn default_currency(&self) -> &str {
        &self.currency
    }

    fn secret(&self) -> Result<&str, PaymentError> {
        self.key_secret
            .as_ref()
            .map(|s| s.expose_secret())
            .ok_or(PaymentError::NotConfigured)
    }

    /// `amount` is in the currency's minor unit.
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, PaymentError> {
        let key_id = self.key_id()?;
        let secret = self.secret()?;

        let response = self
            .http
            .post(format!("{}/v1/orders", self.api_base))
            .basic_auth(key_id, Some(secret))
            .json(&CreateGatewayOrder {
                amount,
                currency,
                receipt,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let order = response.json::<GatewayOrder>().await?;
        tracing::info!(gateway_order_id = %order.id, amount, currency, "gateway order created");
        Ok(order)
    }

    /// Checks `HMAC-SHA256(secret, "{order_id}|{payment_id}")` against the
    /// hex signature returned by the checkout widget.
    pub fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let secret = self.secret()?;
        let expected = hex::decode(signature.trim()).map_err(|_| PaymentError::InvalidSignature)?;

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|_| PaymentError::InvalidSignature)?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| PaymentError::InvalidSignature)
    }
}

/// Major units (e.g. rupees) to minor units (paise), rounded.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub async fn start_checkout(
    state: &AppState,
    payload: CreatePaymentRequest,
) -> AppResult<PaymentOrderResponse> {
    let amount = payload
        .amount
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or_else(|| AppError::BadRequest("amount must be greater than 0".into()))?;
    let gateway = &state.payments;
    let currency = payload
        .currency
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| gateway.default_currency().to_string());
    let receipt = payload
        .receipt
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| format!("rcpt_{}", uuid::Uuid::new_v4().simple()));

    let order = gateway
        .create_order(to_minor_units(amount), &currency, &receipt)
        .await?;

    Ok(PaymentOrderResponse {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: gateway.key_id()?.to_string(),
    })
}

/// Checks the widget signature and, when a store order is named, records
/// the payment on it.
pub async fn confirm_payment(
    state: &AppState,
    user: &AuthUser,
    payload: VerifyPaymentRequest,
) -> AppResult<PaymentVerification> {
    let (Some(gateway_order), Some(payment_id), Some(signature)) = (
        payload.razorpay_order_id,
        payload.razorpay_payment_id,
        payload.razorpay_signature,
    ) else {
        return Err(AppError::missing_fields());
    };

    state
        .payments
        .verify_signature(&gateway_order, &payment_id, &signature)?;

    if let Some(order_id) = payload.order_id.as_deref() {
        order_service::mark_paid(state, user, order_id, &payment_id).await?;
    }

    Ok(PaymentVerification {
        verified: true,
        payment_id,
        order_id: payload.order_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(secret: Option<&str>) -> PaymentGateway {
        PaymentGateway::new(&PaymentConfig {
            key_id: Some("rzp_test_key".into()),
            key_secret: secret.map(|s| SecretString::from(s.to_string())),
            api_base: "http://127.0.0.1:9".into(),
            currency: "INR".into(),
        })
    }

    fn sign(secret: &str, message: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_matching_signature() {
        let signature = sign("s3cret", "order_1|pay_1");
        gateway(Some("s3cret"))
            .verify_signature("order_1", "pay_1", &signature)
            .unwrap();
    }

    #[test]
    fn rejects_tampered_signature() {
        let signature = sign("s3cret", "order_1|pay_2");
        let err = gateway(Some("s3cret"))
            .verify_signature("order_1", "pay_1", &signature)
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidSignature));

        let err = gateway(Some("s3cret"))
            .verify_signature("order_1", "pay_1", "zz-not-hex")
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidSignature));
    }

    #[tokio::test]
    async fn missing_secret_fails_on_first_use() {
        let err = gateway(None)
            .create_order(1000, "INR", "rcpt_1")
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotConfigured));
    }

    #[test]
    fn minor_units_round() {
        assert_eq!(to_minor_units(10.0), 1000);
        assert_eq!(to_minor_units(19.999), 2000);
        assert_eq!(to_minor_units(0.1 + 0.2), 30);
    }
}
