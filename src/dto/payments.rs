use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::codec::lenient;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Major units, e.g. rupees.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrderResponse {
    pub order_id: String,
    /// Minor units, as the checkout widget expects.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default, alias = "razorpay_order_id")]
    pub razorpay_order_id: Option<String>,
    #[serde(default, alias = "razorpay_payment_id")]
    pub razorpay_payment_id: Option<String>,
    #[serde(default, alias = "razorpay_signature")]
    pub razorpay_signature: Option<String>,
    /// Store order to mark as paid once the signature checks out.
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub verified: bool,
    pub payment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}
