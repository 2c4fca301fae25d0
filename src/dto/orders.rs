use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{present, require},
    error::{AppError, AppResult},
    models::{Customer, OrderItem, OrderStatus, OrderTotals},
};

pub const GUEST_USER: &str = "guest";

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Never trusted: the owner comes from the token, else the order is a
    /// guest order.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default)]
    pub customer: Option<CustomerInput>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub totals: Option<OrderTotals>,
}

/// What gets written for a new order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub customer: Customer,
    pub payment_method: String,
    pub status: OrderStatus,
    pub totals: OrderTotals,
}

impl CreateOrderRequest {
    /// `user_id` is the token's user; without one the order belongs to
    /// [`GUEST_USER`].
    pub fn into_new_order(self, user_id: Option<String>) -> AppResult<NewOrder> {
        let (Some(items), Some(customer)) = (self.items, self.customer) else {
            return Err(AppError::missing_fields());
        };
        require(!items.is_empty() && present(&customer.name) && present(&customer.email))?;

        if items.iter().any(|item| item.quantity <= 0) {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }

        let totals = self
            .totals
            .unwrap_or_else(|| OrderTotals::from_items(&items));

        Ok(NewOrder {
            user_id: user_id.unwrap_or_else(|| GUEST_USER.to_string()),
            items,
            customer: Customer {
                name: customer.name.unwrap_or_default(),
                email: customer.email.unwrap_or_default(),
                phone: customer.phone.unwrap_or_default(),
                address: customer.address.unwrap_or_default(),
            },
            payment_method: self
                .payment_method
                .unwrap_or_else(|| "cod".to_string()),
            status: OrderStatus::Pending,
            totals,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl UpdateOrderStatusRequest {
    /// Only the known statuses can be written.
    pub fn into_status(self) -> AppResult<OrderStatus> {
        match self.status {
            None => Err(AppError::missing_fields()),
            Some(status) if status.is_known() => Ok(status),
            Some(status) => Err(AppError::BadRequest(format!(
                "Unknown order status: {}",
                status.as_str()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CreateOrderRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_customer_is_rejected() {
        let err = request(r#"{"items":[{"id":"p1","name":"Lamp","price":5,"quantity":1}]}"#)
            .into_new_order(None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Required fields missing");
    }

    #[test]
    fn empty_items_are_rejected() {
        let err = request(r#"{"items":[],"customer":{"name":"Ada","email":"a@b.c"}}"#)
            .into_new_order(None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Required fields missing");
    }

    #[test]
    fn token_user_wins_over_body() {
        let order = request(
            r#"{"userId":"someone-else","items":[{"id":"p1","name":"Lamp","price":"5","quantity":2}],
                "customer":{"name":"Ada","email":"a@b.c"},"paymentMethod":"online"}"#,
        )
        .into_new_order(Some("u-42".into()))
        .unwrap();

        assert_eq!(order.user_id, "u-42");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.totals.total, 10.0);
        assert_eq!(order.payment_method, "online");
    }

    #[test]
    fn anonymous_orders_belong_to_guest() {
        let order = request(
            r#"{"items":[{"id":"p1","name":"Lamp","price":5,"quantity":1}],
                "customer":{"name":"Ada","email":"a@b.c"},
                "totals":{"subtotal":5,"tax":0.9,"shipping":2,"total":7.9}}"#,
        )
        .into_new_order(None)
        .unwrap();
        assert_eq!(order.user_id, GUEST_USER);
        assert_eq!(order.totals.total, 7.9);
    }

    #[test]
    fn body_user_id_is_ignored_without_a_token() {
        let order = request(
            r#"{"userId":"665f00000000000000000042",
                "items":[{"id":"p1","name":"Lamp","price":5,"quantity":1}],
                "customer":{"name":"Mallory","email":"m@example.com"}}"#,
        )
        .into_new_order(None)
        .unwrap();
        assert_eq!(order.user_id, GUEST_USER);
    }

    #[test]
    fn status_updates_accept_known_values_only() {
        let update: UpdateOrderStatusRequest =
            serde_json::from_str(r#"{"status":"Shipped"}"#).unwrap();
        assert_eq!(update.into_status().unwrap(), OrderStatus::Shipped);

        let update: UpdateOrderStatusRequest =
            serde_json::from_str(r#"{"status":"returned"}"#).unwrap();
        assert!(update.into_status().is_err());

        let update: UpdateOrderStatusRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            update.into_status().unwrap_err().to_string(),
            "Required fields missing"
        );
    }
}
