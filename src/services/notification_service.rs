//! Order notification emails over SMTP.
//!
//! Sending is best effort: callers log a failure and carry on.

use std::fmt::Write as _;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::{config::MailConfig, models::Order};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

struct Smtp {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    vendor_email: String,
}

pub struct Notifier {
    smtp: Option<Smtp>,
}

impl Notifier {
    pub fn smtp(config: &MailConfig) -> Result<Self, NotifyError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            smtp: Some(Smtp {
                mailer,
                from_address: config.from_address.clone(),
                vendor_email: config.vendor_email.clone(),
            }),
        })
    }

    pub fn disabled() -> Self {
        Self { smtp: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.smtp.is_some()
    }

    /// Tell the vendor about a new order and send the customer a receipt.
    pub async fn order_placed(&self, order: &Order) -> Result<(), NotifyError> {
        let Some(smtp) = &self.smtp else {
            tracing::debug!(order_id = %order.id, "notifications disabled, skipping order email");
            return Ok(());
        };

        let body = order_summary(order);
        smtp.send(
            &smtp.vendor_email,
            &format!("New order {} from {}", order.id, order.customer.name),
            &body,
        )
        .await?;
        smtp.send(
            &order.customer.email,
            &format!("Your order {} has been received", order.id),
            &body,
        )
        .await
    }
}

impl Smtp {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.mailer.send(email).await?;
        tracing::info!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}

pub fn order_summary(order: &Order) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Order: {}", order.id);
    let _ = writeln!(out, "Status: {}", order.status.as_str());
    let _ = writeln!(out, "Payment method: {}", order.payment_method);
    let _ = writeln!(out);
    let _ = writeln!(out, "Customer: {} <{}>", order.customer.name, order.customer.email);
    if !order.customer.phone.is_empty() {
        let _ = writeln!(out, "Phone: {}", order.customer.phone);
    }
    if !order.customer.address.is_empty() {
        let _ = writeln!(out, "Ship to: {}", order.customer.address);
    }
    let _ = writeln!(out);
    for item in &order.items {
        let _ = writeln!(
            out,
            "  {} x{} @ {:.2} = {:.2}",
            item.name,
            item.quantity,
            item.price,
            item.line_total()
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Subtotal: {:.2}", order.totals.subtotal);
    let _ = writeln!(out, "Tax: {:.2}", order.totals.tax);
    let _ = writeln!(out, "Shipping: {:.2}", order.totals.shipping);
    let _ = write!(out, "Total: {:.2}", order.totals.total);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, OrderItem, OrderStatus, OrderTotals};
    use chrono::Utc;

    fn order() -> Order {
        let items = vec![OrderItem {
            id: "p1".into(),
            name: "Desk Lamp".into(),
            price: 12.5,
            quantity: 2,
            image: None,
        }];
        Order {
            id: "665f1c2e9b1e8a0012345678".into(),
            user_id: "u1".into(),
            totals: OrderTotals::from_items(&items),
            items,
            customer: Customer {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                phone: String::new(),
                address: "1 Loop Rd".into(),
            },
            payment_method: "cod".into(),
            status: OrderStatus::Pending,
            payment_id: None,
            payment_status: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn summary_lists_lines_and_totals() {
        let text = order_summary(&order());
        assert!(text.contains("Desk Lamp x2 @ 12.50 = 25.00"));
        assert!(text.contains("Total: 25.00"));
        assert!(text.contains("Ship to: 1 Loop Rd"));
        assert!(!text.contains("Phone:"));
    }

    #[tokio::test]
    async fn disabled_notifier_is_a_no_op() {
        let notifier = Notifier::disabled();
        assert!(!notifier.is_enabled());
        notifier.order_placed(&order()).await.unwrap();
    }
}
