use std::sync::Arc;

use secrecy::SecretString;

use crate::{
    config::AppConfig,
    db::Database,
    services::{notification_service::Notifier, payment_service::PaymentGateway},
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub jwt_secret: SecretString,
    pub notifier: Arc<Notifier>,
    pub payments: Arc<PaymentGateway>,
}

impl AppState {
    /// The database handle is created unconnected; it connects on first use.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let notifier = match &config.mail {
            Some(mail) => Notifier::smtp(mail)?,
            None => Notifier::disabled(),
        };
        Ok(Self {
            db: Arc::new(Database::new(config.db_settings())),
            jwt_secret: config.jwt_secret.clone(),
            notifier: Arc::new(notifier),
            payments: Arc::new(PaymentGateway::new(&config.payment)),
        })
    }
}
