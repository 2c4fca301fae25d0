use std::env;

use anyhow::Context;
use secrecy::SecretString;

use crate::db::DbSettings;

pub const DEFAULT_DATABASE: &str = "ecommerce";
pub const DEFAULT_PAYMENT_API: &str = "https://api.razorpay.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub payment: PaymentConfig,
    pub mail: Option<MailConfig>,
}

/// Gateway key pair. Either half missing makes payment endpoints fail on
/// first use rather than at startup.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<SecretString>,
    pub api_base: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
    pub vendor_email: String,
}

impl AppConfig {
    pub fn new(mongodb_uri: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            mongodb_uri: mongodb_uri.into(),
            mongodb_db: DEFAULT_DATABASE.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: SecretString::from(jwt_secret.into()),
            payment: PaymentConfig {
                key_id: None,
                key_secret: None,
                api_base: DEFAULT_PAYMENT_API.to_string(),
                currency: "INR".to_string(),
            },
            mail: None,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let mongodb_uri = env::var("MONGODB_URI").context("MONGODB_URI must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let mut config = Self::new(mongodb_uri, jwt_secret);

        if let Ok(db) = env::var("MONGODB_DB") {
            config.mongodb_db = db;
        }
        if let Ok(host) = env::var("APP_HOST") {
            config.host = host;
        }
        config.port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(config.port);

        config.payment.key_id = env::var("RAZORPAY_KEY_ID").ok();
        config.payment.key_secret = env::var("RAZORPAY_KEY_SECRET").ok().map(SecretString::from);
        if let Ok(base) = env::var("RAZORPAY_API_BASE") {
            config.payment.api_base = base;
        }
        if let Ok(currency) = env::var("PAYMENT_CURRENCY") {
            config.payment.currency = currency;
        }

        config.mail = MailConfig::from_env()?;
        if config.mail.is_none() {
            tracing::warn!("SMTP_HOST or VENDOR_EMAIL not set, order notifications are disabled");
        }

        Ok(config)
    }

    pub fn db_settings(&self) -> DbSettings {
        DbSettings::new(self.mongodb_uri.clone(), self.mongodb_db.clone())
    }
}

/// Database settings alone, for the maintenance binaries.
pub fn database_from_env() -> anyhow::Result<DbSettings> {
    let mongodb_uri = env::var("MONGODB_URI").context("MONGODB_URI must be set")?;
    let mongodb_db = env::var("MONGODB_DB").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
    Ok(DbSettings::new(mongodb_uri, mongodb_db))
}

impl MailConfig {
    fn from_env() -> anyhow::Result<Option<Self>> {
        let (Ok(smtp_host), Ok(vendor_email)) = (env::var("SMTP_HOST"), env::var("VENDOR_EMAIL"))
        else {
            return Ok(None);
        };

        let smtp_port = match env::var("SMTP_PORT") {
            Ok(port) => port.parse::<u16>().context("SMTP_PORT must be a port number")?,
            Err(_) => 587,
        };
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = SecretString::from(env::var("SMTP_PASSWORD").unwrap_or_default());
        let from_address = env::var("SMTP_FROM").unwrap_or_else(|_| vendor_email.clone());

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_address,
            vendor_email,
        }))
    }
}
