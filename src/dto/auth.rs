use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{present, require},
    error::{AppError, AppResult},
    models::{Role, User},
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        require(present(&self.name) && present(&self.email) && present(&self.password))?;
        if !self.email.as_deref().is_some_and(|e| e.contains('@')) {
            return Err(AppError::BadRequest("Invalid email address".into()));
        }
        if self.password.as_deref().is_some_and(|p| p.len() < MIN_PASSWORD_LEN) {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_validation() {
        let ok: RegisterRequest = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.com","password":"hunter22"}"#,
        )
        .unwrap();
        assert!(ok.validate().is_ok());

        let missing: RegisterRequest =
            serde_json::from_str(r#"{"email":"ada@example.com","password":"hunter22"}"#).unwrap();
        assert_eq!(
            missing.validate().unwrap_err().to_string(),
            "Required fields missing"
        );

        let short: RegisterRequest =
            serde_json::from_str(r#"{"name":"Ada","email":"ada@example.com","password":"abc"}"#)
                .unwrap();
        assert!(short.validate().is_err());
    }
}
