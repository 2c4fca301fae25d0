use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use bson::doc;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use secrecy::ExposeSecret;

use crate::{
    db::Collection,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Role, User},
    repository::{self, Availability},
    routes::params::ListQuery,
    state::AppState,
};

pub const TOKEN_TTL_HOURS: i64 = 24;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(user: &User, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Creates a user account; `role` is only ever set by the seeder.
pub async fn create_account(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> AppResult<User> {
    let email = email.trim().to_lowercase();
    if repository::find_by::<User>(&state.db, doc! { "email": &email })
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(password)?;
    let user: User = repository::insert(
        &state.db,
        doc! {
            "name": name.trim(),
            "email": &email,
            "password": password_hash,
            "role": role.as_str(),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "user registered");
    Ok(user)
}

pub async fn register_user(state: &AppState, payload: RegisterRequest) -> AppResult<User> {
    payload.validate()?;
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;
    create_account(
        state,
        &name.unwrap_or_default(),
        &email.unwrap_or_default(),
        &password.unwrap_or_default(),
        Role::User,
    )
    .await
}

/// Only accounts stored in the users collection can sign in.
pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<LoginResponse> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::missing_fields());
    };
    let email = email.trim().to_lowercase();

    let user = repository::find_by::<User>(&state.db, doc! { "email": &email })
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    if !verify_password(&password, &user.password_hash) {
        tracing::info!(email = %email, "login rejected");
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let token = issue_token(&user, state.jwt_secret.expose_secret())?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(LoginResponse {
        token: format!("Bearer {}", token),
        user,
    })
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: &ListQuery,
) -> AppResult<Vec<User>> {
    ensure_admin(user)?;
    let options = query.list_options(Some(doc! { "createdAt": -1 }));
    Ok(repository::list::<User>(&state.db, doc! {}, options)
        .await
        .or_empty(Collection::Users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_token;

    fn user(role: Role) -> User {
        User {
            id: "665f00000000000000000042".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-hash"));
    }

    #[test]
    fn token_carries_identity_and_role() {
        let token = issue_token(&user(Role::Admin), "test-secret").unwrap();
        let auth = decode_token(&token, "test-secret").unwrap();
        assert_eq!(auth.user_id, "665f00000000000000000042");
        assert_eq!(auth.email, "ada@example.com");
        assert!(auth.is_admin());

        assert!(decode_token(&token, "other-secret").is_err());
    }
}
