//! Authentication Service
//!
//! Checks admin credentials and issues/verifies the signed session tokens
//! carried in the session cookie.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::store::{Collection, Filter, StoreError};
use crate::domain::Admin;
use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;
use crate::shared::password::verify_password_blocking;

/// Public message for every rejected session token.
pub const INVALID_SESSION_MESSAGE: &str = "Invalid or expired session";

/// Public message for a wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Look the admin up by username and check the password.
    ///
    /// Unknown username is `NotFound`; a wrong password is `Credentials`.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Admin, AppError>;

    /// Sign a session token for `admin_id`.
    fn issue_token(&self, admin_id: &ObjectId) -> Result<String, AppError>;

    /// Check signature and expiry and return the claims.
    fn verify_token(&self, token: &str) -> Result<Claims, AppError>;

    /// Token lifetime in seconds.
    fn token_lifetime(&self) -> i64;
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Admin the session belongs to
    pub admin_id: String,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn admin_id(&self) -> Result<ObjectId, AppError> {
        self.admin_id
            .parse()
            .map_err(|_| AppError::credentials(INVALID_SESSION_MESSAGE, "malformed adminId claim"))
    }
}

/// AuthService implementation over the `admins` collection
pub struct AuthServiceImpl {
    admins: Arc<dyn Collection>,
    jwt_settings: JwtSettings,
    query_timeout: Duration,
}

impl AuthServiceImpl {
    /// Create a new AuthServiceImpl
    pub fn new(admins: Arc<dyn Collection>, jwt_settings: JwtSettings, query_timeout: Duration) -> Self {
        Self {
            admins,
            jwt_settings,
            query_timeout,
        }
    }

    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, AppError> {
        let filter = Filter::eq("username", username.trim());
        let found = tokio::time::timeout(self.query_timeout, self.admins.find_one(&filter))
            .await
            .map_err(|_| StoreError::Timeout(self.query_timeout))??;

        found
            .map(|doc| {
                serde_json::from_value(serde_json::Value::Object(doc))
                    .map_err(|e| AppError::system("Stored admin could not be decoded", e.to_string()))
            })
            .transpose()
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Admin, AppError> {
        let admin = self
            .find_admin(username)
            .await?
            .ok_or_else(|| AppError::not_found("Admin", username))?;

        let matches =
            verify_password_blocking(password.to_string(), admin.password_hash.clone()).await?;
        if !matches {
            tracing::debug!(admin_id = %admin.id, "Password mismatch");
            return Err(AppError::credentials(
                INVALID_CREDENTIALS_MESSAGE,
                format!("password mismatch for {}", admin.username),
            ));
        }

        Ok(admin)
    }

    fn issue_token(&self, admin_id: &ObjectId) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            admin_id: admin_id.to_string(),
            iat: now,
            exp: now + self.jwt_settings.expiry_seconds,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AppError::system("Token generation failed", e.to_string()))
    }

    fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::credentials(INVALID_SESSION_MESSAGE, "token expired")
            }
            _ => AppError::credentials(INVALID_SESSION_MESSAGE, format!("invalid token: {}", e)),
        })?;

        Ok(token_data.claims)
    }

    fn token_lifetime(&self) -> i64 {
        self.jwt_settings.expiry_seconds
    }
}
