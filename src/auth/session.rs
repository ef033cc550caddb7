use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

/// An authenticated session and the profile of the user behind it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

/// Resolves an opaque bearer token to a session.
///
/// `Ok(None)` means the token is invalid, expired, or belongs to no user.
/// `Err` is reserved for infrastructure failures.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<Option<Session>, DatabaseError>;
}

/// Looks up user profiles by id.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, sex, weight, height, date_of_birth FROM nc_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

/// Validates HS256 bearer tokens and loads the user named by `sub`.
pub struct JwtSessionValidator<D> {
    directory: D,
    secret: String,
}

impl<D: UserDirectory> JwtSessionValidator<D> {
    pub fn new(directory: D, secret: impl Into<String>) -> Self {
        Self {
            directory,
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl<D: UserDirectory> SessionValidator for JwtSessionValidator<D> {
    async fn validate(&self, token: &str) -> Result<Option<Session>, DatabaseError> {
        let Some(claims) = super::decode_jwt(token, &self.secret) else {
            return Ok(None);
        };

        let Some(user) = self.directory.find_user(claims.sub).await? else {
            tracing::warn!("Token for unknown user {}", claims.sub);
            return Ok(None);
        };

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or_else(Utc::now);

        Ok(Some(Session { user, expires_at }))
    }
}
