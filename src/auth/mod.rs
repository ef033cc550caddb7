pub mod session;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use session::{JwtSessionValidator, PgUserDirectory, Session, SessionValidator, UserDirectory};

/// Bearer token claims. `sub` is the user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Sign `claims` with the shared HS256 secret.
///
/// Tokens are normally minted by the auth service; this is the same signing
/// path, used by tooling and tests.
pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry. Any failure means "no session".
pub fn decode_jwt(token: &str, secret: &str) -> Option<Claims> {
    if secret.is_empty() {
        return None;
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    match decode::<Claims>(token, &decoding_key, &Validation::default()) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("Rejected bearer token: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn generated_token_decodes() {
        let user_id = Uuid::new_v4();
        let token = generate_jwt(&Claims::new(user_id, 1), SECRET).unwrap();

        let claims = decode_jwt(&token, SECRET).expect("valid token");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt(&Claims::new(Uuid::new_v4(), 1), SECRET).unwrap();
        assert!(decode_jwt(&token, "other-secret").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert!(decode_jwt(&token, SECRET).is_none());
    }

    #[test]
    fn garbage_and_empty_secret() {
        assert!(decode_jwt("not-a-jwt", SECRET).is_none());
        assert!(matches!(
            generate_jwt(&Claims::new(Uuid::new_v4(), 1), ""),
            Err(JwtError::InvalidSecret)
        ));
    }
}
