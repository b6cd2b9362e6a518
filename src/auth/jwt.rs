//! HS256 session tokens.

use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub id: String,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user_id: &str, ttl_secs: u64) -> Self {
        Claims {
            sub: user_id.to_string(),
            id: user_id.to_string(),
            exp: Utc::now().timestamp() + ttl_secs as i64,
        }
    }
}

pub fn sign(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
}

/// Decode and check signature and expiry.
pub fn verify(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected session token");
            AppError::Unauthorized(None)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_token_verifies() {
        let claims = Claims::for_user("u-1", 60);
        let token = sign(&claims, "secret").unwrap();
        assert_eq!(verify(&token, "secret").unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = sign(&Claims::for_user("u-1", 60), "secret").unwrap();
        assert!(matches!(verify(&token, "other"), Err(AppError::Unauthorized(None))));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let mut claims = Claims::for_user("u-1", 0);
        claims.exp = Utc::now().timestamp() - 3600;
        let token = sign(&claims, "secret").unwrap();
        assert!(verify(&token, "secret").is_err());
    }
}
