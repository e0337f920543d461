//! HS256 token signing and verification for admin sessions.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::common::DomainError;

use super::models::Admin;

const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Admin id.
    pub sub: i64,
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, admin: &Admin) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(anyhow::anyhow!("token signing failed: {e}")))
    }

    /// None for anything but a well-formed, unexpired token signed by us.
    pub fn verify(&self, token: &str) -> Option<AdminClaims> {
        decode::<AdminClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Admin {
        let now = Utc::now();
        Admin {
            id: 7,
            email: "ops@example.com".to_string(),
            password_hash: String::new(),
            name: "Ops".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.sign(&admin()).unwrap();
        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "ops@example.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtService::new("secret-a").sign(&admin()).unwrap();
        assert!(JwtService::new("secret-b").verify(&token).is_none());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(JwtService::new("secret").verify("not.a.token").is_none());
    }
}
