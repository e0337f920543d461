//! Login flow: email plus password in, signed token plus profile out.

use std::sync::Arc;

use tracing::info;

use crate::common::DomainError;

use super::jwt::JwtService;
use super::models::{AdminDto, LoginResponse};
use super::password::verify_password;
use super::store::AdminStore;

pub struct AuthService {
    admins: Arc<dyn AdminStore>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(admins: Arc<dyn AdminStore>, jwt: Arc<JwtService>) -> Self {
        Self { admins, jwt }
    }

    /// Both an unknown email and a wrong password produce the same error, so
    /// login responses never confirm which emails exist.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, DomainError> {
        let Some(admin) = self.admins.find_by_email(email.trim()).await? else {
            return Err(invalid_credentials());
        };
        if !verify_password(password, &admin.password_hash) {
            return Err(invalid_credentials());
        }

        let token = self.jwt.sign(&admin)?;
        info!(admin_id = admin.id, "admin logged in");
        Ok(LoginResponse {
            token,
            admin: AdminDto::from(&admin),
        })
    }
}

fn invalid_credentials() -> DomainError {
    DomainError::Validation("invalid email or password".to_string())
}
