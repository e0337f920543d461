//! Admin account persistence.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::common::DomainError;

use super::models::Admin;

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Admin>, DomainError>;

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Admin, DomainError>;
}

pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, DomainError> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Admin>, DomainError> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Admin, DomainError> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DomainError::Conflict(format!("admin {email} already exists"))
            }
            _ => DomainError::Database(e),
        })?;
        Ok(admin)
    }
}

#[derive(Default)]
pub struct MemoryAdminStore {
    admins: Mutex<HashMap<i64, Admin>>,
    next_id: AtomicI64,
}

impl MemoryAdminStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminStore for MemoryAdminStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, DomainError> {
        let admins = self.admins.lock().unwrap_or_else(|e| e.into_inner());
        Ok(admins.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Admin>, DomainError> {
        let admins = self.admins.lock().unwrap_or_else(|e| e.into_inner());
        Ok(admins.get(&id).cloned())
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Admin, DomainError> {
        let mut admins = self.admins.lock().unwrap_or_else(|e| e.into_inner());
        if admins.values().any(|a| a.email == email) {
            return Err(DomainError::Conflict(format!(
                "admin {email} already exists"
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let admin = Admin {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        admins.insert(id, admin.clone());
        Ok(admin)
    }
}
