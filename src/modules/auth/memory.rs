//! In-memory directory and verification store. Backs the integration tests
//! and local development without a MySQL instance; semantics mirror the SQL
//! implementations in `crud.rs`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::interface::{Result, UserDirectory, VerificationStore};
use super::model::{EmailVerification, NewUser, User};

pub struct MemoryUserDirectory {
    users: RwLock<HashMap<i64, User>>,
    next_id: AtomicI64,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn create(&self, user: &NewUser) -> Result<User> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            profile: user.profile.clone(),
            birthdate: None,
            refresh_token_hash: None,
            refresh_token_expiry: None,
        };
        self.users.write().await.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn set_refresh_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expiry: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.refresh_token_hash = Some(token_hash.to_string());
            user.refresh_token_expiry = Some(expiry);
        }
        Ok(())
    }

    async fn clear_refresh_token(&self, user_id: i64) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.refresh_token_hash = None;
            user.refresh_token_expiry = None;
        }
        Ok(())
    }
}

pub struct MemoryVerificationStore {
    rows: RwLock<HashMap<String, EmailVerification>>,
    next_id: AtomicI64,
}

impl MemoryVerificationStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl VerificationStore for MemoryVerificationStore {
    async fn upsert_code(&self, email: &str, code: &str) -> Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.write().await.insert(
            email.to_string(),
            EmailVerification {
                id,
                email: email.to_string(),
                code: code.to_string(),
                verified: false,
            },
        );
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<EmailVerification>> {
        Ok(self.rows.read().await.get(email).cloned())
    }

    async fn mark_verified(&self, email: &str) -> Result<()> {
        if let Some(row) = self.rows.write().await.get_mut(email) {
            row.verified = true;
        }
        Ok(())
    }
}
