use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

use super::interface::{Result, UserDirectory, VerificationStore};
use super::model::{EmailVerification, NewUser, User};

/// MySQL-backed user directory.
#[derive(Clone)]
pub struct SqlUserDirectory {
    pool: Pool<MySql>,
}

impl SqlUserDirectory {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for SqlUserDirectory {
    async fn create(&self, user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, profile)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_id() as i64,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            profile: user.profile.clone(),
            birthdate: None,
            refresh_token_hash: None,
            refresh_token_expiry: None,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_refresh_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expiry: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET refresh_token_hash = ?, refresh_token_expiry = ? WHERE id = ?",
        )
        .bind(token_hash)
        .bind(expiry)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_refresh_token(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE users SET refresh_token_hash = NULL, refresh_token_expiry = NULL WHERE id = ?",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// MySQL-backed verification store, one row per email.
#[derive(Clone)]
pub struct SqlVerificationStore {
    pool: Pool<MySql>,
}

impl SqlVerificationStore {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationStore for SqlVerificationStore {
    async fn upsert_code(&self, email: &str, code: &str) -> Result<()> {
        // Delete-then-insert so a re-requested code always starts unverified.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM email_verifications WHERE email = ?")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO email_verifications (email, code, verified) VALUES (?, ?, FALSE)")
            .bind(email)
            .bind(code)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<EmailVerification>> {
        let row = sqlx::query_as::<_, EmailVerification>(
            "SELECT * FROM email_verifications WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn mark_verified(&self, email: &str) -> Result<()> {
        sqlx::query("UPDATE email_verifications SET verified = TRUE WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
