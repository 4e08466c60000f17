use chrono::{DateTime, Utc};
use sqlx::Result as SqlxResult;
use uuid::Uuid;

use crate::db::Db;
use crate::models::{AuthTokenRow, RefreshTokenRow};

pub struct RefreshTokenRepo {
    pool: Db,
}

impl RefreshTokenRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> SqlxResult<RefreshTokenRow> {
        sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, token, user_id, expires_at, revoked, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, token: Uuid) -> SqlxResult<Option<RefreshTokenRow>> {
        sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, token, user_id, expires_at, revoked, created_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn revoke(&self, token: Uuid) -> SqlxResult<bool> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET revoked = true WHERE token = $1 AND NOT revoked")
                .bind(token)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Used after a password reset to force every session to re-authenticate.
    pub async fn revoke_all_for_user(&self, user_id: i64) -> SqlxResult<u64> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET revoked = true WHERE user_id = $1 AND NOT revoked")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}

pub struct AuthTokenRepo {
    pool: Db,
}

impl AuthTokenRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        kind: &str,
        expires_at: DateTime<Utc>,
    ) -> SqlxResult<AuthTokenRow> {
        sqlx::query_as::<_, AuthTokenRow>(
            r#"
            INSERT INTO auth_tokens (token, user_id, kind, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, token, user_id, kind, expires_at, consumed, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(kind)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Atomically consume a live one-time token of the given kind. Returns
    /// None when the token is unknown, expired, the wrong kind, or already
    /// spent.
    pub async fn consume(&self, token: Uuid, kind: &str) -> SqlxResult<Option<AuthTokenRow>> {
        sqlx::query_as::<_, AuthTokenRow>(
            r#"
            UPDATE auth_tokens
            SET consumed = true
            WHERE token = $1 AND kind = $2 AND NOT consumed AND expires_at > NOW()
            RETURNING id, token, user_id, kind, expires_at, consumed, created_at
            "#,
        )
        .bind(token)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await
    }
}
