use sqlx::Result as SqlxResult;

use crate::{db::Db, models::UserRow};

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub password_hash: String,
    pub role: String,
}

#[derive(Clone)]
pub struct UserRepo {
    pool: Db,
}

impl UserRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: CreateUser) -> SqlxResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, first_name, last_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, first_name, last_name, password_hash, role,
                      email_verified, is_active, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_by_id(&self, id: i64) -> SqlxResult<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, first_name, last_name, password_hash, role,
                   email_verified, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_by_email(&self, email: &str) -> SqlxResult<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, first_name, last_name, password_hash, role,
                   email_verified, is_active, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn mark_email_verified(&self, id: i64) -> SqlxResult<()> {
        sqlx::query("UPDATE users SET email_verified = true, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password_hash(&self, id: i64, password_hash: &str) -> SqlxResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
