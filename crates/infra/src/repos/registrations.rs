use sqlx::Result as SqlxResult;

use crate::db::Db;
use crate::models::{RegistrationRow, RegistrationWithEventRow};

pub struct RegistrationRepo {
    pool: Db,
}

impl RegistrationRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn get_by_user_and_event(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> SqlxResult<Option<RegistrationRow>> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, event_id, user_id, status, created_at, updated_at
            FROM event_registrations
            WHERE user_id = $1 AND event_id = $2
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_with_event(&self, id: i64) -> SqlxResult<Option<RegistrationWithEventRow>> {
        sqlx::query_as::<_, RegistrationWithEventRow>(
            r#"
            SELECT r.id, r.event_id, r.user_id, r.status,
                   e.club_id, e.start_time AS event_start_time, e.capacity AS event_capacity
            FROM event_registrations r
            JOIN events e ON e.id = r.event_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(
        &self,
        event_id: i64,
        user_id: i64,
        status: &str,
    ) -> SqlxResult<RegistrationRow> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"
            INSERT INTO event_registrations (event_id, user_id, status)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, user_id, status, created_at, updated_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_status(&self, id: i64, status: &str) -> SqlxResult<Option<RegistrationRow>> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"
            UPDATE event_registrations
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, event_id, user_id, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i64) -> SqlxResult<bool> {
        let result = sqlx::query("DELETE FROM event_registrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_event(&self, event_id: i64) -> SqlxResult<Vec<RegistrationRow>> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, event_id, user_id, status, created_at, updated_at
            FROM event_registrations
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_for_user(&self, user_id: i64) -> SqlxResult<Vec<RegistrationRow>> {
        sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, event_id, user_id, status, created_at, updated_at
            FROM event_registrations
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn confirmed_count(&self, event_id: i64) -> SqlxResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1 AND status = 'confirmed'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
    }
}
