use sqlx::Result as SqlxResult;

use crate::db::Db;
use crate::models::JoinRequestRow;

pub struct JoinRequestRepo {
    pool: Db,
}

impl JoinRequestRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    /// A second pending request for the same (user, club) trips the partial
    /// unique index and surfaces as a database unique violation.
    pub async fn create(
        &self,
        club_id: i64,
        user_id: i64,
        message: Option<String>,
    ) -> SqlxResult<JoinRequestRow> {
        sqlx::query_as::<_, JoinRequestRow>(
            r#"
            INSERT INTO club_join_requests (club_id, user_id, message, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, club_id, user_id, message, status, created_at, updated_at
            "#,
        )
        .bind(club_id)
        .bind(user_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, id: i64) -> SqlxResult<Option<JoinRequestRow>> {
        sqlx::query_as::<_, JoinRequestRow>(
            r#"
            SELECT id, club_id, user_id, message, status, created_at, updated_at
            FROM club_join_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_pending_for_club(&self, club_id: i64) -> SqlxResult<Vec<JoinRequestRow>> {
        sqlx::query_as::<_, JoinRequestRow>(
            r#"
            SELECT id, club_id, user_id, message, status, created_at, updated_at
            FROM club_join_requests
            WHERE club_id = $1 AND status = 'pending'
            ORDER BY created_at ASC
            "#,
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_status(&self, id: i64, status: &str) -> SqlxResult<Option<JoinRequestRow>> {
        sqlx::query_as::<_, JoinRequestRow>(
            r#"
            UPDATE club_join_requests
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, club_id, user_id, message, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }
}
