use sqlx::Result as SqlxResult;

use crate::db::Db;
use crate::models::{ClubManagerRow, ClubRow};

pub struct ClubManagerRepo {
    pool: Db,
}

impl ClubManagerRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    /// Assign a manager to a club. Idempotent for an existing pair.
    pub async fn add(&self, club_id: i64, user_id: i64) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO club_managers (club_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (club_id, user_id) DO NOTHING
            "#,
        )
        .bind(club_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn is_club_manager(&self, user_id: i64, club_id: i64) -> SqlxResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM club_managers WHERE user_id = $1 AND club_id = $2)",
        )
        .bind(user_id)
        .bind(club_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// All clubs the user manages, for the manager dashboard.
    pub async fn clubs_for_user(&self, user_id: i64) -> SqlxResult<Vec<ClubRow>> {
        sqlx::query_as::<_, ClubRow>(
            r#"
            SELECT c.id, c.name, c.description, c.category, c.status, c.created_at, c.updated_at
            FROM clubs c
            JOIN club_managers cm ON cm.club_id = c.id
            WHERE cm.user_id = $1
            ORDER BY c.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn managers_for_club(&self, club_id: i64) -> SqlxResult<Vec<ClubManagerRow>> {
        sqlx::query_as::<_, ClubManagerRow>(
            r#"
            SELECT id, club_id, user_id, created_at
            FROM club_managers
            WHERE club_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await
    }
}
