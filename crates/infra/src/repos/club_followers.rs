use sqlx::Result as SqlxResult;

use crate::db::Db;
use crate::models::ClubRow;

pub struct ClubFollowerRepo {
    pool: Db,
}

impl ClubFollowerRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    /// Follow is a one-click toggle, so duplicates are silently absorbed.
    pub async fn follow(&self, club_id: i64, user_id: i64) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO club_followers (club_id, user_id)
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

    /// Returns whether a follow row was actually removed.
    pub async fn unfollow(&self, club_id: i64, user_id: i64) -> SqlxResult<bool> {
        let result = sqlx::query("DELETE FROM club_followers WHERE club_id = $1 AND user_id = $2")
            .bind(club_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn followed_clubs(&self, user_id: i64) -> SqlxResult<Vec<ClubRow>> {
        sqlx::query_as::<_, ClubRow>(
            r#"
            SELECT c.id, c.name, c.description, c.category, c.status, c.created_at, c.updated_at
            FROM clubs c
            JOIN club_followers cf ON cf.club_id = c.id
            WHERE cf.user_id = $1
            ORDER BY c.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn follower_count(&self, club_id: i64) -> SqlxResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM club_followers WHERE club_id = $1")
            .bind(club_id)
            .fetch_one(&self.pool)
            .await
    }
}
