use sqlx::Result as SqlxResult;

use crate::db::Db;
use crate::models::EventRatingRow;

pub struct RatingRepo {
    pool: Db,
}

impl RatingRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    /// One rating per (user, event); resubmission overwrites in place.
    pub async fn upsert(
        &self,
        event_id: i64,
        user_id: i64,
        rating: i32,
        comment: Option<String>,
    ) -> SqlxResult<EventRatingRow> {
        sqlx::query_as::<_, EventRatingRow>(
            r#"
            INSERT INTO event_ratings (event_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (event_id, user_id)
            DO UPDATE SET rating = EXCLUDED.rating, comment = EXCLUDED.comment, updated_at = NOW()
            RETURNING id, event_id, user_id, rating, comment, created_at, updated_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_for_event(&self, event_id: i64) -> SqlxResult<Vec<EventRatingRow>> {
        sqlx::query_as::<_, EventRatingRow>(
            r#"
            SELECT id, event_id, user_id, rating, comment, created_at, updated_at
            FROM event_ratings
            WHERE event_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
    }
}
