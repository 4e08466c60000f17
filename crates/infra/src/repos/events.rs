use chrono::{DateTime, Utc};
use sqlx::Result as SqlxResult;

use crate::{db::Db, models::EventRow, pagination::LimitOffset, trending::EventStats};

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub club_id: Option<i64>,
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub club_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub price_cents: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct UpdateEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub price_cents: Option<i32>,
}

#[derive(Clone)]
pub struct EventRepo {
    pool: Db,
}

impl EventRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: CreateEvent) -> SqlxResult<EventRow> {
        sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (club_id, title, description, location, start_time, end_time,
                                capacity, price_cents, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'draft')
            RETURNING id, club_id, title, description, location, start_time, end_time,
                      capacity, price_cents, status, created_at, updated_at
            "#,
        )
        .bind(data.club_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.location)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.capacity)
        .bind(data.price_cents)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, id: i64) -> SqlxResult<Option<EventRow>> {
        sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, club_id, title, description, location, start_time, end_time,
                   capacity, price_cents, status, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list(
        &self,
        filter: EventFilter,
        page: Option<LimitOffset>,
    ) -> SqlxResult<Vec<EventRow>> {
        let p = page.unwrap_or_default();

        let mut query = sqlx::QueryBuilder::new(
            "SELECT id, club_id, title, description, location, start_time, end_time, \
             capacity, price_cents, status, created_at, updated_at FROM events WHERE 1=1",
        );

        if let Some(club_id) = filter.club_id {
            query.push(" AND club_id = ");
            query.push_bind(club_id);
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ");
            query.push_bind(status.clone());
        }
        if let Some(from) = filter.from {
            query.push(" AND start_time >= ");
            query.push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND start_time <= ");
            query.push_bind(to);
        }

        query.push(" ORDER BY start_time ASC");
        query.push(" LIMIT ");
        query.push_bind(p.limit);
        query.push(" OFFSET ");
        query.push_bind(p.offset);

        query.build_query_as::<EventRow>().fetch_all(&self.pool).await
    }

    pub async fn update(&self, id: i64, data: UpdateEvent) -> SqlxResult<Option<EventRow>> {
        sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET title = $2, description = $3, location = $4, start_time = $5, end_time = $6,
                capacity = $7, price_cents = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING id, club_id, title, description, location, start_time, end_time,
                      capacity, price_cents, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.location)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.capacity)
        .bind(data.price_cents)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_status(&self, id: i64, status: &str) -> SqlxResult<Option<EventRow>> {
        sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, club_id, title, description, location, start_time, end_time,
                      capacity, price_cents, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i64) -> SqlxResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Snapshot of aggregated stats for every published event, the input to
    /// the trending ranking.
    pub async fn published_event_stats(&self) -> SqlxResult<Vec<EventStats>> {
        sqlx::query_as::<_, EventStats>(
            r#"
            SELECT e.id AS event_id,
                   e.start_time,
                   e.capacity,
                   (SELECT COUNT(*) FROM event_registrations r
                     WHERE r.event_id = e.id AND r.status = 'interested') AS interested_count,
                   (SELECT COUNT(*) FROM event_registrations r
                     WHERE r.event_id = e.id AND r.status = 'confirmed') AS confirmed_count,
                   (SELECT COALESCE(AVG(rating), 0)::float8 FROM event_ratings er
                     WHERE er.event_id = e.id) AS average_rating,
                   (SELECT COUNT(*) FROM event_ratings er
                     WHERE er.event_id = e.id) AS rating_count
            FROM events e
            WHERE e.status = 'published'
            ORDER BY e.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
