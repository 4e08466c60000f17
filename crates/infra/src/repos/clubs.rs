use sqlx::Result as SqlxResult;

use crate::{db::Db, models::ClubRow, pagination::LimitOffset};

#[derive(Debug, Clone)]
pub struct CreateClub {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateClubProfile {
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Clone)]
pub struct ClubRepo {
    pool: Db,
}

impl ClubRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    /// New clubs always start out pending admin approval.
    pub async fn create(&self, data: CreateClub) -> SqlxResult<ClubRow> {
        sqlx::query_as::<_, ClubRow>(
            r#"
            INSERT INTO clubs (name, description, category, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, name, description, category, status, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.category)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, id: i64) -> SqlxResult<Option<ClubRow>> {
        sqlx::query_as::<_, ClubRow>(
            r#"
            SELECT id, name, description, category, status, created_at, updated_at
            FROM clubs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_by_status(
        &self,
        status: &str,
        page: Option<LimitOffset>,
    ) -> SqlxResult<Vec<ClubRow>> {
        let p = page.unwrap_or_default();

        sqlx::query_as::<_, ClubRow>(
            r#"
            SELECT id, name, description, category, status, created_at, updated_at
            FROM clubs
            WHERE status = $1
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(p.limit)
        .bind(p.offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_profile(
        &self,
        id: i64,
        data: UpdateClubProfile,
    ) -> SqlxResult<Option<ClubRow>> {
        sqlx::query_as::<_, ClubRow>(
            r#"
            UPDATE clubs
            SET description = $2, category = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, category, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.description)
        .bind(data.category)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_status(&self, id: i64, status: &str) -> SqlxResult<Option<ClubRow>> {
        sqlx::query_as::<_, ClubRow>(
            r#"
            UPDATE clubs
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, category, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }
}
