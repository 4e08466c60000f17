use std::env;

use api::auth::{AuthConfig, Claims};
use api::AppState;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

/// Connect to the test database, or None when TEST_DATABASE_URL is unset so
/// the suite can run without one.
pub async fn setup_test_db() -> Option<AppState> {
    let database_url = match env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set; skipping database test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../infra/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let config = AuthConfig {
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_hours: 1,
        refresh_token_ttl_days: 30,
        one_time_token_ttl_hours: 24,
    };

    Some(AppState::with_config(pool, config))
}

/// Create a test user and return its id plus ready-made JWT claims.
#[allow(dead_code)]
pub async fn create_test_user(state: &AppState, role: &str) -> (i64, Claims) {
    let email = format!("test-{}@campus.edu", Uuid::new_v4());

    let user_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, first_name, last_name, password_hash, role)
        VALUES ($1, 'Test', 'User', '$2b$12$dummy.hash.for.testing', $2)
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(role)
    .fetch_one(&state.db)
    .await
    .expect("Failed to create test user");

    let claims = Claims {
        sub: user_id.to_string(),
        email,
        role: role.to_string(),
        iat: Utc::now().timestamp(),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
    };

    (user_id, claims)
}

#[allow(dead_code)]
pub async fn create_test_club(state: &AppState, status: &str) -> i64 {
    let name = format!("Test Club {}", Uuid::new_v4());

    sqlx::query_scalar(
        "INSERT INTO clubs (name, description, status) VALUES ($1, 'A test club', $2) RETURNING id",
    )
    .bind(name)
    .bind(status)
    .fetch_one(&state.db)
    .await
    .expect("Failed to create test club")
}

#[allow(dead_code)]
pub async fn create_club_manager(state: &AppState, club_id: i64, user_id: i64) {
    sqlx::query(
        "INSERT INTO club_managers (club_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(club_id)
    .bind(user_id)
    .execute(&state.db)
    .await
    .expect("Failed to create club manager relationship");
}

#[allow(dead_code)]
pub async fn create_test_event(
    state: &AppState,
    club_id: i64,
    status: &str,
    start_time: DateTime<Utc>,
    capacity: Option<i32>,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO events (club_id, title, description, start_time, end_time, capacity, status)
        VALUES ($1, 'Test Event', 'A test event', $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(club_id)
    .bind(start_time)
    .bind(start_time + Duration::hours(2))
    .bind(capacity)
    .bind(status)
    .fetch_one(&state.db)
    .await
    .expect("Failed to create test event")
}

#[allow(dead_code)]
pub async fn registration_status(
    state: &AppState,
    user_id: i64,
    event_id: i64,
) -> Option<String> {
    sqlx::query_scalar(
        "SELECT status FROM event_registrations WHERE user_id = $1 AND event_id = $2",
    )
    .bind(user_id)
    .bind(event_id)
    .fetch_optional(&state.db)
    .await
    .expect("Failed to query registration status")
}
