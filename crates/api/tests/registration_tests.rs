mod common;

use std::collections::HashMap;

use api::error::AppError;
use api::routes::{events, manager};
use assert_matches::assert_matches;
use axum::extract::{OriginalUri, Path, State};
use axum::http::Uri;
use axum::{Extension, Json};
use chrono::{Duration, Utc};
use common::*;
use infra::models::RegistrationStatus;

fn manager_registration_call(id: i64) -> (OriginalUri, Path<HashMap<String, String>>) {
    let uri: Uri = format!("/manager/registrations/{id}").parse().unwrap();
    let params = HashMap::from([("id".to_string(), id.to_string())]);
    (OriginalUri(uri), Path(params))
}

#[tokio::test]
async fn interested_toggle_removes_the_row() {
    let Some(state) = setup_test_db().await else { return };

    let (user_id, claims) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;
    let event_id = create_test_event(
        &state,
        club_id,
        "published",
        Utc::now() + Duration::days(5),
        Some(10),
    )
    .await;

    events::register(
        State(state.clone()),
        Extension(claims.clone()),
        Path(event_id),
        Json(events::RegisterBody {
            status: RegistrationStatus::Interested,
        }),
    )
    .await
    .expect("register should succeed");

    assert_eq!(
        registration_status(&state, user_id, event_id).await.as_deref(),
        Some("interested")
    );

    let mine = events::my_registrations(State(state.clone()), Extension(claims.clone()))
        .await
        .expect("listing should succeed");
    assert_eq!(mine.0.len(), 1);
    assert_eq!(mine.0[0].event_id, event_id);

    events::cancel_registration(State(state.clone()), Extension(claims.clone()), Path(event_id))
        .await
        .expect("cancel should succeed");

    // the row is gone entirely, not soft-cancelled
    assert_eq!(registration_status(&state, user_id, event_id).await, None);
    let mine = events::my_registrations(State(state.clone()), Extension(claims))
        .await
        .expect("listing should succeed");
    assert!(mine.0.is_empty());
}

#[tokio::test]
async fn confirmed_cancel_keeps_an_audit_row() {
    let Some(state) = setup_test_db().await else { return };

    let (user_id, claims) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;
    let event_id = create_test_event(
        &state,
        club_id,
        "published",
        Utc::now() + Duration::days(5),
        None,
    )
    .await;

    events::register(
        State(state.clone()),
        Extension(claims.clone()),
        Path(event_id),
        Json(events::RegisterBody {
            status: RegistrationStatus::Confirmed,
        }),
    )
    .await
    .expect("register should succeed");

    events::cancel_registration(State(state.clone()), Extension(claims.clone()), Path(event_id))
        .await
        .expect("cancel should succeed");

    assert_eq!(
        registration_status(&state, user_id, event_id).await.as_deref(),
        Some("cancelled")
    );

    // a second cancel has nothing left to do
    let err = events::cancel_registration(State(state.clone()), Extension(claims), Path(event_id))
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Validation(_));
}

#[tokio::test]
async fn confirmed_cannot_downgrade_to_interested() {
    let Some(state) = setup_test_db().await else { return };

    let (_user_id, claims) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;
    let event_id = create_test_event(
        &state,
        club_id,
        "published",
        Utc::now() + Duration::days(5),
        None,
    )
    .await;

    events::register(
        State(state.clone()),
        Extension(claims.clone()),
        Path(event_id),
        Json(events::RegisterBody {
            status: RegistrationStatus::Confirmed,
        }),
    )
    .await
    .expect("register should succeed");

    let err = events::register(
        State(state.clone()),
        Extension(claims),
        Path(event_id),
        Json(events::RegisterBody {
            status: RegistrationStatus::Interested,
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(_));
}

#[tokio::test]
async fn draft_events_do_not_accept_registrations() {
    let Some(state) = setup_test_db().await else { return };

    let (_user_id, claims) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;
    let event_id = create_test_event(
        &state,
        club_id,
        "draft",
        Utc::now() + Duration::days(5),
        None,
    )
    .await;

    let err = events::register(
        State(state.clone()),
        Extension(claims),
        Path(event_id),
        Json(events::RegisterBody {
            status: RegistrationStatus::Interested,
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(_));
}

#[tokio::test]
async fn attendance_cannot_be_recorded_before_the_event_date() {
    let Some(state) = setup_test_db().await else { return };

    let (student_id, student_claims) = create_test_user(&state, "student").await;
    let (manager_id, manager_claims) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;
    create_club_manager(&state, club_id, manager_id).await;

    // starts tomorrow
    let event_id = create_test_event(
        &state,
        club_id,
        "published",
        Utc::now() + Duration::days(1),
        None,
    )
    .await;

    let row = events::register(
        State(state.clone()),
        Extension(student_claims),
        Path(event_id),
        Json(events::RegisterBody {
            status: RegistrationStatus::Confirmed,
        }),
    )
    .await
    .expect("register should succeed");

    let (uri, params) = manager_registration_call(row.0.id);
    let err = manager::update_registration(
        State(state.clone()),
        Extension(manager_claims),
        uri,
        params,
        Json(manager::UpdateRegistrationBody {
            status: RegistrationStatus::Attended,
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(_));

    assert_eq!(
        registration_status(&state, student_id, event_id).await.as_deref(),
        Some("confirmed")
    );
}

#[tokio::test]
async fn confirmation_fails_once_capacity_is_reached() {
    let Some(state) = setup_test_db().await else { return };

    let (_a_id, a_claims) = create_test_user(&state, "student").await;
    let (_b_id, b_claims) = create_test_user(&state, "student").await;
    let (manager_id, manager_claims) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;
    create_club_manager(&state, club_id, manager_id).await;

    let event_id = create_test_event(
        &state,
        club_id,
        "published",
        Utc::now() + Duration::days(5),
        Some(1),
    )
    .await;

    events::register(
        State(state.clone()),
        Extension(a_claims),
        Path(event_id),
        Json(events::RegisterBody {
            status: RegistrationStatus::Confirmed,
        }),
    )
    .await
    .expect("first registration should succeed");

    let pending = events::register(
        State(state.clone()),
        Extension(b_claims),
        Path(event_id),
        Json(events::RegisterBody {
            status: RegistrationStatus::PendingPayment,
        }),
    )
    .await
    .expect("second registration should succeed");

    let (uri, params) = manager_registration_call(pending.0.id);
    let err = manager::update_registration(
        State(state.clone()),
        Extension(manager_claims),
        uri,
        params,
        Json(manager::UpdateRegistrationBody {
            status: RegistrationStatus::Confirmed,
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(_));
}

#[tokio::test]
async fn ratings_require_attendance_and_update_in_place() {
    let Some(state) = setup_test_db().await else { return };

    let (user_id, claims) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;
    let event_id = create_test_event(
        &state,
        club_id,
        "published",
        Utc::now() - Duration::days(1),
        None,
    )
    .await;

    // no registration at all -> forbidden
    let err = events::rate_event(
        State(state.clone()),
        Extension(claims.clone()),
        Path(event_id),
        Json(events::RateBody {
            rating: 5,
            comment: None,
        }),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Forbidden(_));

    sqlx::query("INSERT INTO event_registrations (event_id, user_id, status) VALUES ($1, $2, 'attended')")
        .bind(event_id)
        .bind(user_id)
        .execute(&state.db)
        .await
        .unwrap();

    let first = events::rate_event(
        State(state.clone()),
        Extension(claims.clone()),
        Path(event_id),
        Json(events::RateBody {
            rating: 4,
            comment: Some("good".to_string()),
        }),
    )
    .await
    .expect("rating should succeed");

    let second = events::rate_event(
        State(state.clone()),
        Extension(claims),
        Path(event_id),
        Json(events::RateBody {
            rating: 5,
            comment: Some("great on second thought".to_string()),
        }),
    )
    .await
    .expect("re-rating should succeed");

    // updated in place, not duplicated
    assert_eq!(first.0.id, second.0.id);
    assert_eq!(second.0.rating, 5);

    let listed = events::event_ratings(State(state.clone()), Path(event_id))
        .await
        .expect("published events expose their ratings");
    assert_eq!(listed.0.len(), 1);
    assert_eq!(listed.0[0].rating, 5);
}
