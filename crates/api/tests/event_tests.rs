mod common;

use std::collections::HashMap;

use api::error::AppError;
use api::routes::manager;
use assert_matches::assert_matches;
use axum::extract::{OriginalUri, Path, State};
use axum::http::{StatusCode, Uri};
use axum::{Extension, Json};
use chrono::{DateTime, Duration, Utc};
use common::*;
use infra::models::EventStatus;

fn create_event_call() -> (OriginalUri, Path<HashMap<String, String>>) {
    let uri: Uri = "/manager/events".parse().unwrap();
    (OriginalUri(uri), Path(HashMap::new()))
}

fn update_event_call(id: i64) -> (OriginalUri, Path<HashMap<String, String>>) {
    let uri: Uri = format!("/manager/events/{id}").parse().unwrap();
    let params = HashMap::from([("id".to_string(), id.to_string())]);
    (OriginalUri(uri), Path(params))
}

fn event_body(club_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> manager::CreateEventBody {
    manager::CreateEventBody {
        club_id,
        title: "Launch night".to_string(),
        description: None,
        location: None,
        start_time: start,
        end_time: end,
        capacity: None,
        price_cents: None,
    }
}

#[tokio::test]
async fn event_creation_rejects_an_inverted_time_window() {
    let Some(state) = setup_test_db().await else { return };

    let (manager_id, manager_claims) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;
    create_club_manager(&state, club_id, manager_id).await;

    let start = Utc::now() + Duration::days(3);

    let (uri, params) = create_event_call();
    let err = manager::create_event(
        State(state.clone()),
        Extension(manager_claims.clone()),
        uri,
        params,
        Json(event_body(club_id, start, start - Duration::hours(1))),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(_));

    // a zero-length window is just as invalid
    let (uri, params) = create_event_call();
    let err = manager::create_event(
        State(state.clone()),
        Extension(manager_claims.clone()),
        uri,
        params,
        Json(event_body(club_id, start, start)),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(_));

    let (uri, params) = create_event_call();
    let (status, Json(event)) = manager::create_event(
        State(state.clone()),
        Extension(manager_claims),
        uri,
        params,
        Json(event_body(club_id, start, start + Duration::hours(2))),
    )
    .await
    .expect("an ordered window should be accepted");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event.status, EventStatus::Draft.as_str());
}

#[tokio::test]
async fn event_updates_keep_the_time_window_ordered() {
    let Some(state) = setup_test_db().await else { return };

    let (manager_id, manager_claims) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;
    create_club_manager(&state, club_id, manager_id).await;

    let start = Utc::now() + Duration::days(5);
    let event_id = create_test_event(&state, club_id, "draft", start, None).await;

    let inverted = manager::UpdateEventBody {
        title: "Rescheduled".to_string(),
        description: None,
        location: None,
        start_time: start,
        end_time: start - Duration::minutes(30),
        capacity: None,
        price_cents: None,
    };

    let (uri, params) = update_event_call(event_id);
    let err = manager::update_event(
        State(state.clone()),
        Extension(manager_claims.clone()),
        uri,
        params,
        Json(inverted),
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Validation(_));

    let (uri, params) = update_event_call(event_id);
    let updated = manager::update_event(
        State(state.clone()),
        Extension(manager_claims),
        uri,
        params,
        Json(manager::UpdateEventBody {
            title: "Rescheduled".to_string(),
            description: None,
            location: None,
            start_time: start,
            end_time: start + Duration::hours(3),
            capacity: None,
            price_cents: None,
        }),
    )
    .await
    .expect("an ordered window should be accepted");
    assert_eq!(updated.0.title, "Rescheduled");
}
