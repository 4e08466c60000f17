mod common;

use std::collections::HashMap;

use api::auth::{authorize_club_action, resolve_club_id};
use api::error::AppError;
use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::*;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn event_scoped_routes_grant_the_owning_clubs_manager() {
    let Some(state) = setup_test_db().await else { return };

    let (owner_id, owner_claims) = create_test_user(&state, "student").await;
    let (other_id, other_claims) = create_test_user(&state, "student").await;
    let owning_club = create_test_club(&state, "approved").await;
    let other_club = create_test_club(&state, "approved").await;
    create_club_manager(&state, owning_club, owner_id).await;
    create_club_manager(&state, other_club, other_id).await;

    let event_id = create_test_event(
        &state,
        owning_club,
        "draft",
        Utc::now() + Duration::days(3),
        None,
    )
    .await;

    let path = format!("/manager/events/{event_id}/publish");
    let p = params(&[("id", &event_id.to_string())]);

    let granted = authorize_club_action(&state.db, &owner_claims, &path, &p, None)
        .await
        .expect("owning club's manager should pass");
    assert_eq!(granted, owning_club);

    let err = authorize_club_action(&state.db, &other_claims, &path, &p, None)
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Forbidden(_));
}

#[tokio::test]
async fn admins_bypass_the_membership_check() {
    let Some(state) = setup_test_db().await else { return };

    let (_admin_id, admin_claims) = create_test_user(&state, "admin").await;
    let club_id = create_test_club(&state, "approved").await;

    let path = format!("/manager/clubs/{club_id}");
    let p = params(&[("clubId", &club_id.to_string())]);

    let granted = authorize_club_action(&state.db, &admin_claims, &path, &p, None)
        .await
        .expect("admin should pass without a manager row");
    assert_eq!(granted, club_id);
}

#[tokio::test]
async fn missing_event_fails_with_not_found() {
    let Some(state) = setup_test_db().await else { return };

    let err = resolve_club_id(
        &state.db,
        "/manager/events/999999999/publish",
        &params(&[("id", "999999999")]),
        None,
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::NotFound(_));
}

#[tokio::test]
async fn unresolvable_routes_are_denied() {
    let Some(state) = setup_test_db().await else { return };

    let err = resolve_club_id(&state.db, "/manager/reports", &params(&[]), None)
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Forbidden(_));
}

#[tokio::test]
async fn join_request_routes_resolve_through_the_request() {
    let Some(state) = setup_test_db().await else { return };

    let (requester_id, _) = create_test_user(&state, "student").await;
    let club_id = create_test_club(&state, "approved").await;

    let request_id: i64 = sqlx::query_scalar(
        "INSERT INTO club_join_requests (club_id, user_id, status) VALUES ($1, $2, 'pending') RETURNING id",
    )
    .bind(club_id)
    .bind(requester_id)
    .fetch_one(&state.db)
    .await
    .unwrap();

    let resolved = resolve_club_id(
        &state.db,
        &format!("/manager/join-requests/{request_id}"),
        &params(&[("requestId", &request_id.to_string())]),
        None,
    )
    .await
    .expect("join request route should resolve");
    assert_eq!(resolved, club_id);
}
