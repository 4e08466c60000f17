use std::collections::HashMap;

use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use infra::models::{
    ClubManagerRow, ClubRow, EventRow, EventStatus, JoinRequestRow, JoinRequestStatus,
    RegistrationRow, RegistrationStatus,
};
use infra::registration::check_manager_transition;
use infra::repos::{
    ClubManagerRepo, ClubRepo, CreateEvent, EventRepo, JoinRequestRepo, RegistrationRepo,
    UpdateClubProfile, UpdateEvent,
};

use crate::auth::{authorize_club_action, Claims};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateEventBody {
    pub club_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub price_cents: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateEventBody {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub price_cents: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateClubBody {
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateRegistrationBody {
    pub status: RegistrationStatus,
}

#[derive(Deserialize)]
pub struct ReviewJoinRequestBody {
    pub status: JoinRequestStatus,
}

fn check_time_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::Validation(
            "Event start time must be before its end time".to_string(),
        ));
    }
    Ok(())
}

fn param_id(params: &HashMap<String, String>, key: &str) -> Result<i64, AppError> {
    params
        .get(key)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| AppError::Validation(format!("missing or invalid '{key}' parameter")))
}

pub async fn my_clubs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ClubRow>>, AppError> {
    let rows = ClubManagerRepo::new(state.db.clone())
        .clubs_for_user(claims.user_id()?)
        .await?;
    Ok(Json(rows))
}

pub async fn update_club(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
    Json(body): Json<UpdateClubBody>,
) -> Result<Json<ClubRow>, AppError> {
    let club_id =
        authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;

    let club = ClubRepo::new(state.db.clone())
        .update_profile(
            club_id,
            UpdateClubProfile {
                description: body.description,
                category: body.category,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Club {club_id} not found")))?;
    Ok(Json(club))
}

pub async fn club_managers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<Vec<ClubManagerRow>>, AppError> {
    let club_id =
        authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;
    let rows = ClubManagerRepo::new(state.db.clone())
        .managers_for_club(club_id)
        .await?;
    Ok(Json(rows))
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
    Json(body): Json<CreateEventBody>,
) -> Result<(StatusCode, Json<EventRow>), AppError> {
    let club_id =
        authorize_club_action(&state.db, &claims, uri.path(), &params, Some(body.club_id)).await?;
    check_time_window(body.start_time, body.end_time)?;

    let event = EventRepo::new(state.db.clone())
        .create(CreateEvent {
            club_id,
            title: body.title,
            description: body.description,
            location: body.location,
            start_time: body.start_time,
            end_time: body.end_time,
            capacity: body.capacity,
            price_cents: body.price_cents,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
    Json(body): Json<UpdateEventBody>,
) -> Result<Json<EventRow>, AppError> {
    authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;
    check_time_window(body.start_time, body.end_time)?;

    let event_id = param_id(&params, "id")?;
    let event = EventRepo::new(state.db.clone())
        .update(
            event_id,
            UpdateEvent {
                title: body.title,
                description: body.description,
                location: body.location,
                start_time: body.start_time,
                end_time: body.end_time,
                capacity: body.capacity,
                price_cents: body.price_cents,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))?;
    Ok(Json(event))
}

/// Draft events can be discarded; anything already visible is closed instead.
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
) -> Result<StatusCode, AppError> {
    authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;

    let event_id = param_id(&params, "id")?;
    let repo = EventRepo::new(state.db.clone());
    let event = repo
        .get(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))?;

    if event.status != EventStatus::Draft.as_str() {
        return Err(AppError::Validation(
            "Only draft events can be deleted".to_string(),
        ));
    }

    repo.delete(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn transition_event(
    state: &AppState,
    event_id: i64,
    from: EventStatus,
    to: EventStatus,
) -> Result<EventRow, AppError> {
    let repo = EventRepo::new(state.db.clone());
    let event = repo
        .get(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))?;

    if event.status != from.as_str() {
        return Err(AppError::Validation(format!(
            "Only {} events can move to {}",
            from.as_str(),
            to.as_str()
        )));
    }

    repo.update_status(event_id, to.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))
}

pub async fn publish_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<EventRow>, AppError> {
    authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;
    let event_id = param_id(&params, "id")?;
    let event =
        transition_event(&state, event_id, EventStatus::Draft, EventStatus::Published).await?;
    Ok(Json(event))
}

pub async fn close_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<EventRow>, AppError> {
    authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;
    let event_id = param_id(&params, "id")?;
    let event =
        transition_event(&state, event_id, EventStatus::Published, EventStatus::Closed).await?;
    Ok(Json(event))
}

pub async fn event_registrations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<Vec<RegistrationRow>>, AppError> {
    authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;
    let event_id = param_id(&params, "id")?;
    let rows = RegistrationRepo::new(state.db.clone())
        .list_for_event(event_id)
        .await?;
    Ok(Json(rows))
}

/// Managers may set any status; attendance outcomes wait for the event's
/// start date and confirmations respect capacity.
pub async fn update_registration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
    Json(body): Json<UpdateRegistrationBody>,
) -> Result<Json<RegistrationRow>, AppError> {
    authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;

    let registration_id = param_id(&params, "id")?;
    let repo = RegistrationRepo::new(state.db.clone());
    let registration = repo
        .get_with_event(registration_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Registration {registration_id} not found"))
        })?;

    let confirmed = repo.confirmed_count(registration.event_id).await?;
    check_manager_transition(
        body.status,
        registration.event_start_time.date_naive(),
        Utc::now().date_naive(),
        confirmed,
        registration.event_capacity,
    )?;

    let row = repo
        .update_status(registration_id, body.status.as_str())
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Registration {registration_id} not found"))
        })?;
    Ok(Json(row))
}

pub async fn club_join_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<Vec<JoinRequestRow>>, AppError> {
    let club_id =
        authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;
    let rows = JoinRequestRepo::new(state.db.clone())
        .list_pending_for_club(club_id)
        .await?;
    Ok(Json(rows))
}

/// Approving a join request makes the requester a manager of the club.
pub async fn review_join_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
    Json(body): Json<ReviewJoinRequestBody>,
) -> Result<Json<JoinRequestRow>, AppError> {
    authorize_club_action(&state.db, &claims, uri.path(), &params, None).await?;

    if body.status == JoinRequestStatus::Pending {
        return Err(AppError::Validation(
            "A review must either approve or reject the request".to_string(),
        ));
    }

    let request_id = param_id(&params, "requestId")?;
    let repo = JoinRequestRepo::new(state.db.clone());
    let request = repo
        .get(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Join request {request_id} not found")))?;

    if request.status != JoinRequestStatus::Pending.as_str() {
        return Err(AppError::Validation(
            "This join request has already been reviewed".to_string(),
        ));
    }

    let updated = repo
        .update_status(request_id, body.status.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Join request {request_id} not found")))?;

    if body.status == JoinRequestStatus::Approved {
        ClubManagerRepo::new(state.db.clone())
            .add(request.club_id, request.user_id)
            .await?;
    }

    Ok(Json(updated))
}
