use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use infra::models::{
    EventRatingRow, EventRow, EventStatus, RegistrationRow, RegistrationStatus,
};
use infra::pagination::LimitOffset;
use infra::registration::{plan_cancel, plan_register, can_rate, CancelAction, RegisterAction};
use infra::repos::{EventFilter, EventRepo, RatingRepo, RegistrationRepo};
use infra::trending::{rank_trending, DEFAULT_TRENDING_LIMIT};

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EventListQuery {
    pub club_id: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct RegisterBody {
    pub status: RegistrationStatus,
}

#[derive(Deserialize)]
pub struct RateBody {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct TrendingEventResponse {
    pub event: EventRow,
    pub score: f64,
}

fn page_from(limit: Option<i64>, offset: Option<i64>) -> LimitOffset {
    LimitOffset {
        limit: limit.unwrap_or(50).clamp(1, 200),
        offset: offset.unwrap_or(0).max(0),
    }
}

fn stored_status(raw: &str) -> Result<RegistrationStatus, AppError> {
    RegistrationStatus::parse(raw).ok_or_else(|| {
        AppError::Anyhow(anyhow::anyhow!("unknown registration status '{raw}' in database"))
    })
}

/// Public listing: only published events are visible here.
pub async fn list_events(
    State(state): State<AppState>,
    Query(q): Query<EventListQuery>,
) -> Result<Json<Vec<EventRow>>, AppError> {
    let rows = EventRepo::new(state.db.clone())
        .list(
            EventFilter {
                club_id: q.club_id,
                status: Some(EventStatus::Published.as_str().to_string()),
                from: q.from,
                to: q.to,
            },
            Some(page_from(q.limit, q.offset)),
        )
        .await?;
    Ok(Json(rows))
}

pub async fn upcoming_events(
    State(state): State<AppState>,
    Query(q): Query<EventListQuery>,
) -> Result<Json<Vec<EventRow>>, AppError> {
    let rows = EventRepo::new(state.db.clone())
        .list(
            EventFilter {
                club_id: q.club_id,
                status: Some(EventStatus::Published.as_str().to_string()),
                from: Some(Utc::now()),
                to: None,
            },
            Some(page_from(q.limit, q.offset)),
        )
        .await?;
    Ok(Json(rows))
}

pub async fn trending_events(
    State(state): State<AppState>,
    Query(q): Query<TrendingQuery>,
) -> Result<Json<Vec<TrendingEventResponse>>, AppError> {
    let repo = EventRepo::new(state.db.clone());
    let limit = q.limit.unwrap_or(DEFAULT_TRENDING_LIMIT).clamp(1, 50);

    let stats = repo.published_event_stats().await?;
    let ranked = rank_trending(&stats, Utc::now(), limit);

    let mut out = Vec::with_capacity(ranked.len());
    for entry in ranked {
        if let Some(event) = repo.get(entry.event_id).await? {
            out.push(TrendingEventResponse {
                event,
                score: entry.score,
            });
        }
    }
    Ok(Json(out))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EventRow>, AppError> {
    let event = EventRepo::new(state.db.clone())
        .get(id)
        .await?
        .filter(|e| e.status == EventStatus::Published.as_str())
        .ok_or_else(|| AppError::NotFound(format!("Event {id} not found")))?;
    Ok(Json(event))
}

/// Load an event and insist it accepts registrations.
async fn published_event(state: &AppState, id: i64) -> Result<EventRow, AppError> {
    let event = EventRepo::new(state.db.clone())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {id} not found")))?;

    if event.status != EventStatus::Published.as_str() {
        return Err(AppError::Validation(
            "Only published events accept registrations".to_string(),
        ));
    }
    Ok(event)
}

pub async fn register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<RegistrationRow>, AppError> {
    let user_id = claims.user_id()?;
    let event = published_event(&state, id).await?;

    let repo = RegistrationRepo::new(state.db.clone());
    let existing = repo.get_by_user_and_event(user_id, event.id).await?;
    let existing_status = existing
        .as_ref()
        .map(|r| stored_status(&r.status))
        .transpose()?;

    let row = match (plan_register(existing_status, body.status)?, existing) {
        (RegisterAction::Create(status), _) => repo
            .create(event.id, user_id, status.as_str())
            .await
            .map_err(|e| {
                AppError::conflict_on_unique(e, "You are already registered for this event")
            })?,
        (RegisterAction::Replace(status), Some(current)) => repo
            .update_status(current.id, status.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?,
        (RegisterAction::Replace(_), None) => {
            return Err(AppError::Anyhow(anyhow::anyhow!(
                "registration plan referenced a missing row"
            )))
        }
    };

    Ok(Json(row))
}

pub async fn cancel_registration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let user_id = claims.user_id()?;

    let repo = RegistrationRepo::new(state.db.clone());
    let existing = repo
        .get_by_user_and_event(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("No registration for this event".to_string()))?;

    match plan_cancel(stored_status(&existing.status)?)? {
        CancelAction::DeleteRow => {
            repo.delete(existing.id).await?;
        }
        CancelAction::MarkCancelled => {
            repo.update_status(existing.id, RegistrationStatus::Cancelled.as_str())
                .await?;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_registrations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<RegistrationRow>>, AppError> {
    let rows = RegistrationRepo::new(state.db.clone())
        .list_for_user(claims.user_id()?)
        .await?;
    Ok(Json(rows))
}

/// A lookup after an interested-row cancellation reports no registration at
/// all, not a cancelled one.
pub async fn my_registration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<Option<RegistrationRow>>, AppError> {
    let user_id = claims.user_id()?;
    let row = RegistrationRepo::new(state.db.clone())
        .get_by_user_and_event(user_id, id)
        .await?;
    Ok(Json(row))
}

/// Draft events are not public, so neither are their ratings.
pub async fn event_ratings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<EventRatingRow>>, AppError> {
    let event = EventRepo::new(state.db.clone())
        .get(id)
        .await?
        .filter(|e| e.status != EventStatus::Draft.as_str())
        .ok_or_else(|| AppError::NotFound(format!("Event {id} not found")))?;

    let rows = RatingRepo::new(state.db.clone())
        .list_for_event(event.id)
        .await?;
    Ok(Json(rows))
}

pub async fn rate_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(body): Json<RateBody>,
) -> Result<Json<EventRatingRow>, AppError> {
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::Validation("Rating must be between 1 and 5".to_string()));
    }

    let user_id = claims.user_id()?;

    let event = EventRepo::new(state.db.clone())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {id} not found")))?;

    let registration = RegistrationRepo::new(state.db.clone())
        .get_by_user_and_event(user_id, event.id)
        .await?;
    let status = registration
        .as_ref()
        .map(|r| stored_status(&r.status))
        .transpose()?;

    if !can_rate(status) {
        return Err(AppError::Forbidden(
            "Only attendees can rate an event".to_string(),
        ));
    }

    let rating = RatingRepo::new(state.db.clone())
        .upsert(event.id, user_id, body.rating, body.comment)
        .await?;
    Ok(Json(rating))
}
