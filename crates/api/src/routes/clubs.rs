use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use infra::models::{ClubRow, ClubStatus, JoinRequestRow};
use infra::pagination::LimitOffset;
use infra::repos::{ClubFollowerRepo, ClubManagerRepo, ClubRepo, CreateClub, JoinRequestRepo};

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ClubListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateClubBody {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct JoinRequestBody {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClubDetail {
    #[serde(flatten)]
    pub club: ClubRow,
    pub follower_count: i64,
}

/// The public directory shows approved clubs only.
pub async fn list_clubs(
    State(state): State<AppState>,
    Query(q): Query<ClubListQuery>,
) -> Result<Json<Vec<ClubRow>>, AppError> {
    let page = LimitOffset {
        limit: q.limit.unwrap_or(50).clamp(1, 200),
        offset: q.offset.unwrap_or(0).max(0),
    };
    let rows = ClubRepo::new(state.db.clone())
        .list_by_status(ClubStatus::Approved.as_str(), Some(page))
        .await?;
    Ok(Json(rows))
}

async fn approved_club(state: &AppState, id: i64) -> Result<ClubRow, AppError> {
    ClubRepo::new(state.db.clone())
        .get(id)
        .await?
        .filter(|c| c.status == ClubStatus::Approved.as_str())
        .ok_or_else(|| AppError::NotFound(format!("Club {id} not found")))
}

pub async fn get_club(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ClubDetail>, AppError> {
    let club = approved_club(&state, id).await?;
    let follower_count = ClubFollowerRepo::new(state.db.clone())
        .follower_count(club.id)
        .await?;
    Ok(Json(ClubDetail {
        club,
        follower_count,
    }))
}

/// Anyone can propose a club; it sits in pending until an admin approves it.
/// The creator is registered as its first manager right away.
pub async fn create_club(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateClubBody>,
) -> Result<(StatusCode, Json<ClubRow>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Club name must not be empty".to_string()));
    }

    let user_id = claims.user_id()?;

    let club = ClubRepo::new(state.db.clone())
        .create(CreateClub {
            name: body.name,
            description: body.description,
            category: body.category,
        })
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "A club with this name already exists"))?;

    ClubManagerRepo::new(state.db.clone())
        .add(club.id, user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(club)))
}

pub async fn follow_club(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let club = approved_club(&state, id).await?;
    ClubFollowerRepo::new(state.db.clone())
        .follow(club.id, claims.user_id()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unfollow_club(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let removed = ClubFollowerRepo::new(state.db.clone())
        .unfollow(id, claims.user_id()?)
        .await?;
    if !removed {
        return Err(AppError::NotFound("You are not following this club".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn followed_clubs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ClubRow>>, AppError> {
    let rows = ClubFollowerRepo::new(state.db.clone())
        .followed_clubs(claims.user_id()?)
        .await?;
    Ok(Json(rows))
}

pub async fn create_join_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(body): Json<JoinRequestBody>,
) -> Result<(StatusCode, Json<JoinRequestRow>), AppError> {
    let club = approved_club(&state, id).await?;
    let user_id = claims.user_id()?;

    if ClubManagerRepo::new(state.db.clone())
        .is_club_manager(user_id, club.id)
        .await?
    {
        return Err(AppError::Validation("You already manage this club".to_string()));
    }

    let request = JoinRequestRepo::new(state.db.clone())
        .create(club.id, user_id, body.message)
        .await
        .map_err(|e| {
            AppError::conflict_on_unique(e, "You already have a pending request for this club")
        })?;

    Ok((StatusCode::CREATED, Json(request)))
}
