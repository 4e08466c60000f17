use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use infra::models::{ClubRow, ClubStatus};
use infra::pagination::LimitOffset;
use infra::repos::ClubRepo;

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AdminClubListQuery {
    pub status: Option<ClubStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct ClubApprovalBody {
    pub status: ClubStatus,
}

fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}

pub async fn list_clubs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<AdminClubListQuery>,
) -> Result<Json<Vec<ClubRow>>, AppError> {
    require_admin(&claims)?;

    let page = LimitOffset {
        limit: q.limit.unwrap_or(50).clamp(1, 200),
        offset: q.offset.unwrap_or(0).max(0),
    };
    let status = q.status.unwrap_or(ClubStatus::Pending);
    let rows = ClubRepo::new(state.db.clone())
        .list_by_status(status.as_str(), Some(page))
        .await?;
    Ok(Json(rows))
}

/// Approval workflow: only pending clubs can be approved or rejected.
pub async fn review_club(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(body): Json<ClubApprovalBody>,
) -> Result<Json<ClubRow>, AppError> {
    require_admin(&claims)?;

    if body.status == ClubStatus::Pending {
        return Err(AppError::Validation(
            "A review must either approve or reject the club".to_string(),
        ));
    }

    let repo = ClubRepo::new(state.db.clone());
    let club = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Club {id} not found")))?;

    if club.status != ClubStatus::Pending.as_str() {
        return Err(AppError::Validation(
            "This club has already been reviewed".to_string(),
        ));
    }

    let updated = repo
        .update_status(id, body.status.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Club {id} not found")))?;
    Ok(Json(updated))
}
