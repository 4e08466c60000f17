//! Club-level authorization for the manager surface.
//!
//! Manager routes come in several shapes (club-scoped, event-scoped,
//! registration-scoped, join-request-scoped), so the club a request concerns
//! is resolved from the route before the membership check runs. Handlers call
//! [`authorize_club_action`] at the top, per the plain-function authorization
//! style used throughout this crate.

use std::collections::HashMap;

use infra::db::Db;
use infra::repos::{ClubManagerRepo, EventRepo, JoinRequestRepo, RegistrationRepo};

use crate::auth::Claims;
use crate::error::AppError;

/// Which lookup (if any) is needed to turn a route into a club id.
/// First matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClubScope {
    Direct(i64),
    ViaEvent(i64),
    ViaRegistration(i64),
    ViaJoinRequest(i64),
    Unresolved,
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("invalid id '{raw}'")))
}

/// Pure rule selection over the route shape; no database access.
pub fn resolve_scope(
    path: &str,
    params: &HashMap<String, String>,
    body_club_id: Option<i64>,
) -> Result<ClubScope, AppError> {
    if let Some(raw) = params.get("clubId") {
        return Ok(ClubScope::Direct(parse_id(raw)?));
    }
    if let Some(club_id) = body_club_id {
        return Ok(ClubScope::Direct(club_id));
    }
    if let Some(raw) = params.get("id") {
        let id = parse_id(raw)?;
        if path.contains("/clubs/") {
            return Ok(ClubScope::Direct(id));
        }
        if path.contains("/events/") {
            return Ok(ClubScope::ViaEvent(id));
        }
        if path.contains("/registrations/") {
            return Ok(ClubScope::ViaRegistration(id));
        }
    }
    if let Some(raw) = params.get("requestId") {
        if path.contains("/join-requests/") {
            return Ok(ClubScope::ViaJoinRequest(parse_id(raw)?));
        }
    }
    Ok(ClubScope::Unresolved)
}

/// Resolve the club a request concerns, looking up referenced entities where
/// the route is event-, registration- or join-request-scoped.
pub async fn resolve_club_id(
    db: &Db,
    path: &str,
    params: &HashMap<String, String>,
    body_club_id: Option<i64>,
) -> Result<i64, AppError> {
    match resolve_scope(path, params, body_club_id)? {
        ClubScope::Direct(club_id) => Ok(club_id),
        ClubScope::ViaEvent(event_id) => {
            let event = EventRepo::new(db.clone())
                .get(event_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))?;
            Ok(event.club_id)
        }
        ClubScope::ViaRegistration(registration_id) => {
            let registration = RegistrationRepo::new(db.clone())
                .get_with_event(registration_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Registration {registration_id} not found"))
                })?;
            Ok(registration.club_id)
        }
        ClubScope::ViaJoinRequest(request_id) => {
            let request = JoinRequestRepo::new(db.clone())
                .get(request_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Join request {request_id} not found")))?;
            Ok(request.club_id)
        }
        ClubScope::Unresolved => Err(AppError::Forbidden(
            "unable to determine club access".to_string(),
        )),
    }
}

/// Admins pass outright; everyone else needs a manager row for the club.
pub async fn ensure_club_access(db: &Db, claims: &Claims, club_id: i64) -> Result<(), AppError> {
    if claims.is_admin() {
        return Ok(());
    }

    let user_id = claims.user_id()?;
    let is_manager = ClubManagerRepo::new(db.clone())
        .is_club_manager(user_id, club_id)
        .await?;

    if is_manager {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "You are not a manager of club {club_id}"
        )))
    }
}

/// Resolve + check in one call; returns the resolved club id so handlers can
/// scope their queries to it.
pub async fn authorize_club_action(
    db: &Db,
    claims: &Claims,
    path: &str,
    params: &HashMap<String, String>,
    body_club_id: Option<i64>,
) -> Result<i64, AppError> {
    let club_id = resolve_club_id(db, path, params, body_club_id).await?;
    ensure_club_access(db, claims, club_id).await?;
    Ok(club_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn explicit_club_id_param_wins() {
        let scope = resolve_scope(
            "/manager/clubs/3/join-requests",
            &params(&[("clubId", "3")]),
            Some(9),
        )
        .unwrap();
        assert_eq!(scope, ClubScope::Direct(3));
    }

    #[test]
    fn body_club_id_beats_path_rules() {
        let scope = resolve_scope("/manager/events", &params(&[]), Some(5)).unwrap();
        assert_eq!(scope, ClubScope::Direct(5));
    }

    #[test]
    fn club_scoped_path_uses_id_directly() {
        let scope = resolve_scope("/manager/clubs/7", &params(&[("id", "7")]), None).unwrap();
        assert_eq!(scope, ClubScope::Direct(7));
    }

    #[test]
    fn event_scoped_path_needs_a_lookup() {
        let scope =
            resolve_scope("/manager/events/7/publish", &params(&[("id", "7")]), None).unwrap();
        assert_eq!(scope, ClubScope::ViaEvent(7));
    }

    #[test]
    fn registration_scoped_path() {
        let scope =
            resolve_scope("/manager/registrations/12", &params(&[("id", "12")]), None).unwrap();
        assert_eq!(scope, ClubScope::ViaRegistration(12));
    }

    #[test]
    fn join_request_scoped_path() {
        let scope = resolve_scope(
            "/manager/join-requests/4",
            &params(&[("requestId", "4")]),
            None,
        )
        .unwrap();
        assert_eq!(scope, ClubScope::ViaJoinRequest(4));
    }

    #[test]
    fn unmatched_routes_resolve_to_denial() {
        let scope = resolve_scope("/manager/somewhere", &params(&[]), None).unwrap();
        assert_eq!(scope, ClubScope::Unresolved);
    }

    #[test]
    fn garbage_ids_are_validation_errors() {
        let err = resolve_scope("/manager/clubs/x", &params(&[("clubId", "x")]), None).unwrap_err();
        assert_matches!(err, AppError::Validation(_));
    }
}
