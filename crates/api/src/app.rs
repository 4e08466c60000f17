use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::routes::{admin, auth, clubs, events, manager};
use crate::state::AppState;

/// Build the Axum router: public browse + auth endpoints, bearer-protected
/// student actions, and the manager/admin surfaces.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        // Simple liveness check; also proves DB connectivity.
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/events", get(events::list_events))
        .route("/events/upcoming", get(events::upcoming_events))
        .route("/events/trending", get(events::trending_events))
        .route("/events/{id}", get(events::get_event))
        .route("/events/{id}/ratings", get(events::event_ratings))
        .route("/clubs", get(clubs::list_clubs))
        .route("/clubs/{id}", get(clubs::get_club));

    let protected = Router::new()
        .route(
            "/events/{id}/register",
            post(events::register).delete(events::cancel_registration),
        )
        .route("/events/{id}/registration", get(events::my_registration))
        .route("/me/registrations", get(events::my_registrations))
        .route("/events/{id}/rate", post(events::rate_event))
        .route("/clubs", post(clubs::create_club))
        .route("/clubs/followed", get(clubs::followed_clubs))
        .route(
            "/clubs/{id}/follow",
            post(clubs::follow_club).delete(clubs::unfollow_club),
        )
        .route("/clubs/{id}/join-requests", post(clubs::create_join_request))
        .route("/manager/clubs", get(manager::my_clubs))
        .route("/manager/clubs/{clubId}", put(manager::update_club))
        .route(
            "/manager/clubs/{clubId}/join-requests",
            get(manager::club_join_requests),
        )
        .route(
            "/manager/clubs/{clubId}/managers",
            get(manager::club_managers),
        )
        .route("/manager/events", post(manager::create_event))
        .route(
            "/manager/events/{id}",
            put(manager::update_event).delete(manager::delete_event),
        )
        .route("/manager/events/{id}/publish", patch(manager::publish_event))
        .route("/manager/events/{id}/close", patch(manager::close_event))
        .route(
            "/manager/events/{id}/registrations",
            get(manager::event_registrations),
        )
        .route(
            "/manager/registrations/{id}",
            patch(manager::update_registration),
        )
        .route(
            "/manager/join-requests/{requestId}",
            patch(manager::review_join_request),
        )
        .route("/admin/clubs", get(admin::list_clubs))
        .route("/admin/clubs/{id}", patch(admin::review_club))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            AuthMiddleware::jwt_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        // Useful default middlewares
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
}

/// Liveness + quick DB probe.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    infra::db::ping(&state.db).await?;
    Ok("ok")
}
