pub mod app;
pub mod auth;
pub mod error;
pub mod mailer;
pub mod routes;
pub mod state;

pub use state::AppState;
