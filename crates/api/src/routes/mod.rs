pub mod admin;
pub mod auth;
pub mod clubs;
pub mod events;
pub mod manager;
