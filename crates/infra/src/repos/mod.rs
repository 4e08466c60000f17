pub mod club_followers;
pub mod club_managers;
pub mod clubs;
pub mod events;
pub mod join_requests;
pub mod ratings;
pub mod registrations;
pub mod tokens;
pub mod users;

pub use club_followers::ClubFollowerRepo;
pub use club_managers::ClubManagerRepo;
pub use clubs::{ClubRepo, CreateClub, UpdateClubProfile};
pub use events::{CreateEvent, EventFilter, EventRepo, UpdateEvent};
pub use join_requests::JoinRequestRepo;
pub use ratings::RatingRepo;
pub use registrations::RegistrationRepo;
pub use tokens::{AuthTokenRepo, RefreshTokenRepo};
pub use users::{CreateUser, UserRepo};
