pub mod club_access;
pub mod config;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use club_access::{authorize_club_action, ensure_club_access, resolve_club_id};
pub use config::AuthConfig;
pub use jwt::{Claims, JwtService};
pub use middleware::AuthMiddleware;
pub use password::PasswordService;
