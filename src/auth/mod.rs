use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod cookie;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod pipeline;
pub(crate) mod validation;

pub use extractors::AuthUser;
pub use pipeline::{protect, Check};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
