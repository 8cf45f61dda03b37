use axum::Router;

use crate::{
    auth::{protect, Check},
    state::AppState,
};

pub mod dto;
pub mod handlers;

pub fn router(state: &AppState) -> Router<AppState> {
    protect(handlers::user_routes(), state, &[Check::Authenticated])
}
