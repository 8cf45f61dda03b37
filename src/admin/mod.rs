use axum::Router;

use crate::{
    auth::{protect, Check},
    state::AppState,
    store::Role,
};

pub mod dto;
pub mod handlers;
pub mod pagination;

/// Active must run before Role: a deactivated admin is turned away as inactive.
pub const ADMIN_CHECKS: [Check; 3] = [
    Check::Authenticated,
    Check::Active,
    Check::Role(Role::Admin),
];

pub fn router(state: &AppState) -> Router<AppState> {
    protect(handlers::admin_routes(), state, &ADMIN_CHECKS)
}
