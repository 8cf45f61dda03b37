//! Access-control pipeline.
//!
//! A route declares an ordered list of [`Check`]s; each either lets the request
//! through to the next stage or answers it with a 401. `Authenticated` must come
//! first because the other checks read the identity it attaches. Admin routes run
//! `Active` before `Role`, so a deactivated admin is rejected as inactive.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use super::{cookie::session_token, extractors::AuthUser};
use crate::{
    error::AppError,
    state::AppState,
    store::{Role, User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Authenticated,
    Active,
    Role(Role),
}

impl Check {
    pub async fn run(self, state: &AppState, req: &mut Request) -> Result<(), AppError> {
        let identity = req.extensions().get::<AuthUser>().copied();
        match self {
            Check::Authenticated => authenticate(state, req),
            Check::Active => require_active(state, identity).await,
            Check::Role(role) => require_role(state, identity, role).await,
        }
    }
}

/// Wraps every route of `router` in `checks`, executed in the given order.
pub fn protect(router: Router<AppState>, state: &AppState, checks: &[Check]) -> Router<AppState> {
    // The last layer added runs first.
    checks.iter().rev().fold(router, |router, check| {
        router.route_layer(middleware::from_fn_with_state(
            (state.clone(), *check),
            enforce,
        ))
    })
}

async fn enforce(
    State((state, check)): State<(AppState, Check)>,
    mut req: Request,
    next: Next,
) -> Response {
    match check.run(&state, &mut req).await {
        Ok(()) => next.run(req).await,
        Err(e) => {
            debug!(?check, uri = %req.uri(), "access check rejected request");
            e.into_response()
        }
    }
}

/// Verifies the session cookie and attaches [`AuthUser`]. A missing cookie and a
/// bad token produce the same response.
pub fn authenticate(state: &AppState, req: &mut Request) -> Result<(), AppError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = session_token(&jar).ok_or_else(AppError::unauthorized)?;
    let user_id = state
        .keys
        .verify(&token)
        .map_err(|_| AppError::unauthorized())?;
    req.extensions_mut().insert(AuthUser(user_id));
    Ok(())
}

async fn resolve_user(state: &AppState, identity: Option<AuthUser>) -> Result<User, AppError> {
    let AuthUser(user_id) = identity.ok_or_else(AppError::unauthorized)?;
    state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}

pub async fn require_active(state: &AppState, identity: Option<AuthUser>) -> Result<(), AppError> {
    let user = resolve_user(state, identity).await?;
    if !user.is_active {
        warn!(user_id = %user.id, "inactive user rejected");
        return Err(AppError::Unauthorized("User is not active".into()));
    }
    Ok(())
}

pub async fn require_role(
    state: &AppState,
    identity: Option<AuthUser>,
    role: Role,
) -> Result<(), AppError> {
    let user = resolve_user(state, identity).await?;
    if user.role != role {
        warn!(user_id = %user.id, required = %role, actual = %user.role, "role check failed");
        return Err(AppError::Unauthorized(format!("User is not {role}")));
    }
    Ok(())
}
