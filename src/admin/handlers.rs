use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    dto::UserListResponse,
    pagination::{PageQuery, Pagination},
};
use crate::{
    auth::AuthUser,
    error::{AppError, MessageBody},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/getallusers", get(list_users))
        .route("/admin/users/:id/activate", patch(activate_user))
        .route("/admin/users/:id/deactivate", patch(deactivate_user))
}

/// Admin accounts are left out of `users` but still counted in `totalUsers`.
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(admin_id): AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> Result<Json<UserListResponse>, AppError> {
    let page = Pagination::from(&query);
    let users = state
        .store
        .list_non_admins(page.limit, page.skip())
        .await?;
    let total_users = state.store.count_all().await?;
    debug!(admin_id = %admin_id, page = page.page, listed = users.len(), "users listed");

    Ok(Json(UserListResponse {
        message: "Users fetched successfully".into(),
        users,
        total_users,
        current_page: page.page,
        total_pages: page.total_pages(total_users),
    }))
}

async fn set_active(
    state: &AppState,
    admin_id: Uuid,
    target: &str,
    active: bool,
) -> Result<(), AppError> {
    // Unparseable ids cannot name an account.
    let target_id = Uuid::parse_str(target).map_err(|_| AppError::user_not_found())?;
    let mut user = state
        .store
        .find_by_id(target_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    user.is_active = active;
    state.store.save(&user).await?;
    info!(admin_id = %admin_id, user_id = %user.id, active, "account activity changed");
    Ok(())
}

#[instrument(skip(state))]
pub async fn activate_user(
    State(state): State<AppState>,
    AuthUser(admin_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    set_active(&state, admin_id, &id, true).await?;
    Ok(Json(MessageBody {
        message: "User activated successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    AuthUser(admin_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    set_active(&state, admin_id, &id, false).await?;
    Ok(Json(MessageBody {
        message: "User deactivated successfully".into(),
    }))
}
