use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::{info, instrument, warn};

use super::dto::{ChangePasswordRequest, ProfileResponse, UpdateProfileRequest};
use crate::{
    auth::{
        password::{hash_password_blocking, verify_password_blocking},
        validation::{check_password_strength, checked_email, checked_full_name},
        AuthUser,
    },
    error::{AppError, MessageBody},
    state::AppState,
    store::User,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(get_profile).patch(update_profile))
        .route("/user/changepassword", patch(change_password))
}

/// Blank strings count as omitted.
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn load_user(state: &AppState, user_id: uuid::Uuid) -> Result<User, AppError> {
    state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(ProfileResponse {
        message: "User found".into(),
        user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateProfileRequest>, AppError>,
) -> Result<Json<ProfileResponse>, AppError> {
    let password = provided(payload.password)
        .ok_or_else(|| AppError::Validation("Password is required".into()))?;

    let mut user = load_user(&state, user_id).await?;

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        warn!(user_id = %user_id, "profile update with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    if let Some(full_name) = provided(payload.full_name) {
        user.full_name = checked_full_name(&full_name)?;
    }
    if let Some(email) = provided(payload.email) {
        user.email = checked_email(&email)?;
    }

    state.store.save(&user).await?;

    info!(user_id = %user.id, email = %user.email, "profile updated");
    Ok(Json(ProfileResponse {
        message: "User updated successfully".into(),
        user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<ChangePasswordRequest>, AppError>,
) -> Result<Json<MessageBody>, AppError> {
    let (Some(current), Some(new)) = (
        payload.current_password.filter(|p| !p.is_empty()),
        payload.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Password is required".into()));
    };

    let mut user = load_user(&state, user_id).await?;

    if !verify_password_blocking(current, user.password_hash.clone()).await? {
        warn!(user_id = %user_id, "password change with wrong current password");
        return Err(AppError::InvalidCredentials);
    }
    if verify_password_blocking(new.clone(), user.password_hash.clone()).await? {
        return Err(AppError::Validation(
            "New password cannot be same as old password".into(),
        ));
    }
    check_password_strength(&new)?;

    // Read-then-write without a transaction; a concurrent change may win.
    user.password_hash = hash_password_blocking(new).await?;
    state.store.save(&user).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(MessageBody {
        message: "Password changed successfully".into(),
    }))
}
