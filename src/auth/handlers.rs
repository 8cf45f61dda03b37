use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie::{session_token, with_session, without_session},
        dto::{AuthResponse, LoginRequest, MeResponse, RegisterRequest, UserSummary},
        password::{hash_password_blocking, verify_password_blocking},
        validation::{check_password_strength, checked_email, checked_full_name, normalize_email},
    },
    error::{AppError, MessageBody},
    state::AppState,
    store::NewUser,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(get_me))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let full_name = checked_full_name(&payload.full_name)?;
    let email = checked_email(&payload.email)?;
    check_password_strength(&payload.password)?;

    if state.store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password_blocking(payload.password).await?;
    let user = state
        .store
        .create(NewUser {
            email,
            full_name,
            password_hash,
            role: payload.role,
        })
        .await?;

    let token = state.keys.issue(user.id)?;
    let jar = with_session(jar, &state.config.cookie, token.clone(), state.keys.ttl());

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "User registered successfully".into(),
            user: UserSummary::from(&user),
            token,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Email and password are required".into()));
    }

    let user = match state.store.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::user_not_found());
        }
    };

    if !user.is_active {
        warn!(user_id = %user.id, "login of inactive user");
        return Err(AppError::Inactive);
    }

    if !verify_password_blocking(payload.password, user.password_hash.clone()).await? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.keys.issue(user.id)?;
    let jar = with_session(jar, &state.config.cookie, token.clone(), state.keys.ttl());

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        jar,
        Json(AuthResponse {
            message: "User logged in successfully".into(),
            user: UserSummary::from(&user),
            token,
        }),
    ))
}

/// Clears the cookie only; the token itself stays valid until it expires.
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageBody>) {
    (
        without_session(jar, &state.config.cookie),
        Json(MessageBody {
            message: "User logged out successfully".into(),
        }),
    )
}

/// Resolves the session cookie itself rather than through the pipeline, so a
/// missing or bad session is a 400 here.
#[instrument(skip(state, jar))]
pub async fn get_me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<MeResponse>, AppError> {
    let unauthorized = || AppError::Validation("Unauthorized".into());
    let token = session_token(&jar).ok_or_else(unauthorized)?;
    let user_id = state.keys.verify(&token).map_err(|_| unauthorized())?;

    let user = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    Ok(Json(MeResponse {
        message: "User logged in successfully".into(),
        user: UserSummary::from(&user),
    }))
}
