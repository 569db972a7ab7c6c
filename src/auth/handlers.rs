use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MeResponse, RegisterRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        warn!("registration with missing email or password");
        return Err(ApiError::Validation(
            "Email and password are required".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;

    // The store's unique index decides duplicates, including racing requests.
    let user = state
        .store
        .insert(&payload.email, &hash, payload.name.as_deref())
        .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".into(),
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // Unknown email and wrong password take the same error path so the
    // response cannot be used to enumerate accounts.
    let user = state
        .store
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| {
            warn!("login with unknown email");
            ApiError::InvalidCredentials
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    // A valid token for a since-deleted user is still unauthorized.
    let user = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(MeResponse { user: user.into() }))
}
