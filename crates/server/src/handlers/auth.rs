//! Signup and login endpoints.

use crate::auth::{generate_token, hash_token};
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::read_json_body;
use crate::password;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Request, State};
use serde::{Deserialize, Serialize};
use stockroom_store::StoreError;
use stockroom_store::models::{NewSession, NewUser};
use stockroom_store::repos::{SessionRepo, UserRepo};
use time::{Duration, OffsetDateTime};

/// Request to register a new user.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response from signup: a ready-to-use access credential.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub token: String,
}

/// Request to authenticate.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response from login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mint an opaque bearer token and persist its session.
async fn issue_session(
    state: &AppState,
    user_id: i64,
    ttl: Duration,
    now: OffsetDateTime,
) -> ApiResult<String> {
    let token = generate_token();
    state
        .store
        .create_session(&NewSession {
            token_hash: hash_token(&token),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        })
        .await?;
    Ok(token)
}

/// POST /api/auth/signup - Register a user and return an access credential.
pub async fn signup(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<SignupResponse>> {
    let payload: SignupRequest = read_json_body(req).await?;

    let name = payload.name.as_deref().map(str::trim).unwrap_or("");
    let email = payload.email.as_deref().map(str::trim).unwrap_or("");
    let password = payload.password.as_deref().unwrap_or("");

    if email.is_empty() {
        return Err(ApiError::Validation {
            field: "email",
            message: "email is required".to_string(),
        });
    }
    if password.is_empty() {
        return Err(ApiError::Validation {
            field: "password",
            message: "password is required".to_string(),
        });
    }

    if state.store.get_user_by_email(email).await?.is_some() {
        return Err(ApiError::BadRequest("email already registered".to_string()));
    }

    let now = OffsetDateTime::now_utc();
    let user = state
        .store
        .create_user(&NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password::hash_password(password)?,
            created_at: now,
        })
        .await
        .map_err(|err| match err {
            // Lost a signup race for the same email; same answer as the
            // pre-check.
            StoreError::AlreadyExists(_) => {
                ApiError::BadRequest("email already registered".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = user.id, "user registered");

    let token = issue_session(&state, user.id, state.config.auth.access_ttl(), now).await?;
    Ok(Json(SignupResponse { token }))
}

/// POST /api/auth/login - Authenticate and mint access + refresh credentials.
pub async fn login(State(state): State<AppState>, req: Request) -> ApiResult<Json<LoginResponse>> {
    let payload: LoginRequest = read_json_body(req).await?;

    let email = payload.email.as_deref().map(str::trim).unwrap_or("");
    let password = payload.password.as_deref().unwrap_or("");

    // Uniform rejection: unknown email and wrong password are
    // indistinguishable to the caller.
    let invalid = || ApiError::BadRequest("invalid credentials".to_string());

    if email.is_empty() || password.is_empty() {
        return Err(invalid());
    }

    let user = state
        .store
        .get_user_by_email(email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&user.password_hash, password)? {
        return Err(invalid());
    }

    let now = OffsetDateTime::now_utc();
    let access_token = issue_session(&state, user.id, state.config.auth.access_ttl(), now).await?;
    let refresh_token =
        issue_session(&state, user.id, state.config.auth.refresh_ttl(), now).await?;

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
    }))
}
