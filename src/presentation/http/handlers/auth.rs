//! Authentication Handlers

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::application::dto::{LoginRequest, LoginResponse};
use crate::domain::{Admin, NewAdmin};
use crate::presentation::middleware::AuthAdmin;
use crate::shared::error::AppError;
use crate::shared::validation::validate;
use crate::startup::AppState;

/// Check credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let Json(body) = body?;
    validate(&body)?;

    let admin = state.auth.authenticate(&body.username, &body.password).await?;
    let token = state.auth.issue_token(&admin.id)?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");

    let jar = state.session.set(jar, token);
    Ok((
        jar,
        Json(LoginResponse {
            admin,
            expires_in: state.auth.token_lifetime(),
        }),
    ))
}

/// End the session by expiring the cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (state.session.clear(jar), StatusCode::NO_CONTENT)
}

/// Create an admin account; mounted only when registration is enabled
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<NewAdmin>, JsonRejection>,
) -> Result<(StatusCode, Json<Admin>), AppError> {
    let Json(body) = body?;
    let admin = state.crud::<Admin>().add(body).await?;

    tracing::info!(admin_id = %admin.id, "Admin registered");
    Ok((StatusCode::CREATED, Json(admin)))
}

/// The admin the session belongs to
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
) -> Result<Json<Admin>, AppError> {
    let admin = state
        .crud::<Admin>()
        .get_by_id(&auth.admin_id.to_string())
        .await?;
    Ok(Json(admin))
}
