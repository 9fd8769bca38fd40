//! Authentication Middleware
//!
//! Session cookie validation for protected routes. This is the only place
//! a session token is checked.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::shared::error::AppError;
use crate::shared::object_id::ObjectId;
use crate::startup::AppState;

/// Authenticated admin extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthAdmin {
    pub admin_id: ObjectId,
}

/// Reject requests without a valid session cookie.
///
/// No cookie is `Authorization`; a cookie whose token fails verification
/// is `Credentials`. Either way the handler does not run.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = state
        .session
        .token(&jar)
        .ok_or_else(AppError::authorization)?;

    let claims = state.auth.verify_token(&token)?;
    let admin_id = claims.admin_id()?;

    // Insert authenticated admin into request extensions
    request.extensions_mut().insert(AuthAdmin { admin_id });

    Ok(next.run(request).await)
}
