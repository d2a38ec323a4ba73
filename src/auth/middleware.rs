use axum::{
    extract::{FromRef, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    auth::{jwt::JwtKeys, repo::User},
    error::ApiError,
    state::AppState,
};

/// Identity resolved once per request and handed to handlers through
/// request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Bearer-token gate for every route that needs a caller identity.
///
/// Token problems, malformed headers and unknown subjects all collapse into
/// uniform 401s so the response never reveals which check failed. A known
/// but disabled user is the one distinguishable case and gets a 400.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "token rejected");
        ApiError::unauthorized("Could not validate credentials")
    })?;

    let user = User::find_by_username(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;

    if user.disabled {
        return Err(ApiError::bad_request("Inactive user"));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
