use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterRequest, TokenResponse, UserRead},
        jwt::JwtKeys,
        middleware::{require_auth, CurrentUser},
        password,
        repo::User,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
}

pub fn me_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(me))
        .route_layer(axum::middleware::from_fn_with_state(state, require_auth))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<UserRead>> {
    let Json(payload) = payload.map_err(ApiError::from)?;
    let (username, password) = payload.into_parts()?;

    if User::find_by_username(&state.db, &username).await?.is_some() {
        warn!(username = %username, "username already registered");
        return Err(ApiError::bad_request("Username already registered"));
    }

    let hash = password::hash_password(&password)?;
    let user = User::create(&state.db, &username, &hash).await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(Json(user.into()))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let (username, password) = form.into_parts()?;

    let user = User::find_by_username(&state.db, &username).await?;
    let verified = match &user {
        Some(user) => password::verify_password(&password, &user.password_hash)?,
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        warn!(username = %username, "login rejected");
        return Err(ApiError::unauthorized("Incorrect username or password"));
    };

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(&user.username)?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

#[instrument(skip_all)]
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserRead> {
    Json(user.into())
}
