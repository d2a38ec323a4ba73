use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use tracing::{info, instrument};

use crate::auth::middleware::{require_auth, CurrentUser};
use crate::categories::dto::CategoryPayload;
use crate::categories::repo::{self, Category};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Creating a category requires a signed-in user; reading them does not,
/// since the list doubles as a picker for clients before login state is
/// known.
pub fn write_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route_layer(from_fn_with_state(state, require_auth))
}

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:id", get(get_category))
}

#[instrument(skip(state, user, payload))]
async fn create_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> ApiResult<Json<Category>> {
    let Json(payload) = payload.map_err(ApiError::from)?;
    let description = payload.validate()?;
    let category = repo::create(&state.db, &description).await?;
    info!(category_id = category.id, user_id = user.id, "created category");
    Ok(Json(category))
}

#[instrument(skip(state))]
async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = repo::list(&state.db).await?;
    Ok(Json(categories))
}

#[instrument(skip(state))]
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Category>> {
    let category = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(Json(category))
}
