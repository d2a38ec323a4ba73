use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tracing::instrument;

use crate::auth::middleware::{require_auth, CurrentUser};
use crate::error::ApiResult;
use crate::expenses::query::{DateRange, RangeParams};
use crate::reports::repo;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/reports/expenses", get(expenses_by_category))
        .route_layer(from_fn_with_state(state, require_auth))
}

#[instrument(skip(state, user))]
async fn expenses_by_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<BTreeMap<String, f64>>> {
    let range = DateRange::from_params(params)?;
    let totals = repo::totals_by_category(&state.db, user.id, &range).await?;
    Ok(Json(totals))
}
