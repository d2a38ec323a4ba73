use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::auth::middleware::{require_auth, CurrentUser};
use crate::categories;
use crate::error::{ApiError, ApiResult, FieldError};
use crate::expenses::dto::{ExpensePayload, MessageResponse};
use crate::expenses::query::{ExpenseFilter, ListParams};
use crate::expenses::repo::{self, Expense};
use crate::ownership::CheckOwner;
use crate::state::AppState;

/// Expense CRUD. Every route requires a valid bearer token, and every
/// lookup is scoped to the caller: someone else's expense id answers the
/// same 404 as an id that was never issued.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/expenses", post(create_expense).get(list_expenses))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route_layer(from_fn_with_state(state, require_auth))
}

#[instrument(skip(state, user, payload))]
async fn create_expense(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> ApiResult<Json<Expense>> {
    let Json(payload) = payload.map_err(ApiError::from)?;
    let data = payload.validate()?;
    ensure_category_exists(&state.db, data.category_id).await?;

    let now = OffsetDateTime::now_utc();
    let expense = repo::create(&state.db, user.id, &data, now).await?;
    info!(expense_id = expense.id, user_id = user.id, "created expense");
    Ok(Json(expense))
}

#[instrument(skip(state, user))]
async fn list_expenses(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Expense>>> {
    let filter = ExpenseFilter::from_params(params)?;
    let expenses = repo::list(&state.db, user.id, &filter).await?;
    Ok(Json(expenses))
}

#[instrument(skip(state, user))]
async fn get_expense(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Expense>> {
    let expense = repo::find_by_id(&state.db, id)
        .await?
        .owned_by(user.id, "Expense not found")?;
    Ok(Json(expense))
}

#[instrument(skip(state, user, payload))]
async fn update_expense(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> ApiResult<Json<Expense>> {
    let Json(payload) = payload.map_err(ApiError::from)?;
    let data = payload.validate()?;
    repo::find_by_id(&state.db, id)
        .await?
        .owned_by(user.id, "Expense not found")?;
    ensure_category_exists(&state.db, data.category_id).await?;

    let now = OffsetDateTime::now_utc();
    let expense = repo::update(&state.db, id, &data, now).await?;
    info!(expense_id = expense.id, user_id = user.id, "updated expense");
    Ok(Json(expense))
}

#[instrument(skip(state, user))]
async fn delete_expense(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    repo::find_by_id(&state.db, id)
        .await?
        .owned_by(user.id, "Expense not found")?;
    repo::delete(&state.db, id).await?;
    info!(expense_id = id, user_id = user.id, "deleted expense");
    Ok(Json(MessageResponse::new("Expense deleted successfully")))
}

/// A payload may name a category that does not exist. SQLite only enforces
/// the foreign key when the pragma is on, so the reference is checked here
/// and reported as a field error on `category_id`.
async fn ensure_category_exists(
    db: &SqlitePool,
    category_id: Option<i64>,
) -> Result<(), ApiError> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    if categories::repo::find_by_id(db, category_id).await?.is_none() {
        return Err(ApiError::validation(vec![FieldError::body(
            "category_id",
            format!("Category {category_id} does not exist"),
            "foreign_key",
        )]));
    }
    Ok(())
}
