pub mod dto;
pub mod handlers;
pub mod query;
pub mod repo;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    handlers::routes(state)
}
