use axum::{extract::State, Json};
use tracing::info;

use crate::{db, error::AppResult, models::Bill, AppState};

pub async fn list_bills(State(state): State<AppState>) -> AppResult<Json<Vec<Bill>>> {
    let bills = db::fetch_bills(&state.db).await?;
    info!(count = bills.len(), "Listed bills");
    Ok(Json(bills))
}
