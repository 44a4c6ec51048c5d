use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use tracing::info;

use crate::{
    auth, db,
    error::{AppError, AppResult},
    models::{LoginRequest, RegisterUser},
    upload::FormOrJson,
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<RegisterUser>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let mut user = payload.validate()?;

    if db::user_exists(&state.db, &user.username, &user.email).await? {
        return Err(AppError::Conflict(
            "Username or email already exists".to_string(),
        ));
    }

    user.password = auth::hash_password(&user.password)?;
    let id = db::insert_user(&state.db, &user).await?;

    info!(id, username = %user.username, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully!" })),
    ))
}

/// Checks credentials only; no session or token is issued.
pub async fn login(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<LoginRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    };

    let user = db::fetch_user_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username".to_string()))?;

    if !auth::verify_password(&password, &user.password) {
        info!(username = %username, "Rejected login: wrong password");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    info!(id = user.id, username = %username, "User logged in");

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Login successful" })),
    ))
}
