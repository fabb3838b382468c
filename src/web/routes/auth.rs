//! Registration, login, and logout handlers.

use crate::{
    core::auth,
    errors::Result,
    web::{AppState, session},
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    /// Login name; falls back to the email address when blank
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `POST /auth/register` - creates a shopper account.
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<Response> {
    let account = auth::register(
        &state.db,
        &form.username,
        &form.password,
        &form.name,
        &form.email,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(account)).into_response())
}

/// `POST /auth/login` - starts a session.
///
/// The token is returned in the body for API clients and also set as a
/// `session` cookie for browsers.
pub async fn login(State(state): State<AppState>, Json(form): Json<LoginForm>) -> Result<Response> {
    let session = auth::login(&state.db, &form.username, &form.password).await?;
    let cookie = format!("session={}; Path=/; HttpOnly", session.token);
    let body = Json(json!({
        "token": session.token,
        "user_id": session.identity.user_id,
        "username": session.identity.username,
        "role": session.identity.role,
    }));
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

/// `POST /auth/logout` - ends the presented session, if any.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if let Some(token) = session::session_token(&headers) {
        auth::logout(&state.db, &token).await?;
    }
    let cookie = "session=; Path=/; HttpOnly; Max-Age=0".to_string();
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "status": "logged out" })),
    )
        .into_response())
}
