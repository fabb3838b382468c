//! Session-token extraction and identity guards.
//!
//! A request proves who it is with a session token, presented either as
//! `Authorization: Bearer <token>` or as a `session` cookie set at login.
//! The bearer header wins when both are present.

use crate::{
    core::auth::{self, Identity},
    errors::{Error, Result},
    web::AppState,
};
use axum::http::{HeaderMap, header};

/// Pulls the session token out of the request headers, if any.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(text) = value.to_str() {
            if let Some(token) = text.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "session").then(|| value.to_string())
    })
}

/// Resolves the request identity, failing with `AuthRequired` when no
/// valid session is presented.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<Identity> {
    let token = session_token(headers).ok_or(Error::AuthRequired)?;
    auth::resolve_session(&state.db, &token).await
}

/// Resolves the request identity and additionally requires the Admin role.
pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Identity> {
    let identity = require_user(state, headers).await?;
    if identity.is_admin() {
        Ok(identity)
    } else {
        Err(Error::Forbidden)
    }
}
