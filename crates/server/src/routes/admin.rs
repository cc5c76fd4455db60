//! Admin API route handlers.
//!
//! The login is a placeholder: it checks the configured credentials and
//! hands back a random token, but no route requires that token yet.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use rand::RngCore;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vitrine_core::Insights;

use crate::error::{AppError, Result};
use crate::state::AppState;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

/// Favourite statistics, recomputed on every call.
pub async fn insights(State(state): State<AppState>) -> Result<Json<Insights>> {
    Ok(Json(state.insights().compute().await?))
}

/// Check the admin credentials and issue an opaque token.
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let Some(admin) = &state.config().admin else {
        warn!("Admin login attempted but no credentials are configured");
        return Err(AppError::Unauthorized("admin login disabled".to_string()));
    };

    // Both comparisons always run.
    let username_ok = constant_time_compare(&admin.username, &request.username);
    let password_ok = constant_time_compare(admin.password.expose_secret(), &request.password);
    if !(username_ok & password_ok) {
        warn!("Admin login failed");
        return Err(AppError::Unauthorized("bad credentials".to_string()));
    }

    let mut token = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut token);

    info!("Admin logged in");
    Ok(Json(LoginResponse {
        success: true,
        token: hex::encode(token),
    }))
}

/// Constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_different() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }
}
