use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState, views};
use crate::constants::{messages, routes, session as keys};
use crate::services::AuthError;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginQuery {
    pub logout: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /login
pub async fn login_page(Query(query): Query<LoginQuery>) -> Result<Html<String>, ApiError> {
    views::login_page("", None, query.logout.is_some())
}

/// POST /login
/// On success the session id is replaced before the principal is stored.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    match state
        .auth_service()
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(principal) => {
            session.cycle_id().await?;
            session
                .insert(keys::PRINCIPAL_KEY, principal.to_current_user())
                .await?;

            metrics::counter!("auth_login_attempts_total", "outcome" => "success").increment(1);
            tracing::info!(
                username = %principal.username,
                authority = principal.authority(),
                "Login succeeded"
            );

            Ok(Redirect::to(routes::DEFAULT_LANDING).into_response())
        }
        Err(AuthError::BadCredentials | AuthError::CredentialsNotFound) => {
            metrics::counter!("auth_login_attempts_total", "outcome" => "failure").increment(1);
            tracing::warn!(username = %form.username, "Login failed");

            Ok(views::login_page(&form.username, Some(messages::BAD_CREDENTIALS), false)?
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET|POST /logout
pub async fn logout(session: Session) -> Result<Redirect, ApiError> {
    if let Some(user) = session
        .get::<crate::domain::CurrentUser>(keys::PRINCIPAL_KEY)
        .await?
    {
        tracing::info!(username = %user.username, "Logged out");
    }
    session.flush().await?;
    Ok(Redirect::to(&format!("{}?logout", routes::LOGIN)))
}

// ============================================================================
// Helpers
// ============================================================================

/// Stores a one-shot message shown on the next list page.
pub async fn set_flash(session: &Session, message: impl Into<String>) -> Result<(), ApiError> {
    session.insert(keys::FLASH_KEY, message.into()).await?;
    Ok(())
}

/// Removes and returns the pending flash message.
pub async fn take_flash(session: &Session) -> Result<Option<String>, ApiError> {
    Ok(session.remove::<String>(keys::FLASH_KEY).await?)
}
