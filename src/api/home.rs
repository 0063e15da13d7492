use axum::{
    Extension,
    response::{Html, Redirect},
};

use super::{ApiError, views};
use crate::constants::routes;
use crate::domain::CurrentUser;

/// GET /
pub async fn index(user: Option<Extension<CurrentUser>>) -> Result<Html<String>, ApiError> {
    views::home_page(user.as_ref().map(|Extension(user)| user))
}

/// GET /admin/home
pub async fn admin_home() -> Redirect {
    Redirect::to(routes::DEFAULT_LANDING)
}

/// Fallback for paths no route matches. The gate has already redirected
/// anonymous requests to the login page.
pub async fn not_found() -> ApiError {
    ApiError::page_not_found()
}
