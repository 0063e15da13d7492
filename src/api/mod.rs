use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::constants::routes;
use crate::services::{AuthService, UserService};
use crate::state::SharedState;

pub mod auth;
mod bid_list;
mod curve_point;
mod error;
pub mod gate;
mod home;
mod observability;
mod rating;
mod rule_name;
mod trade;
mod user;
pub mod validation;
pub mod views;

pub use error::ApiError;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        self.shared.config()
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn user_service(&self) -> &UserService {
        &self.shared.user_service
    }
}

/// Message shown when an id no longer names a record.
pub(crate) fn not_found_message(entity: &str, id: i32) -> String {
    format!("No {entity} found with id {id}")
}

/// Message shown when a validated write is rejected by the database.
pub(crate) fn save_failed_message(entity: &str) -> String {
    format!("Could not save {entity}, please try again")
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    views::templates()?;
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let (secure_cookies, inactivity_minutes) = {
        let server = &state.config().server;
        (server.secure_cookies, server.session_inactivity_minutes)
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_http_only(true)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            inactivity_minutes,
        )));

    Router::new()
        .route(routes::HOME, get(home::index))
        .route(routes::ADMIN_HOME, get(home::admin_home))
        .route(routes::LOGIN, get(auth::login_page).post(auth::login))
        .route(routes::LOGOUT, get(auth::logout).post(auth::logout))
        .route("/metrics", get(observability::get_metrics))
        .merge(bid_list::router())
        .merge(curve_point::router())
        .merge(rating::router())
        .merge(rule_name::router())
        .merge(trade::router())
        .merge(user::router())
        .fallback(home::not_found)
        .layer(middleware::from_fn(gate::gate_middleware))
        .layer(session_layer)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
