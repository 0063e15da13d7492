//! Authorization gate run in front of every route.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::ApiError;
use crate::constants::{routes, session as keys};
use crate::domain::{CurrentUser, Role};

/// What a request path demands of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    Public,
    Authenticated,
    Admin,
}

impl AccessRule {
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::Public | Self::Authenticated => None,
            Self::Admin => Some(Role::Admin),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Authenticated => "authenticated",
            Self::Admin => "admin",
        }
    }
}

/// How the gate settled a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Allowed,
    LoginRequired,
    Denied,
}

impl GateOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::LoginRequired => "login_required",
            Self::Denied => "denied",
        }
    }
}

/// Response extension read back by the request logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    pub rule: AccessRule,
    pub outcome: GateOutcome,
}

/// First matching rule wins: root, login, the user admin area, then
/// everything else.
#[must_use]
pub fn classify(path: &str) -> AccessRule {
    if path == routes::HOME || path == routes::LOGIN {
        return AccessRule::Public;
    }

    match path.strip_prefix(routes::USER_ADMIN_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => AccessRule::Admin,
        _ => AccessRule::Authenticated,
    }
}

#[must_use]
pub fn decide(rule: AccessRule, role: Option<Role>) -> GateOutcome {
    match (rule, role) {
        (AccessRule::Public, _) => GateOutcome::Allowed,
        (_, None) => GateOutcome::LoginRequired,
        (rule, Some(role)) => match rule.required_role() {
            Some(required) if !role.can_access(required) => GateOutcome::Denied,
            _ => GateOutcome::Allowed,
        },
    }
}

/// Loads the principal from the session, enforces the path's rule and hands
/// the principal to handlers as a `CurrentUser` extension.
pub async fn gate_middleware(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let rule = classify(request.uri().path());
    let user = session.get::<CurrentUser>(keys::PRINCIPAL_KEY).await?;

    let span = tracing::Span::current();
    span.record("access_rule", rule.as_str());
    if let Some(user) = &user {
        span.record("username", user.username.as_str());
        span.record("role", user.role.as_str());
    }

    let outcome = decide(rule, user.as_ref().map(|user| user.role));
    let mut response = match (outcome, user) {
        (GateOutcome::LoginRequired, _) => Redirect::to(routes::LOGIN).into_response(),
        (GateOutcome::Denied, user) => {
            tracing::warn!(
                username = user.as_ref().map_or("", |user| user.username.as_str()),
                path = %request.uri().path(),
                "Access denied"
            );
            ApiError::Forbidden.into_response()
        }
        (GateOutcome::Allowed, user) => {
            if let Some(user) = user {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
    };

    response
        .extensions_mut()
        .insert(GateDecision { rule, outcome });
    Ok(response)
}
