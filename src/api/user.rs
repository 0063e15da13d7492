//! Administration of application accounts. Every route here sits behind the
//! admin rule of the gate.

use axum::{
    Extension, Form, Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{set_flash, take_flash};
use super::validation::{FieldErrors, required_text};
use super::views::{self, Field, FormPage, Row};
use super::{ApiError, AppState, not_found_message, save_failed_message};
use crate::db::User;
use crate::domain::password::check_password_policy;
use crate::domain::{CurrentUser, Role};
use crate::services::AccountInput;

const ENTITY: &str = "user";
const LIST: &str = "/user/list";

const ROLE_OPTIONS: &[(&str, &str)] = &[("ADMIN", "Admin"), ("USER", "User")];

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/list", get(list))
        .route("/user/add", get(add_form))
        .route("/user/validate", post(validate))
        .route("/user/update/{id}", get(update_form).post(update))
        .route("/user/delete/{id}", get(delete))
}

#[derive(Default, Clone, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub username: String,
    pub fullname: String,
    pub password: String,
    pub role: String,
}

impl std::fmt::Debug for UserForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserForm")
            .field("username", &self.username)
            .field("fullname", &self.fullname)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl UserForm {
    /// A blank password is an error on create and means "keep the current
    /// one" on update.
    pub fn validate(&self, password_required: bool) -> Result<AccountInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = required_text(&mut errors, "username", "Username", &self.username);
        let fullname = required_text(&mut errors, "fullname", "FullName", &self.fullname);

        let password = if self.password.is_empty() {
            if password_required {
                errors.add("password", "Password is mandatory");
            }
            None
        } else {
            if let Err(message) = check_password_policy(&self.password) {
                errors.add("password", message);
            }
            Some(self.password.clone())
        };

        let role = if self.role.trim().is_empty() {
            errors.add("role", "Role is mandatory");
            Role::User
        } else {
            self.role.parse::<Role>().unwrap_or_else(|_| {
                errors.add("role", "Role must be ADMIN or USER");
                Role::User
            })
        };

        errors.finish(AccountInput {
            username,
            fullname,
            role,
            password,
        })
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::text("username", "Username", &self.username),
            Field::text("fullname", "Full Name", &self.fullname),
            Field::password("password", "Password"),
            Field::select("role", "Role", &self.role, ROLE_OPTIONS),
        ]
    }
}

impl From<User> for UserForm {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            fullname: user.fullname,
            password: String::new(),
            role: user.role,
        }
    }
}

fn render_form(
    user: &CurrentUser,
    id: Option<i32>,
    form: &UserForm,
    errors: &FieldErrors,
    message: Option<&str>,
) -> Result<Response, ApiError> {
    let title = if id.is_some() { "Update User" } else { "Add User" };
    let page = FormPage {
        title,
        entity: ENTITY,
        id,
        fields: form.fields(),
        errors,
        message,
    };
    Ok(views::form_page(user, &page)?.into_response())
}

/// Field validation followed by the username uniqueness check.
async fn checked_input(
    state: &AppState,
    form: &UserForm,
    id: Option<i32>,
) -> Result<Result<AccountInput, FieldErrors>, ApiError> {
    let input = match form.validate(id.is_none()) {
        Ok(input) => input,
        Err(errors) => return Ok(Err(errors)),
    };

    if state
        .user_service()
        .username_taken(&input.username, id)
        .await?
    {
        let mut errors = FieldErrors::new();
        errors.add("username", "Username already exists");
        return Ok(Err(errors));
    }

    Ok(Ok(input))
}

async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    let flash = take_flash(&session).await?;
    let rows = state
        .user_service()
        .list()
        .await?
        .into_iter()
        .map(|account| Row {
            id: account.id,
            cells: vec![
                account.id.to_string(),
                account.username,
                account.fullname,
                account.role,
            ],
        })
        .collect();

    views::list_page(
        &user,
        "User List",
        ENTITY,
        &["Id", "Username", "Full Name", "Role"],
        rows,
        flash.as_deref(),
    )
}

async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, ApiError> {
    let form = UserForm {
        role: Role::User.as_str().to_string(),
        ..UserForm::default()
    };
    render_form(&user, None, &form, &FieldErrors::new(), None)
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<UserForm>,
) -> Result<Response, ApiError> {
    let input = match checked_input(&state, &form, None).await? {
        Ok(input) => input,
        Err(errors) => return render_form(&user, None, &form, &errors, None),
    };

    // The unique index still rejects a concurrent create of the same name.
    if let Err(e) = state.user_service().create(input).await {
        tracing::error!(username = %form.username, error = %e, "Failed to create user");
        let message = save_failed_message(ENTITY);
        return render_form(&user, None, &form, &FieldErrors::new(), Some(&message));
    }

    Ok(Redirect::to(LIST).into_response())
}

async fn update_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    match state.user_service().get(id).await? {
        Some(account) => render_form(
            &user,
            Some(id),
            &UserForm::from(account),
            &FieldErrors::new(),
            None,
        ),
        None => {
            set_flash(&session, not_found_message(ENTITY, id)).await?;
            Ok(Redirect::to(LIST).into_response())
        }
    }
}

async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Form(form): Form<UserForm>,
) -> Result<Response, ApiError> {
    let input = match checked_input(&state, &form, Some(id)).await? {
        Ok(input) => input,
        Err(errors) => return render_form(&user, Some(id), &form, &errors, None),
    };

    let message = match state.user_service().update(id, input).await {
        Ok(Some(_)) => return Ok(Redirect::to(LIST).into_response()),
        Ok(None) => not_found_message(ENTITY, id),
        Err(e) => {
            tracing::error!(id, error = %e, "Failed to update user");
            save_failed_message(ENTITY)
        }
    };
    render_form(&user, Some(id), &form, &FieldErrors::new(), Some(&message))
}

async fn delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Redirect, ApiError> {
    if !state.user_service().delete(id).await? {
        set_flash(&session, not_found_message(ENTITY, id)).await?;
    }
    Ok(Redirect::to(LIST))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, role: &str) -> UserForm {
        UserForm {
            username: "trader".into(),
            fullname: "Trader Joe".into(),
            password: password.into(),
            role: role.into(),
        }
    }

    #[test]
    fn test_password_required_on_create_only() {
        let errors = form("", "USER").validate(true).unwrap_err();
        assert_eq!(errors.get("password"), Some("Password is mandatory"));

        let input = form("", "USER").validate(false).unwrap();
        assert!(input.password.is_none());
    }

    #[test]
    fn test_password_policy_applied() {
        let errors = form("password", "USER").validate(true).unwrap_err();
        assert!(errors.get("password").is_some());

        let input = form("Passw0rd!", "USER").validate(true).unwrap();
        assert_eq!(input.password.as_deref(), Some("Passw0rd!"));
    }

    #[test]
    fn test_role_spellings() {
        for spelling in ["ADMIN", "admin", "ROLE_ADMIN"] {
            let input = form("Passw0rd!", spelling).validate(true).unwrap();
            assert_eq!(input.role, Role::Admin);
        }

        let errors = form("Passw0rd!", "ROOT").validate(true).unwrap_err();
        assert_eq!(errors.get("role"), Some("Role must be ADMIN or USER"));
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", form("Passw0rd!", "USER"));
        assert!(!rendered.contains("Passw0rd!"));
    }
}
