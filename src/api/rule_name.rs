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
use crate::db::RuleNameInput;
use crate::domain::CurrentUser;
use crate::entities::rule_name;

const ENTITY: &str = "ruleName";
const LIST: &str = "/ruleName/list";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ruleName/list", get(list))
        .route("/ruleName/add", get(add_form))
        .route("/ruleName/validate", post(validate))
        .route("/ruleName/update/{id}", get(update_form).post(update))
        .route("/ruleName/delete/{id}", get(delete))
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleNameForm {
    pub name: String,
    pub description: String,
    pub json: String,
    pub template: String,
    pub sql_str: String,
    pub sql_part: String,
}

impl RuleNameForm {
    pub fn validate(&self) -> Result<RuleNameInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = RuleNameInput {
            name: required_text(&mut errors, "name", "Name", &self.name),
            description: required_text(&mut errors, "description", "Description", &self.description),
            json: required_text(&mut errors, "json", "Json", &self.json),
            template: required_text(&mut errors, "template", "Template", &self.template),
            sql_str: required_text(&mut errors, "sqlStr", "SQL", &self.sql_str),
            sql_part: required_text(&mut errors, "sqlPart", "SQL part", &self.sql_part),
        };
        errors.finish(input)
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::text("name", "Name", &self.name),
            Field::text("description", "Description", &self.description),
            Field::text("json", "Json", &self.json),
            Field::text("template", "Template", &self.template),
            Field::text("sqlStr", "SQL", &self.sql_str),
            Field::text("sqlPart", "SQL Part", &self.sql_part),
        ]
    }
}

impl From<rule_name::Model> for RuleNameForm {
    fn from(model: rule_name::Model) -> Self {
        Self {
            name: model.name,
            description: model.description,
            json: model.json,
            template: model.template,
            sql_str: model.sql_str,
            sql_part: model.sql_part,
        }
    }
}

fn render_form(
    user: &CurrentUser,
    id: Option<i32>,
    form: &RuleNameForm,
    errors: &FieldErrors,
    message: Option<&str>,
) -> Result<Response, ApiError> {
    let title = if id.is_some() { "Update Rule" } else { "Add Rule" };
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

async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    let flash = take_flash(&session).await?;
    let rows = state
        .store()
        .rule_name_repo()
        .list()
        .await?
        .into_iter()
        .map(|rule| Row {
            id: rule.id,
            cells: vec![
                rule.id.to_string(),
                rule.name,
                rule.description,
                rule.json,
                rule.template,
                rule.sql_str,
                rule.sql_part,
            ],
        })
        .collect();

    views::list_page(
        &user,
        "Rule Names",
        ENTITY,
        &["Id", "Name", "Description", "Json", "Template", "SQL", "SQL Part"],
        rows,
        flash.as_deref(),
    )
}

async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, ApiError> {
    render_form(&user, None, &RuleNameForm::default(), &FieldErrors::new(), None)
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<RuleNameForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, None, &form, &errors, None),
    };

    match state.store().rule_name_repo().create(input).await {
        Ok(created) => {
            tracing::info!(id = created.id, name = %created.name, "Rule created");
            Ok(Redirect::to(LIST).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create rule");
            let message = save_failed_message(ENTITY);
            render_form(&user, None, &form, &FieldErrors::new(), Some(&message))
        }
    }
}

async fn update_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    match state.store().rule_name_repo().get(id).await? {
        Some(model) => render_form(
            &user,
            Some(id),
            &RuleNameForm::from(model),
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
    Form(form): Form<RuleNameForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, Some(id), &form, &errors, None),
    };

    let message = match state.store().rule_name_repo().update(id, input).await {
        Ok(Some(_)) => {
            tracing::info!(id, "Rule updated");
            return Ok(Redirect::to(LIST).into_response());
        }
        Ok(None) => not_found_message(ENTITY, id),
        Err(e) => {
            tracing::error!(id, error = %e, "Failed to update rule");
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
    if state.store().rule_name_repo().delete(id).await? {
        tracing::info!(id, "Rule deleted");
    } else {
        set_flash(&session, not_found_message(ENTITY, id)).await?;
    }
    Ok(Redirect::to(LIST))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_fields_use_camel_case_names() {
        let form = RuleNameForm {
            name: "Rule".into(),
            description: "Desc".into(),
            json: "{}".into(),
            template: "T".into(),
            ..RuleNameForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("sqlStr"), Some("SQL is mandatory"));
        assert_eq!(errors.get("sqlPart"), Some("SQL part is mandatory"));
        assert_eq!(errors.iter().count(), 2);
    }
}
