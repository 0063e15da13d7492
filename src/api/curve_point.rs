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
use super::validation::{FieldErrors, optional_text, required_f64, required_i32};
use super::views::{self, Field, FormPage, Row};
use super::{ApiError, AppState, not_found_message, save_failed_message};
use crate::db::CurvePointInput;
use crate::domain::CurrentUser;
use crate::entities::curve_point;

const ENTITY: &str = "curvePoint";
const LIST: &str = "/curvePoint/list";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/curvePoint/list", get(list))
        .route("/curvePoint/add", get(add_form))
        .route("/curvePoint/validate", post(validate))
        .route("/curvePoint/update/{id}", get(update_form).post(update))
        .route("/curvePoint/delete/{id}", get(delete))
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurvePointForm {
    pub curve_id: String,
    pub as_of_date: String,
    pub term: String,
    pub value: String,
}

impl CurvePointForm {
    pub fn validate(&self) -> Result<CurvePointInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = CurvePointInput {
            curve_id: required_i32(&mut errors, "curveId", "Curve id", &self.curve_id),
            as_of_date: optional_text(&self.as_of_date),
            term: required_f64(&mut errors, "term", "Term", &self.term),
            value: required_f64(&mut errors, "value", "Value", &self.value),
        };
        errors.finish(input)
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::number("curveId", "Curve Id", &self.curve_id),
            Field::text("asOfDate", "As Of Date", &self.as_of_date),
            Field::number("term", "Term", &self.term),
            Field::number("value", "Value", &self.value),
        ]
    }
}

impl From<curve_point::Model> for CurvePointForm {
    fn from(model: curve_point::Model) -> Self {
        Self {
            curve_id: model.curve_id.to_string(),
            as_of_date: model.as_of_date.unwrap_or_default(),
            term: model.term.to_string(),
            value: model.value.to_string(),
        }
    }
}

fn render_form(
    user: &CurrentUser,
    id: Option<i32>,
    form: &CurvePointForm,
    errors: &FieldErrors,
    message: Option<&str>,
) -> Result<Response, ApiError> {
    let title = if id.is_some() { "Update Curve Point" } else { "Add Curve Point" };
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
        .curve_point_repo()
        .list()
        .await?
        .into_iter()
        .map(|point| Row {
            id: point.id,
            cells: vec![
                point.id.to_string(),
                point.curve_id.to_string(),
                point.term.to_string(),
                point.value.to_string(),
            ],
        })
        .collect();

    views::list_page(
        &user,
        "Curve Points",
        ENTITY,
        &["Id", "Curve Point Id", "Term", "Value"],
        rows,
        flash.as_deref(),
    )
}

async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, ApiError> {
    render_form(&user, None, &CurvePointForm::default(), &FieldErrors::new(), None)
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<CurvePointForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, None, &form, &errors, None),
    };

    match state.store().curve_point_repo().create(input).await {
        Ok(created) => {
            tracing::info!(id = created.id, curve_id = created.curve_id, "Curve point created");
            Ok(Redirect::to(LIST).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create curve point");
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
    match state.store().curve_point_repo().get(id).await? {
        Some(model) => render_form(
            &user,
            Some(id),
            &CurvePointForm::from(model),
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
    Form(form): Form<CurvePointForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, Some(id), &form, &errors, None),
    };

    let message = match state.store().curve_point_repo().update(id, input).await {
        Ok(Some(_)) => {
            tracing::info!(id, "Curve point updated");
            return Ok(Redirect::to(LIST).into_response());
        }
        Ok(None) => not_found_message(ENTITY, id),
        Err(e) => {
            tracing::error!(id, error = %e, "Failed to update curve point");
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
    if state.store().curve_point_repo().delete(id).await? {
        tracing::info!(id, "Curve point deleted");
    } else {
        set_flash(&session, not_found_message(ENTITY, id)).await?;
    }
    Ok(Redirect::to(LIST))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_numeric_term_and_value() {
        let form = CurvePointForm {
            curve_id: "1".into(),
            term: "ten".into(),
            value: "x".into(),
            ..CurvePointForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("term"), Some("Term must be a number"));
        assert_eq!(errors.get("value"), Some("Value must be a number"));
        assert_eq!(errors.get("curveId"), None);
    }

    #[test]
    fn test_valid_form() {
        let form = CurvePointForm {
            curve_id: " 4 ".into(),
            as_of_date: String::new(),
            term: "1.5".into(),
            value: "-2".into(),
        };
        let input = form.validate().unwrap();
        assert_eq!(input.curve_id, 4);
        assert_eq!(input.as_of_date, None);
        assert_eq!(input.term, 1.5);
        assert_eq!(input.value, -2.0);
    }
}
