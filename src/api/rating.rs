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
use super::validation::{FieldErrors, required_i32, required_text};
use super::views::{self, Field, FormPage, Row};
use super::{ApiError, AppState, not_found_message, save_failed_message};
use crate::db::RatingInput;
use crate::domain::CurrentUser;
use crate::entities::rating;

const ENTITY: &str = "rating";
const LIST: &str = "/rating/list";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rating/list", get(list))
        .route("/rating/add", get(add_form))
        .route("/rating/validate", post(validate))
        .route("/rating/update/{id}", get(update_form).post(update))
        .route("/rating/delete/{id}", get(delete))
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RatingForm {
    pub moodys_rating: String,
    pub sand_p_rating: String,
    pub fitch_rating: String,
    pub order_number: String,
}

impl RatingForm {
    pub fn validate(&self) -> Result<RatingInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = RatingInput {
            moodys_rating: required_text(
                &mut errors,
                "moodysRating",
                "Moodys rating",
                &self.moodys_rating,
            ),
            sand_p_rating: required_text(
                &mut errors,
                "sandPRating",
                "SandP rating",
                &self.sand_p_rating,
            ),
            fitch_rating: required_text(
                &mut errors,
                "fitchRating",
                "Fitch rating",
                &self.fitch_rating,
            ),
            order_number: required_i32(
                &mut errors,
                "orderNumber",
                "Order number",
                &self.order_number,
            ),
        };
        errors.finish(input)
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::text("moodysRating", "Moodys Rating", &self.moodys_rating),
            Field::text("sandPRating", "Sand P Rating", &self.sand_p_rating),
            Field::text("fitchRating", "Fitch Rating", &self.fitch_rating),
            Field::number("orderNumber", "Order Number", &self.order_number),
        ]
    }
}

impl From<rating::Model> for RatingForm {
    fn from(model: rating::Model) -> Self {
        Self {
            moodys_rating: model.moodys_rating,
            sand_p_rating: model.sand_p_rating,
            fitch_rating: model.fitch_rating,
            order_number: model.order_number.to_string(),
        }
    }
}

fn render_form(
    user: &CurrentUser,
    id: Option<i32>,
    form: &RatingForm,
    errors: &FieldErrors,
    message: Option<&str>,
) -> Result<Response, ApiError> {
    let title = if id.is_some() { "Update Rating" } else { "Add Rating" };
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
        .rating_repo()
        .list()
        .await?
        .into_iter()
        .map(|rating| Row {
            id: rating.id,
            cells: vec![
                rating.id.to_string(),
                rating.moodys_rating,
                rating.sand_p_rating,
                rating.fitch_rating,
                rating.order_number.to_string(),
            ],
        })
        .collect();

    views::list_page(
        &user,
        "Ratings",
        ENTITY,
        &["Id", "Moodys Rating", "Sand P Rating", "Fitch Rating", "Order"],
        rows,
        flash.as_deref(),
    )
}

async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, ApiError> {
    render_form(&user, None, &RatingForm::default(), &FieldErrors::new(), None)
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<RatingForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, None, &form, &errors, None),
    };

    match state.store().rating_repo().create(input).await {
        Ok(created) => {
            tracing::info!(id = created.id, "Rating created");
            Ok(Redirect::to(LIST).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create rating");
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
    match state.store().rating_repo().get(id).await? {
        Some(model) => render_form(
            &user,
            Some(id),
            &RatingForm::from(model),
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
    Form(form): Form<RatingForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, Some(id), &form, &errors, None),
    };

    let message = match state.store().rating_repo().update(id, input).await {
        Ok(Some(_)) => {
            tracing::info!(id, "Rating updated");
            return Ok(Redirect::to(LIST).into_response());
        }
        Ok(None) => not_found_message(ENTITY, id),
        Err(e) => {
            tracing::error!(id, error = %e, "Failed to update rating");
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
    if state.store().rating_repo().delete(id).await? {
        tracing::info!(id, "Rating deleted");
    } else {
        set_flash(&session, not_found_message(ENTITY, id)).await?;
    }
    Ok(Redirect::to(LIST))
}
