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
use super::validation::{
    FieldErrors, number_value, optional_f64, optional_text, required_f64, required_text,
};
use super::views::{self, Field, FormPage, Row};
use super::{ApiError, AppState, not_found_message, save_failed_message};
use crate::db::BidListInput;
use crate::domain::CurrentUser;
use crate::entities::bid_list;

const ENTITY: &str = "bidList";
const LIST: &str = "/bidList/list";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bidList/list", get(list))
        .route("/bidList/add", get(add_form))
        .route("/bidList/validate", post(validate))
        .route("/bidList/update/{id}", get(update_form).post(update))
        .route("/bidList/delete/{id}", get(delete))
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BidListForm {
    pub account: String,
    #[serde(rename = "type")]
    pub bid_type: String,
    pub bid_quantity: String,
    pub ask_quantity: String,
    pub bid: String,
    pub ask: String,
    pub benchmark: String,
    pub commentary: String,
    pub trader: String,
    pub book: String,
    pub side: String,
}

impl BidListForm {
    pub fn validate(&self) -> Result<BidListInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = BidListInput {
            account: required_text(&mut errors, "account", "Account", &self.account),
            bid_type: required_text(&mut errors, "type", "Type", &self.bid_type),
            bid_quantity: required_f64(
                &mut errors,
                "bidQuantity",
                "Bid quantity",
                &self.bid_quantity,
            ),
            ask_quantity: optional_f64(
                &mut errors,
                "askQuantity",
                "Ask quantity",
                &self.ask_quantity,
            ),
            bid: optional_f64(&mut errors, "bid", "Bid", &self.bid),
            ask: optional_f64(&mut errors, "ask", "Ask", &self.ask),
            benchmark: optional_text(&self.benchmark),
            commentary: optional_text(&self.commentary),
            trader: optional_text(&self.trader),
            book: optional_text(&self.book),
            side: optional_text(&self.side),
        };
        errors.finish(input)
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::text("account", "Account", &self.account),
            Field::text("type", "Type", &self.bid_type),
            Field::number("bidQuantity", "Bid Quantity", &self.bid_quantity),
            Field::number("askQuantity", "Ask Quantity", &self.ask_quantity),
            Field::number("bid", "Bid", &self.bid),
            Field::number("ask", "Ask", &self.ask),
            Field::text("benchmark", "Benchmark", &self.benchmark),
            Field::text("commentary", "Commentary", &self.commentary),
            Field::text("trader", "Trader", &self.trader),
            Field::text("book", "Book", &self.book),
            Field::text("side", "Side", &self.side),
        ]
    }
}

impl From<bid_list::Model> for BidListForm {
    fn from(model: bid_list::Model) -> Self {
        Self {
            account: model.account,
            bid_type: model.bid_type,
            bid_quantity: model.bid_quantity.to_string(),
            ask_quantity: number_value(model.ask_quantity),
            bid: number_value(model.bid),
            ask: number_value(model.ask),
            benchmark: model.benchmark.unwrap_or_default(),
            commentary: model.commentary.unwrap_or_default(),
            trader: model.trader.unwrap_or_default(),
            book: model.book.unwrap_or_default(),
            side: model.side.unwrap_or_default(),
        }
    }
}

fn render_form(
    user: &CurrentUser,
    id: Option<i32>,
    form: &BidListForm,
    errors: &FieldErrors,
    message: Option<&str>,
) -> Result<Response, ApiError> {
    let title = if id.is_some() { "Update Bid" } else { "Add Bid" };
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
        .bid_list_repo()
        .list()
        .await?
        .into_iter()
        .map(|bid| Row {
            id: bid.id,
            cells: vec![
                bid.id.to_string(),
                bid.account,
                bid.bid_type,
                bid.bid_quantity.to_string(),
            ],
        })
        .collect();

    views::list_page(
        &user,
        "Bid List",
        ENTITY,
        &["Id", "Account", "Type", "Bid Quantity"],
        rows,
        flash.as_deref(),
    )
}

async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, ApiError> {
    render_form(&user, None, &BidListForm::default(), &FieldErrors::new(), None)
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<BidListForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, None, &form, &errors, None),
    };

    match state.store().bid_list_repo().create(input).await {
        Ok(created) => {
            tracing::info!(id = created.id, "Bid list created");
            Ok(Redirect::to(LIST).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create bid list");
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
    match state.store().bid_list_repo().get(id).await? {
        Some(model) => render_form(
            &user,
            Some(id),
            &BidListForm::from(model),
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
    Form(form): Form<BidListForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, Some(id), &form, &errors, None),
    };

    let message = match state.store().bid_list_repo().update(id, input).await {
        Ok(Some(_)) => {
            tracing::info!(id, "Bid list updated");
            return Ok(Redirect::to(LIST).into_response());
        }
        Ok(None) => not_found_message(ENTITY, id),
        Err(e) => {
            tracing::error!(id, error = %e, "Failed to update bid list");
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
    if state.store().bid_list_repo().delete(id).await? {
        tracing::info!(id, "Bid list deleted");
    } else {
        set_flash(&session, not_found_message(ENTITY, id)).await?;
    }
    Ok(Redirect::to(LIST))
}
