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
use crate::db::TradeInput;
use crate::domain::CurrentUser;
use crate::entities::trade;

const ENTITY: &str = "trade";
const LIST: &str = "/trade/list";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trade/list", get(list))
        .route("/trade/add", get(add_form))
        .route("/trade/validate", post(validate))
        .route("/trade/update/{id}", get(update_form).post(update))
        .route("/trade/delete/{id}", get(delete))
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TradeForm {
    pub account: String,
    #[serde(rename = "type")]
    pub trade_type: String,
    pub buy_quantity: String,
    pub sell_quantity: String,
    pub buy_price: String,
    pub sell_price: String,
    pub benchmark: String,
    pub security: String,
    pub status: String,
    pub trader: String,
    pub book: String,
    pub side: String,
}

impl TradeForm {
    pub fn validate(&self) -> Result<TradeInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = TradeInput {
            account: required_text(&mut errors, "account", "Account", &self.account),
            trade_type: required_text(&mut errors, "type", "Type", &self.trade_type),
            buy_quantity: required_f64(
                &mut errors,
                "buyQuantity",
                "Buy quantity",
                &self.buy_quantity,
            ),
            sell_quantity: optional_f64(
                &mut errors,
                "sellQuantity",
                "Sell quantity",
                &self.sell_quantity,
            ),
            buy_price: optional_f64(&mut errors, "buyPrice", "Buy price", &self.buy_price),
            sell_price: optional_f64(&mut errors, "sellPrice", "Sell price", &self.sell_price),
            benchmark: optional_text(&self.benchmark),
            security: optional_text(&self.security),
            status: optional_text(&self.status),
            trader: optional_text(&self.trader),
            book: optional_text(&self.book),
            side: optional_text(&self.side),
        };
        errors.finish(input)
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::text("account", "Account", &self.account),
            Field::text("type", "Type", &self.trade_type),
            Field::number("buyQuantity", "Buy Quantity", &self.buy_quantity),
            Field::number("sellQuantity", "Sell Quantity", &self.sell_quantity),
            Field::number("buyPrice", "Buy Price", &self.buy_price),
            Field::number("sellPrice", "Sell Price", &self.sell_price),
            Field::text("benchmark", "Benchmark", &self.benchmark),
            Field::text("security", "Security", &self.security),
            Field::text("status", "Status", &self.status),
            Field::text("trader", "Trader", &self.trader),
            Field::text("book", "Book", &self.book),
            Field::text("side", "Side", &self.side),
        ]
    }
}

impl From<trade::Model> for TradeForm {
    fn from(model: trade::Model) -> Self {
        Self {
            account: model.account,
            trade_type: model.trade_type,
            buy_quantity: model.buy_quantity.to_string(),
            sell_quantity: number_value(model.sell_quantity),
            buy_price: number_value(model.buy_price),
            sell_price: number_value(model.sell_price),
            benchmark: model.benchmark.unwrap_or_default(),
            security: model.security.unwrap_or_default(),
            status: model.status.unwrap_or_default(),
            trader: model.trader.unwrap_or_default(),
            book: model.book.unwrap_or_default(),
            side: model.side.unwrap_or_default(),
        }
    }
}

fn render_form(
    user: &CurrentUser,
    id: Option<i32>,
    form: &TradeForm,
    errors: &FieldErrors,
    message: Option<&str>,
) -> Result<Response, ApiError> {
    let title = if id.is_some() { "Update Trade" } else { "Add Trade" };
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
        .trade_repo()
        .list()
        .await?
        .into_iter()
        .map(|trade| Row {
            id: trade.id,
            cells: vec![
                trade.id.to_string(),
                trade.account,
                trade.trade_type,
                trade.buy_quantity.to_string(),
            ],
        })
        .collect();

    views::list_page(
        &user,
        "Trades",
        ENTITY,
        &["Id", "Account", "Type", "Buy Quantity"],
        rows,
        flash.as_deref(),
    )
}

async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, ApiError> {
    render_form(&user, None, &TradeForm::default(), &FieldErrors::new(), None)
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<TradeForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, None, &form, &errors, None),
    };

    match state.store().trade_repo().create(input).await {
        Ok(created) => {
            tracing::info!(id = created.id, account = %created.account, "Trade created");
            Ok(Redirect::to(LIST).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create trade");
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
    match state.store().trade_repo().get(id).await? {
        Some(model) => render_form(
            &user,
            Some(id),
            &TradeForm::from(model),
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
    Form(form): Form<TradeForm>,
) -> Result<Response, ApiError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&user, Some(id), &form, &errors, None),
    };

    let message = match state.store().trade_repo().update(id, input).await {
        Ok(Some(_)) => {
            tracing::info!(id, "Trade updated");
            return Ok(Redirect::to(LIST).into_response());
        }
        Ok(None) => not_found_message(ENTITY, id),
        Err(e) => {
            tracing::error!(id, error = %e, "Failed to update trade");
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
    if state.store().trade_repo().delete(id).await? {
        tracing::info!(id, "Trade deleted");
    } else {
        set_flash(&session, not_found_message(ENTITY, id)).await?;
    }
    Ok(Redirect::to(LIST))
}
