//! Server-rendered HTML pages.
//!
//! Templates are embedded at compile time and rendered with Tera. Every
//! template ends in `.html`, so autoescaping covers all user-supplied text.

use axum::http::StatusCode;
use axum::response::Html;
use serde::Serialize;
use std::sync::LazyLock;
use tera::{Context, Tera};

use super::ApiError;
use super::validation::FieldErrors;
use crate::domain::CurrentUser;

const TPL_STYLE: &str = include_str!("templates/style.css");
const TPL_BASE: &str = include_str!("templates/base.html");
const TPL_LIST: &str = include_str!("templates/list.html");
const TPL_FORM: &str = include_str!("templates/form.html");
const TPL_LOGIN: &str = include_str!("templates/login.html");
const TPL_HOME: &str = include_str!("templates/home.html");
const TPL_ERROR: &str = include_str!("templates/error.html");

static TEMPLATES: LazyLock<Result<Tera, tera::Error>> = LazyLock::new(load_templates);

fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("style.css", TPL_STYLE),
        ("base.html", TPL_BASE),
        ("list.html", TPL_LIST),
        ("form.html", TPL_FORM),
        ("login.html", TPL_LOGIN),
        ("home.html", TPL_HOME),
        ("error.html", TPL_ERROR),
    ])?;
    Ok(tera)
}

/// Parsed template set. Called once at startup so a broken template fails
/// the boot instead of the first request.
pub fn templates() -> anyhow::Result<&'static Tera> {
    TEMPLATES
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load templates: {e:?}"))
}

fn render(name: &str, context: &Context) -> Result<Html<String>, ApiError> {
    let html = templates()?
        .render(name, context)
        .map_err(|e| ApiError::internal(format!("Template {name} failed: {e:?}")))?;
    Ok(Html(html))
}

#[derive(Serialize)]
struct NavUser<'a> {
    username: &'a str,
    is_admin: bool,
}

fn page_context(title: &str, user: Option<&CurrentUser>) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert(
        "user",
        &user.map(|user| NavUser {
            username: &user.username,
            is_admin: user.role.is_admin(),
        }),
    );
    context
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Number,
    Password,
    Select(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, Clone)]
pub struct Field<'a> {
    pub name: &'static str,
    pub label: &'static str,
    pub value: &'a str,
    pub kind: FieldKind,
}

impl<'a> Field<'a> {
    #[must_use]
    pub const fn text(name: &'static str, label: &'static str, value: &'a str) -> Self {
        Self {
            name,
            label,
            value,
            kind: FieldKind::Text,
        }
    }

    #[must_use]
    pub const fn number(name: &'static str, label: &'static str, value: &'a str) -> Self {
        Self {
            name,
            label,
            value,
            kind: FieldKind::Number,
        }
    }

    #[must_use]
    pub const fn password(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            value: "",
            kind: FieldKind::Password,
        }
    }

    #[must_use]
    pub const fn select(
        name: &'static str,
        label: &'static str,
        value: &'a str,
        options: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            name,
            label,
            value,
            kind: FieldKind::Select(options),
        }
    }

    fn view(&self, errors: &'a FieldErrors) -> FieldView<'a> {
        // Numbers stay free text so that unparsable input is echoed back.
        let (kind, choices) = match self.kind {
            FieldKind::Text | FieldKind::Number => ("text", Vec::new()),
            FieldKind::Password => ("password", Vec::new()),
            FieldKind::Select(options) => (
                "select",
                options
                    .iter()
                    .map(|&(value, label)| Choice { value, label })
                    .collect(),
            ),
        };
        FieldView {
            name: self.name,
            label: self.label,
            value: self.value,
            kind,
            choices,
            error: errors.get(self.name),
        }
    }
}

#[derive(Serialize)]
struct Choice {
    value: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct FieldView<'a> {
    name: &'static str,
    label: &'static str,
    value: &'a str,
    kind: &'static str,
    choices: Vec<Choice>,
    error: Option<&'a str>,
}

/// An add (`id` is `None`) or update form for one entity, with inline field
/// errors and an optional form-level message above the fields.
pub struct FormPage<'a> {
    pub title: &'a str,
    pub entity: &'a str,
    pub id: Option<i32>,
    pub fields: Vec<Field<'a>>,
    pub errors: &'a FieldErrors,
    pub message: Option<&'a str>,
}

pub fn form_page(user: &CurrentUser, page: &FormPage<'_>) -> Result<Html<String>, ApiError> {
    let fields: Vec<FieldView<'_>> = page.fields.iter().map(|f| f.view(page.errors)).collect();

    let mut context = page_context(page.title, Some(user));
    context.insert("entity", page.entity);
    context.insert("id", &page.id);
    context.insert("fields", &fields);
    context.insert("message", &page.message);
    render("form.html", &context)
}

#[derive(Debug, Serialize)]
pub struct Row {
    pub id: i32,
    pub cells: Vec<String>,
}

/// Table of records; each row ends with update/delete links for its id.
pub fn list_page(
    user: &CurrentUser,
    title: &str,
    entity: &str,
    headers: &[&str],
    rows: Vec<Row>,
    flash: Option<&str>,
) -> Result<Html<String>, ApiError> {
    let mut context = page_context(title, Some(user));
    context.insert("entity", entity);
    context.insert("headers", headers);
    context.insert("rows", &rows);
    context.insert("flash", &flash);
    render("list.html", &context)
}

pub fn login_page(
    username: &str,
    error: Option<&str>,
    logged_out: bool,
) -> Result<Html<String>, ApiError> {
    let mut context = page_context("Login", None);
    context.insert("username", username);
    context.insert("error", &error);
    context.insert("logged_out", &logged_out);
    render("login.html", &context)
}

pub fn home_page(user: Option<&CurrentUser>) -> Result<Html<String>, ApiError> {
    render("home.html", &page_context("Home", user))
}

/// Rendered by [`ApiError`] itself, so a template failure here degrades to
/// an escaped plain page instead of recursing.
#[must_use]
pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    let mut context = page_context(title, None);
    context.insert("message", message);

    match templates().and_then(|tera| Ok(tera.render("error.html", &context)?)) {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::error!("Error page failed to render: {e:#}");
            Html(format!(
                "<!DOCTYPE html><title>{title}</title><p>{}</p>",
                html_escape::encode_text(message)
            ))
        }
    }
}
