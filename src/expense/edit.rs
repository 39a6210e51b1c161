//! Expense editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{
        CategoryName, ExpenseForm, ExpenseId, ExpenseUpdate, get_expense, update_expense,
        form::{ExpenseFormDefaults, expense_form_fields},
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner},
    navigation::NavBar,
};

/// The state needed for the edit expense page.
#[derive(Debug, Clone)]
pub struct EditExpensePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating an expense.
#[derive(Debug, Clone)]
pub struct UpdateExpenseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the expense editing page.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpensePageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_EXPENSE, expense_id);

    match get_expense(expense_id, &connection) {
        Ok(expense) => {
            let defaults = ExpenseFormDefaults {
                amount: Some(expense.amount),
                category: Some(expense.category.as_ref()),
                description: Some(&expense.description),
                autofocus_amount: true,
            };

            Ok(edit_expense_view(&edit_endpoint, &update_endpoint, &defaults, "").into_response())
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Expense not found",
                _ => {
                    tracing::error!("Failed to retrieve expense {expense_id}: {error}");
                    "Failed to load expense"
                }
            };

            let defaults = ExpenseFormDefaults {
                amount: None,
                category: None,
                description: None,
                autofocus_amount: false,
            };

            Ok(
                edit_expense_view(&edit_endpoint, &update_endpoint, &defaults, error_message)
                    .into_response(),
            )
        }
    }
}

/// Handle expense update form submission.
///
/// The record date is fixed at creation, so only the amount, category, and
/// description can be replaced.
pub async fn update_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<UpdateExpenseEndpointState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_EXPENSE, expense_id);

    let category = match CategoryName::new(&form.category) {
        Ok(category) => category,
        Err(error) => return invalid_form_response(&update_endpoint, &form, &error),
    };

    let update = match ExpenseUpdate::new(form.amount, category, &form.description) {
        Ok(update) => update,
        Err(error) => return invalid_form_response(&update_endpoint, &form, &error),
    };

    match update_expense(expense_id, update, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingExpense) => Error::UpdateMissingExpense.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn invalid_form_response(update_endpoint: &str, form: &ExpenseForm, error: &Error) -> Response {
    let defaults = ExpenseFormDefaults {
        amount: Some(form.amount),
        category: Some(&form.category),
        description: Some(&form.description),
        autofocus_amount: false,
    };

    edit_expense_form_view(update_endpoint, &defaults, &format!("Error: {error}")).into_response()
}

fn edit_expense_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    defaults: &ExpenseFormDefaults<'_>,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form = edit_expense_form_view(update_endpoint, defaults, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Expense", &[dollar_input_styles()], &content)
}

fn edit_expense_form_view(
    update_expense_endpoint: &str,
    defaults: &ExpenseFormDefaults<'_>,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_expense_endpoint)
            class="w-full space-y-4 md:space-y-6"
        {
            (expense_form_fields(defaults))

            @if !error_message.is_empty() {
                p
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Update Expense"
            }
        }
    }
}
