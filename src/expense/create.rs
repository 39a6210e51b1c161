//! Expense creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error, endpoints,
    expense::{
        CategoryName, ExpenseForm, NewExpense, create_expense,
        form::{ExpenseFormDefaults, expense_form_fields},
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner},
    navigation::NavBar,
    timezone::get_local_offset,
};

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseEndpointState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the expense creation page.
pub async fn get_new_expense_page() -> Response {
    new_expense_view().into_response()
}

/// Handle expense creation form submission.
///
/// New expenses are stamped with the current date in the server's timezone,
/// so the record date is not part of the form.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseEndpointState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let category = match CategoryName::new(&form.category) {
        Ok(category) => category,
        Err(error) => return invalid_form_response(&form, &error),
    };

    let new_expense = match NewExpense::new(form.amount, today, category, &form.description) {
        Ok(new_expense) => new_expense,
        Err(error) => return invalid_form_response(&form, &error),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_expense(new_expense, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");

            error.into_alert_response()
        }
    }
}

fn invalid_form_response(form: &ExpenseForm, error: &Error) -> Response {
    let defaults = ExpenseFormDefaults {
        amount: Some(form.amount),
        category: Some(&form.category),
        description: Some(&form.description),
        autofocus_amount: false,
    };

    new_expense_form_view(&defaults, &format!("Error: {error}")).into_response()
}

fn new_expense_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let defaults = ExpenseFormDefaults {
        amount: None,
        category: None,
        description: None,
        autofocus_amount: true,
    };
    let form = new_expense_form_view(&defaults, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Record Expense", &[dollar_input_styles()], &content)
}

fn new_expense_form_view(defaults: &ExpenseFormDefaults<'_>, error_message: &str) -> Markup {
    let create_expense_endpoint = endpoints::POST_EXPENSE;

    html! {
        form
            hx-post=(create_expense_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (expense_form_fields(defaults))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
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
                "Record Expense"
            }
        }
    }
}

#[cfg(test)]
mod new_expense_page_tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints,
        expense::get_new_expense_page,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_expense_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .expect("content-type header missing"),
            "text/html; charset=utf-8"
        );

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_EXPENSE, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "category", "text");
        assert_form_input(&form, "description", "text");
        assert_form_submit_button(&form);
    }
}
