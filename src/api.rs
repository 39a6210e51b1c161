//! JSON API endpoints for managing expenses programmatically.
//!
//! Successful requests answer with a `{"message": ...}` payload (plus any
//! requested data) and failures answer with `{"error": ...}` and a matching
//! HTTP status.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    expense::{
        CategoryName, Expense, ExpenseId, ExpenseUpdate, MonthKey, NewExpense, SortOrder,
        create_expense, delete_expense, get_all_expenses, get_category_breakdown,
        get_expenses_by_category, get_monthly_summary, update_expense,
    },
    timezone::get_local_offset,
};

/// The state needed by the JSON API endpoints.
#[derive(Debug, Clone)]
pub struct ApiState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// An expense as serialized by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseResponse {
    /// The expense's unique ID.
    pub id: ExpenseId,
    /// The day the expense was recorded, in `YYYY-MM-DD` format.
    pub date: String,
    /// The amount spent in dollars.
    pub amount: f64,
    /// The label the expense is grouped under.
    pub category: String,
    /// Free-form text describing the expense.
    pub description: String,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            date: expense.date.to_string(),
            amount: expense.amount,
            category: expense.category.to_string(),
            description: expense.description,
        }
    }
}

/// The fields a client supplies when creating or updating an expense.
///
/// The record date is never part of the payload. It is stamped by the server
/// at creation time and left untouched by updates.
#[derive(Debug, Deserialize)]
pub struct ExpensePayload {
    amount: RawAmount,
    category: String,
    description: String,
}

/// An amount that clients may send as either a JSON number or a numeric
/// string such as "12.50".
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn into_f64(self) -> Result<f64, Error> {
        match self {
            RawAmount::Number(amount) => Ok(amount),
            RawAmount::Text(text) => text.trim().parse().map_err(|_| Error::InvalidAmountFormat),
        }
    }
}

/// Query parameters for the expense listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    /// When set, only expenses whose category matches exactly are returned.
    pub category: Option<String>,
}

/// List all expenses as JSON, most recently dated first.
///
/// Passing `?category=` narrows the listing to a single category, in
/// insertion order.
pub async fn get_expenses(
    State(state): State<ApiState>,
    Query(query): Query<ExpenseListQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return storage_fault_response(&Error::DatabaseLockError);
        }
    };

    let result = match &query.category {
        Some(category) => {
            get_expenses_by_category(&CategoryName::new_unchecked(category), &connection)
        }
        None => get_all_expenses(SortOrder::DateDescending, &connection),
    };

    match result {
        Ok(expenses) => {
            let expenses: Vec<ExpenseResponse> =
                expenses.into_iter().map(ExpenseResponse::from).collect();

            (StatusCode::OK, Json(expenses)).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while listing expenses: {error}");

            storage_fault_response(&error)
        }
    }
}

/// Create an expense from a JSON payload.
///
/// The new record is stamped with the current date in the server's timezone.
pub async fn add_expense(
    State(state): State<ApiState>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };

    let amount = match payload.amount.into_f64() {
        Ok(amount) => amount,
        Err(error) => return bad_request_response(&error),
    };

    let category = match CategoryName::new(&payload.category) {
        Ok(category) => category,
        Err(error) => return bad_request_response(&error),
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return storage_fault_response(&Error::InvalidTimezoneError(state.local_timezone));
    };

    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let new_expense = match NewExpense::new(amount, today, category, &payload.description) {
        Ok(new_expense) => new_expense,
        Err(error) => return bad_request_response(&error),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return storage_fault_response(&Error::DatabaseLockError);
        }
    };

    match create_expense(new_expense, &connection) {
        Ok(expense) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Expense added", "id": expense.id })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");

            storage_fault_response(&error)
        }
    }
}

/// Replace an expense's amount, category, and description.
///
/// The record's ID and date are left untouched.
pub async fn edit_expense(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<ApiState>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };

    let amount = match payload.amount.into_f64() {
        Ok(amount) => amount,
        Err(error) => return bad_request_response(&error),
    };

    let category = match CategoryName::new(&payload.category) {
        Ok(category) => category,
        Err(error) => return bad_request_response(&error),
    };

    let update = match ExpenseUpdate::new(amount, category, &payload.description) {
        Ok(update) => update,
        Err(error) => return bad_request_response(&error),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return storage_fault_response(&Error::DatabaseLockError);
        }
    };

    match update_expense(expense_id, update, &connection) {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Expense updated" }))).into_response(),
        Err(Error::UpdateMissingExpense) => {
            error_response(StatusCode::NOT_FOUND, "Expense not found")
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating an expense: {error}");

            storage_fault_response(&error)
        }
    }
}

/// Delete an expense by ID.
pub async fn remove_expense(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<ApiState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return storage_fault_response(&Error::DatabaseLockError);
        }
    };

    match delete_expense(expense_id, &connection) {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Expense deleted" }))).into_response(),
        Err(Error::DeleteMissingExpense) => {
            error_response(StatusCode::NOT_FOUND, "Expense not found")
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting an expense: {error}");

            storage_fault_response(&error)
        }
    }
}

/// Total spend and record count for one calendar month.
///
/// A month with no expenses answers with zero totals rather than an error.
pub async fn get_summary(Path(month): Path<String>, State(state): State<ApiState>) -> Response {
    let month = match MonthKey::parse(&month) {
        Ok(month) => month,
        Err(error) => return bad_request_response(&error),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return storage_fault_response(&Error::DatabaseLockError);
        }
    };

    match get_monthly_summary(month, &connection) {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "month": month.to_string(),
                "total": summary.total,
                "count": summary.count,
            })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while summarizing a month: {error}");

            storage_fault_response(&error)
        }
    }
}

/// Per-category totals for one calendar month, largest total first.
pub async fn get_summary_by_category(
    Path(month): Path<String>,
    State(state): State<ApiState>,
) -> Response {
    let month = match MonthKey::parse(&month) {
        Ok(month) => month,
        Err(error) => return bad_request_response(&error),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return storage_fault_response(&Error::DatabaseLockError);
        }
    };

    match get_category_breakdown(month, &connection) {
        Ok(breakdown) => {
            let categories: Vec<_> = breakdown
                .iter()
                .map(|entry| {
                    json!({
                        "category": entry.category.as_ref(),
                        "total": entry.total,
                        "count": entry.count,
                    })
                })
                .collect();

            (
                StatusCode::OK,
                Json(json!({ "month": month.to_string(), "categories": categories })),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while summarizing a month by category: {error}"
            );

            storage_fault_response(&error)
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn bad_request_response(error: &Error) -> Response {
    error_response(StatusCode::BAD_REQUEST, &error.to_string())
}

fn storage_fault_response(error: &Error) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
}

fn json_rejection_response(rejection: JsonRejection) -> Response {
    // A body that parses as JSON but is missing fields gets a more specific
    // message than an absent or malformed body.
    let message = match rejection {
        JsonRejection::JsonDataError(_) => "Missing required fields",
        _ => "No data provided",
    };

    error_response(StatusCode::BAD_REQUEST, message)
}


#[cfg(test)]
mod add_expense_api_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::OffsetDateTime;

    use crate::{
        AppState, Error, endpoints, expense::get_expense, routing::build_router,
    };

    fn get_test_server() -> (TestServer, AppState) {
        let db_connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(db_connection, "Etc/UTC").expect("Could not create app state.");
        let server =
            TestServer::new(build_router(state.clone())).expect("Could not create test server.");

        (server, state)
    }

    #[tokio::test]
    async fn add_expense_stores_record_stamped_today() {
        let (server, state) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES_API)
            .content_type("application/json")
            .json(&json!({"amount": 12.5, "category": "food", "description": "lunch"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.assert_json(&json!({"message": "Expense added", "id": 1}));

        let connection = state.db_connection.lock().unwrap();
        let expense = get_expense(1, &connection).unwrap();
        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.category.as_ref(), "food");
        assert_eq!(expense.description, "lunch");
        assert_eq!(
            expense.date,
            OffsetDateTime::now_utc().date(),
            "a new expense should be stamped with today's date"
        );
    }

    #[tokio::test]
    async fn add_expense_accepts_amount_as_text() {
        let (server, state) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES_API)
            .content_type("application/json")
            .json(&json!({"amount": "12.50", "category": "food", "description": "lunch"}))
            .await;

        response.assert_status(StatusCode::CREATED);

        let connection = state.db_connection.lock().unwrap();
        let expense = get_expense(1, &connection).unwrap();
        assert_eq!(expense.amount, 12.5);
    }

    #[tokio::test]
    async fn add_expense_with_missing_fields_returns_bad_request() {
        let (server, state) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES_API)
            .content_type("application/json")
            .json(&json!({"amount": 5.0, "category": "food"}))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "Missing required fields"}));

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(1, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn add_expense_with_non_positive_amount_returns_bad_request() {
        for amount in [0.0, -12.3] {
            let (server, state) = get_test_server();

            let response = server
                .post(endpoints::EXPENSES_API)
                .content_type("application/json")
                .json(&json!({"amount": amount, "category": "food", "description": "lunch"}))
                .await;

            response.assert_status_bad_request();
            response.assert_json(&json!({"error": "Amount must be positive"}));

            let connection = state.db_connection.lock().unwrap();
            assert_eq!(get_expense(1, &connection), Err(Error::NotFound));
        }
    }

    #[tokio::test]
    async fn add_expense_with_unparseable_amount_returns_bad_request() {
        let (server, state) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES_API)
            .content_type("application/json")
            .json(&json!({"amount": "twelve", "category": "food", "description": "lunch"}))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "Invalid amount format"}));

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(1, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn add_expense_with_empty_category_returns_bad_request() {
        let (server, state) = get_test_server();

        let response = server
            .post(endpoints::EXPENSES_API)
            .content_type("application/json")
            .json(&json!({"amount": 5.0, "category": "", "description": "lunch"}))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "Category cannot be empty"}));

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(1, &connection), Err(Error::NotFound));
    }
}

#[cfg(test)]
mod edit_expense_api_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        AppState,
        endpoints::{self, format_endpoint},
        expense::{CategoryName, Expense, NewExpense, create_expense, get_expense},
        routing::build_router,
    };

    fn get_test_server() -> (TestServer, AppState) {
        let db_connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(db_connection, "Etc/UTC").expect("Could not create app state.");
        let server =
            TestServer::new(build_router(state.clone())).expect("Could not create test server.");

        (server, state)
    }

    fn insert_test_expense(state: &AppState) -> Expense {
        let connection = state.db_connection.lock().unwrap();
        create_expense(
            NewExpense::new(
                12.3,
                date!(2024 - 01 - 15),
                CategoryName::new_unchecked("food"),
                "lunch",
            )
            .unwrap(),
            &connection,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn edit_expense_replaces_fields_and_keeps_date() {
        let (server, state) = get_test_server();
        let expense = insert_test_expense(&state);

        let response = server
            .put(&format_endpoint(endpoints::EXPENSE_API, expense.id))
            .content_type("application/json")
            .json(&json!({"amount": 45.6, "category": "transport", "description": "bus fare"}))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"message": "Expense updated"}));

        let connection = state.db_connection.lock().unwrap();
        let updated = get_expense(expense.id, &connection).unwrap();
        assert_eq!(updated.amount, 45.6);
        assert_eq!(updated.category.as_ref(), "transport");
        assert_eq!(updated.description, "bus fare");
        assert_eq!(updated.date, expense.date, "the record date is immutable");
    }

    #[tokio::test]
    async fn edit_expense_with_unknown_id_returns_not_found() {
        let (server, _state) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::EXPENSE_API, 999))
            .content_type("application/json")
            .json(&json!({"amount": 45.6, "category": "transport", "description": "bus fare"}))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({"error": "Expense not found"}));
    }

    #[tokio::test]
    async fn edit_expense_with_empty_body_returns_bad_request() {
        let (server, state) = get_test_server();
        let expense = insert_test_expense(&state);

        let response = server
            .put(&format_endpoint(endpoints::EXPENSE_API, expense.id))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "No data provided"}));

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(expense.id, &connection), Ok(expense));
    }

    #[tokio::test]
    async fn edit_expense_with_non_positive_amount_returns_bad_request() {
        let (server, state) = get_test_server();
        let expense = insert_test_expense(&state);

        let response = server
            .put(&format_endpoint(endpoints::EXPENSE_API, expense.id))
            .content_type("application/json")
            .json(&json!({"amount": -1.0, "category": "transport", "description": "bus fare"}))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "Amount must be positive"}));

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_expense(expense.id, &connection),
            Ok(expense),
            "a rejected update should leave the record unchanged"
        );
    }
}
