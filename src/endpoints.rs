//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/:expense_id', use [format_endpoint].

/// The root route which redirects to the expenses page.
pub const ROOT: &str = "/";
/// The page for displaying recorded expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for recording a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The page for displaying the monthly spending summary.
pub const SUMMARY_VIEW: &str = "/summary";
/// The page for displaying spending charts.
pub const CHARTS_VIEW: &str = "/charts";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route the new expense form posts to.
pub const POST_EXPENSE: &str = "/expenses";
/// The route the edit expense form submits to.
pub const PUT_EXPENSE: &str = "/expenses/{expense_id}";
/// The route for the delete buttons on the expenses page.
pub const DELETE_EXPENSE: &str = "/expenses/{expense_id}";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to list and create expenses as JSON.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to update or delete a single expense as JSON.
pub const EXPENSE_API: &str = "/api/expenses/{expense_id}";
/// The route for the total and count of expenses in a month.
pub const SUMMARY_API: &str = "/api/summary/{month}";
/// The route for the per-category breakdown of a month's expenses.
pub const SUMMARY_BY_CATEGORY_API: &str = "/api/summary/{month}/by-category";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
