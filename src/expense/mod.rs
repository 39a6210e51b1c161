//! Expense records and the pages and queries built on top of them.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod summary;
mod summary_page;

pub use create::{create_expense_endpoint, get_new_expense_page};
pub use db::{
    SortOrder, create_expense, create_expense_table, delete_expense, get_all_expenses, get_expense,
    get_expenses_by_category, update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{CategoryName, Expense, ExpenseForm, ExpenseId, ExpenseUpdate, NewExpense};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use list::get_expenses_page;
pub use summary::{
    CategorySummary, MonthKey, MonthlySummary, get_category_breakdown, get_monthly_summary,
};
pub use summary_page::get_summary_page;
