//! Expenses listing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{Expense, SortOrder, get_all_expenses},
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the expenses listing page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// An expense with its formatted edit URL for template rendering.
#[derive(Debug, Clone)]
struct ExpenseWithEditUrl {
    pub expense: Expense,
    pub edit_url: String,
}

/// Render the expenses page, most recent expenses first.
pub async fn get_expenses_page(State(state): State<ExpensesPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_all_expenses(SortOrder::DateDescending, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;

    let expenses_with_edit_urls = expenses
        .into_iter()
        .map(|expense| ExpenseWithEditUrl {
            edit_url: endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id),
            expense,
        })
        .collect::<Vec<_>>();

    Ok(expenses_view(&expenses_with_edit_urls).into_response())
}

fn delete_confirm_message(expense: &Expense) -> String {
    format!(
        "Are you sure you want to delete the {} expense of {} on {}?",
        expense.category,
        format_currency(expense.amount),
        expense.date
    )
}

fn expenses_view(expenses: &[ExpenseWithEditUrl]) -> Markup {
    let new_expense_route = endpoints::NEW_EXPENSE_VIEW;
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let table_row = |expense_with_url: &ExpenseWithEditUrl| {
        let expense = &expense_with_url.expense;
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id);
        let confirm_message = delete_confirm_message(expense);

        html!(
            tr class=(TABLE_ROW_STYLE) data-expense-row="true"
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (expense.date)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_currency(expense.amount))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE)
                    {
                        (expense.category)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (expense.description)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &expense_with_url.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(new_expense_route) class=(LINK_STYLE)
                    {
                        "Record Expense"
                    }
                }

                (expenses_cards_view(expenses, new_expense_route))

                section class="hidden lg:block dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Date"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Amount"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Category"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Description"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for expense_with_url in expenses {
                                (table_row(expense_with_url))
                            }

                            @if expenses.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        data-empty-state="true"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No expenses recorded yet. "
                                        a href=(new_expense_route) class=(LINK_STYLE)
                                        {
                                            "Record your first expense"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Expenses", &[], &content)
}

fn expenses_cards_view(expenses: &[ExpenseWithEditUrl], new_expense_route: &str) -> Markup {
    struct ExpenseCardView<'a> {
        date: String,
        amount_display: String,
        category: &'a str,
        description: &'a str,
        edit_url: &'a str,
        delete_url: String,
        confirm_message: String,
    }

    let cards = expenses
        .iter()
        .map(|expense_with_url| {
            let expense = &expense_with_url.expense;

            ExpenseCardView {
                date: expense.date.to_string(),
                amount_display: format_currency(expense.amount),
                category: expense.category.as_ref(),
                description: &expense.description,
                edit_url: &expense_with_url.edit_url,
                delete_url: endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id),
                confirm_message: delete_confirm_message(expense),
            }
        })
        .collect::<Vec<_>>();

    html!(
        ul class="lg:hidden space-y-4"
        {
            @for card in &cards {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-expense-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        span class=(CATEGORY_BADGE_STYLE) { (card.category) }
                        span class="text-sm tabular-nums text-gray-900 dark:text-white"
                        { (card.amount_display) }
                    }

                    p class="mt-1 text-xs text-gray-500 dark:text-gray-400" { (card.date) }

                    @if !card.description.is_empty() {
                        p class="mt-1 text-sm text-gray-700 dark:text-gray-200"
                        { (card.description) }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            card.edit_url,
                            &card.delete_url,
                            &card.confirm_message,
                            "closest [data-expense-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if cards.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No expenses recorded yet. "
                    a href=(new_expense_route) class=(LINK_STYLE)
                    {
                        "Record your first expense"
                    }
                }
            }
        }
    )
}
