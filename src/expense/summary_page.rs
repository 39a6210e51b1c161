//! Monthly summary page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    expense::{
        CategorySummary, MonthKey, MonthlySummary, get_category_breakdown, get_monthly_summary,
    },
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    timezone::current_local_date,
};

/// The state needed for the monthly summary page.
#[derive(Debug, Clone)]
pub struct SummaryPageState {
    /// The database connection for querying expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SummaryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for the monthly summary page.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// The month to summarize as "YYYY-MM". Defaults to the current month.
    pub month: Option<String>,
}

/// Render the spending summary for a single month.
///
/// An unparseable month query redirects back to the current month rather
/// than erroring.
pub async fn get_summary_page(
    State(state): State<SummaryPageState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, Error> {
    let month = match query.month {
        Some(raw_month) => match MonthKey::parse(&raw_month) {
            Ok(month) => month,
            Err(_) => {
                return Ok(Redirect::to(endpoints::SUMMARY_VIEW).into_response());
            }
        },
        None => MonthKey::containing(current_local_date(&state.local_timezone)?),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let summary = get_monthly_summary(month, &connection)
        .inspect_err(|error| tracing::error!("could not get monthly summary: {error}"))?;
    let breakdown = get_category_breakdown(month, &connection)
        .inspect_err(|error| tracing::error!("could not get category breakdown: {error}"))?;

    Ok(summary_view(month, &summary, &breakdown).into_response())
}

fn month_url(month: MonthKey) -> String {
    format!("{}?month={month}", endpoints::SUMMARY_VIEW)
}

fn summary_view(month: MonthKey, summary: &MonthlySummary, breakdown: &[CategorySummary]) -> Markup {
    let nav_bar = NavBar::new(endpoints::SUMMARY_VIEW).into_html();

    let month_nav = html!(
        nav class="flex items-center justify-between gap-4" aria-label="Month"
        {
            a href=(month_url(month.previous())) class=(LINK_STYLE)
            {
                "Previous"
            }

            h2 class="text-lg font-semibold" aria-current="page" { (month.label()) }

            a href=(month_url(month.next())) class=(LINK_STYLE)
            {
                "Next"
            }
        }
    );

    let totals_card = html!(
        div class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm
            dark:border-gray-700 dark:bg-gray-800"
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { "Total spent" }

            p class="text-2xl font-bold tabular-nums" data-summary-total="true"
            {
                (format_currency(summary.total))
            }

            p class="text-sm text-gray-500 dark:text-gray-400" data-summary-count="true"
            {
                (summary.count) " expense(s)"
            }
        }
    );

    let table_row = |category_summary: &CategorySummary| {
        html!(
            tr class=(TABLE_ROW_STYLE) data-breakdown-row="true"
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (category_summary.category) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_currency(category_summary.total))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (category_summary.count)
                }
            }
        )
    };

    let breakdown_table = html!(
        section class="dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
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
                            "Category"
                        }
                        th scope="col" class=(TABLE_CELL_STYLE)
                        {
                            "Total"
                        }
                        th scope="col" class=(TABLE_CELL_STYLE)
                        {
                            "Count"
                        }
                    }
                }

                tbody
                {
                    @for category_summary in breakdown {
                        (table_row(category_summary))
                    }

                    @if breakdown.is_empty() {
                        tr
                        {
                            td
                                colspan="3"
                                data-empty-state="true"
                                class="px-6 py-4 text-center
                                    text-gray-500 dark:text-gray-400"
                            {
                                "No expenses recorded for " (month.label()) "."
                            }
                        }
                    }
                }
            }
        }
    );

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Summary" }
                }

                (month_nav)
                (totals_card)
                (breakdown_table)
            }
        }
    );

    base("Summary", &[], &content)
}

#[cfg(test)]
mod summary_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Date, OffsetDateTime, macros::date};

    use crate::{
        endpoints,
        expense::{CategoryName, MonthKey, NewExpense, create_expense, create_expense_table},
    };

    use super::{SummaryPageState, SummaryQuery, get_summary_page};

    fn get_test_state() -> SummaryPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_expense_table(&connection).expect("Could not create expense table");

        SummaryPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn insert_expense(amount: f64, date: Date, category: &str, state: &SummaryPageState) {
        let expense = NewExpense::new(amount, date, CategoryName::new_unchecked(category), "")
            .expect("Could not build test expense");

        create_expense(expense, &state.db_connection.lock().unwrap())
            .expect("Could not create test expense");
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    #[tokio::test]
    async fn summary_page_displays_total_count_and_breakdown() {
        let state = get_test_state();
        insert_expense(10.00, date!(2024 - 01 - 05), "food", &state);
        insert_expense(5.50, date!(2024 - 01 - 20), "food", &state);
        insert_expense(7.00, date!(2024 - 01 - 21), "transport", &state);
        insert_expense(100.00, date!(2024 - 02 - 01), "rent", &state);

        let response = get_summary_page(
            State(state),
            Query(SummaryQuery {
                month: Some("2024-01".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);

        assert_eq!(select_text(&html, "[data-summary-total='true']"), "$22.50");
        assert_eq!(
            select_text(&html, "[data-summary-count='true']"),
            "3 expense(s)"
        );

        let row_selector = Selector::parse("tbody tr[data-breakdown-row='true']").unwrap();
        let categories = html
            .select(&row_selector)
            .map(|row| {
                let cell_selector = Selector::parse("td").unwrap();
                let cell = row.select(&cell_selector).next().expect("Missing category");
                cell.text().collect::<String>().trim().to_owned()
            })
            .collect::<Vec<_>>();
        assert_eq!(
            categories,
            vec!["food", "transport"],
            "want categories ordered by total descending"
        );
    }

    #[tokio::test]
    async fn summary_page_links_to_adjacent_months() {
        let state = get_test_state();

        let response = get_summary_page(
            State(state),
            Query(SummaryQuery {
                month: Some("2024-01".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        let hrefs = html
            .select(&Selector::parse("nav[aria-label='Month'] a").unwrap())
            .filter_map(|link| link.value().attr("href").map(str::to_owned))
            .collect::<Vec<_>>();
        assert_eq!(
            hrefs,
            vec!["/summary?month=2023-12", "/summary?month=2024-02"]
        );
    }

    #[tokio::test]
    async fn summary_page_defaults_to_current_month() {
        let state = get_test_state();

        let response = get_summary_page(State(state), Query(SummaryQuery { month: None }))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);

        let current_month = MonthKey::containing(OffsetDateTime::now_utc().date());
        let heading = select_text(&html, "nav[aria-label='Month'] h2");
        assert_eq!(heading, current_month.label());
    }

    #[tokio::test]
    async fn summary_page_redirects_on_invalid_month() {
        let state = get_test_state();

        let response = get_summary_page(
            State(state),
            Query(SummaryQuery {
                month: Some("bad-month".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get("location")
            .expect("Missing redirect location header");
        assert_eq!(location, endpoints::SUMMARY_VIEW);
    }

    #[tokio::test]
    async fn summary_page_shows_empty_state() {
        let state = get_test_state();

        let response = get_summary_page(
            State(state),
            Query(SummaryQuery {
                month: Some("2024-01".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        assert_eq!(select_text(&html, "[data-summary-total='true']"), "$0.00");
        let empty_selector = Selector::parse("td[data-empty-state='true']").unwrap();
        assert!(
            html.select(&empty_selector).next().is_some(),
            "want an empty-state row for a month with no expenses"
        );
    }

    #[track_caller]
    fn select_text(html: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("No element matching {selector:?}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }
}
