//! Charts page HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    charts::{
        aggregation::monthly_totals,
        plots::{ExpenseChart, category_breakdown_chart, charts_script, monthly_totals_chart},
    },
    endpoints,
    expense::{MonthKey, SortOrder, get_all_expenses, get_category_breakdown},
    html::{HeadElement, LINK_STYLE, base, link},
    navigation::NavBar,
    timezone::current_local_date,
};

/// The state needed for displaying the charts page.
#[derive(Debug, Clone)]
pub struct ChartsPageState {
    /// The database connection for querying expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ChartsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for the charts page.
#[derive(Debug, Deserialize)]
pub struct ChartsQuery {
    /// The month to chart as "YYYY-MM". Defaults to the current month.
    pub month: Option<String>,
}

/// Display charts of spending for one month and across all months.
///
/// An unparseable month query redirects back to the current month rather
/// than erroring.
pub async fn get_charts_page(
    State(state): State<ChartsPageState>,
    Query(query): Query<ChartsQuery>,
) -> Result<Response, Error> {
    let month = match query.month {
        Some(raw_month) => match MonthKey::parse(&raw_month) {
            Ok(month) => month,
            Err(_) => {
                return Ok(Redirect::to(endpoints::CHARTS_VIEW).into_response());
            }
        },
        None => MonthKey::containing(current_local_date(&state.local_timezone)?),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::CHARTS_VIEW);

    let expenses = get_all_expenses(SortOrder::Insertion, &connection)
        .inspect_err(|error| tracing::error!("could not get expenses: {error}"))?;

    if expenses.is_empty() {
        return Ok(charts_no_data_view(nav_bar).into_response());
    }

    let breakdown = get_category_breakdown(month, &connection)
        .inspect_err(|error| tracing::error!("could not get category breakdown: {error}"))?;

    let charts = [
        ExpenseChart {
            id: "category-breakdown-chart",
            options: category_breakdown_chart(month, &breakdown).to_string(),
        },
        ExpenseChart {
            id: "monthly-totals-chart",
            options: monthly_totals_chart(&monthly_totals(&expenses)).to_string(),
        },
    ];

    Ok(charts_view(nav_bar, month, &charts).into_response())
}

fn month_url(month: MonthKey) -> String {
    format!("{}?month={month}", endpoints::CHARTS_VIEW)
}

/// Renders the charts page when no expenses exist.
fn charts_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_expense_link = link(endpoints::NEW_EXPENSE_VIEW, "adding an expense");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you start " (new_expense_link) "."
            }
        }
    );

    base("Charts", &[], &content)
}

fn charts_view(nav_bar: NavBar, month: MonthKey, charts: &[ExpenseChart]) -> Markup {
    let nav_bar = nav_bar.into_html();

    let month_nav = html!(
        nav class="flex items-center justify-between gap-4 mb-4" aria-label="Month"
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

    let content = html!(
        (nav_bar)

        div class="flex flex-col px-2 lg:px-6 py-4 lg:py-8 mx-auto
            max-w-screen-xl text-gray-900 dark:text-white"
        {
            (month_nav)

            section
                id="charts"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in charts {
                        div
                            id=(chart.id)
                            class="min-h-[380px] rounded dark:bg-gray-100"
                        {}
                    }
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Charts", &scripts, &content)
}

#[cfg(test)]
mod charts_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Date, macros::date};

    use crate::{
        endpoints,
        expense::{CategoryName, NewExpense, create_expense, create_expense_table},
    };

    use super::{ChartsPageState, ChartsQuery, get_charts_page};

    fn get_test_state() -> ChartsPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_expense_table(&connection).expect("Could not create expense table");

        ChartsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn insert_expense(amount: f64, date: Date, category: &str, state: &ChartsPageState) {
        let expense = NewExpense::new(amount, date, CategoryName::new_unchecked(category), "")
            .expect("Could not build test expense");

        create_expense(expense, &state.db_connection.lock().unwrap())
            .expect("Could not create test expense");
    }

    #[tokio::test]
    async fn charts_page_renders_chart_containers() {
        let state = get_test_state();
        insert_expense(10.00, date!(2024 - 01 - 05), "food", &state);
        insert_expense(7.00, date!(2024 - 02 - 21), "transport", &state);

        let response = get_charts_page(
            State(state),
            Query(ChartsQuery {
                month: Some("2024-01".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);

        assert_chart_exists(&html, "category-breakdown-chart");
        assert_chart_exists(&html, "monthly-totals-chart");
    }

    #[tokio::test]
    async fn charts_page_displays_prompt_text_on_no_data() {
        let state = get_test_state();

        let response = get_charts_page(State(state), Query(ChartsQuery { month: None }))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);

        assert_eq!(select_text(&html, "h2"), "Nothing here yet...");
    }

    #[tokio::test]
    async fn charts_page_links_to_adjacent_months() {
        let state = get_test_state();
        insert_expense(10.00, date!(2024 - 01 - 05), "food", &state);

        let response = get_charts_page(
            State(state),
            Query(ChartsQuery {
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
        assert_eq!(hrefs, vec!["/charts?month=2023-12", "/charts?month=2024-02"]);
    }

    #[tokio::test]
    async fn charts_page_redirects_on_invalid_month() {
        let state = get_test_state();

        let response = get_charts_page(
            State(state),
            Query(ChartsQuery {
                month: Some("not-a-month".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get("location")
            .expect("Missing redirect location header");
        assert_eq!(location, endpoints::CHARTS_VIEW);
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
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
