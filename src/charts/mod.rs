//! Charts page.
//!
//! Renders interactive ECharts visualizations of spending: a breakdown of
//! the selected month's spending by category and the total spent in each
//! recorded month.

mod aggregation;
mod handlers;
mod plots;

pub use handlers::get_charts_page;
