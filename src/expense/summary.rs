//! Monthly aggregation queries for expenses.

use std::fmt::Display;

use rusqlite::Connection;
use time::{Date, Month};

use crate::{Error, expense::CategoryName};

/// A calendar month, parsed from text like "2025-07".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    year: i32,
    month: Month,
}

impl MonthKey {
    /// Parse a month from "YYYY-MM" text.
    ///
    /// A single digit month such as "2025-7" is accepted and rendered back
    /// out zero-padded.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidMonthFormat] if `text` is
    /// not a four digit year and a month from 1 to 12 separated by a hyphen.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let Some((year_text, month_text)) = text.split_once('-') else {
            return Err(Error::InvalidMonthFormat);
        };

        let is_digits =
            |text: &str| !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit());

        if year_text.len() != 4 || !is_digits(year_text) {
            return Err(Error::InvalidMonthFormat);
        }

        if month_text.len() > 2 || !is_digits(month_text) {
            return Err(Error::InvalidMonthFormat);
        }

        let year = year_text.parse().map_err(|_| Error::InvalidMonthFormat)?;
        let month_number: u8 = month_text.parse().map_err(|_| Error::InvalidMonthFormat)?;
        let month = Month::try_from(month_number).map_err(|_| Error::InvalidMonthFormat)?;

        Ok(Self { year, month })
    }

    /// The month that `date` falls in.
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The first day of the month.
    pub fn first_day(self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1)
            .expect("the first day of a month is always a valid date")
    }

    /// The month immediately after this one.
    pub fn next(self) -> Self {
        let year = if self.month == Month::December {
            self.year + 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.next(),
        }
    }

    /// The month immediately before this one.
    pub fn previous(self) -> Self {
        let year = if self.month == Month::January {
            self.year - 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.previous(),
        }
    }

    /// A human readable label for the month, e.g. "July 2025".
    pub fn label(self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

/// The aggregate spend for a calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    /// Sum of the month's expense amounts in dollars.
    pub total: f64,
    /// The number of expenses recorded in the month.
    pub count: u32,
}

/// Total the expenses recorded in `month`.
///
/// A month with no expenses is not an error, the summary is simply zero.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_monthly_summary(
    month: MonthKey,
    connection: &Connection,
) -> Result<MonthlySummary, Error> {
    connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM expense
             WHERE date >= ?1 AND date < ?2",
        )?
        .query_one((month.first_day(), month.next().first_day()), |row| {
            Ok(MonthlySummary {
                total: row.get(0)?,
                count: row.get(1)?,
            })
        })
        .map_err(|error| error.into())
}

/// The aggregate spend for one category within a month.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    /// The category the expenses belong to.
    pub category: CategoryName,
    /// Sum of the category's expense amounts in dollars.
    pub total: f64,
    /// The number of expenses in the category.
    pub count: u32,
}

/// Total the expenses recorded in `month` grouped by category.
///
/// Categories are returned with the largest total first. Categories with
/// equal totals are ordered by name.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_category_breakdown(
    month: MonthKey,
    connection: &Connection,
) -> Result<Vec<CategorySummary>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount) AS total, COUNT(*) FROM expense
             WHERE date >= ?1 AND date < ?2
             GROUP BY category
             ORDER BY total DESC, category ASC",
        )?
        .query_map(
            (month.first_day(), month.next().first_day()),
            |row| {
                let raw_category: String = row.get(0)?;

                Ok(CategorySummary {
                    category: CategoryName::new_unchecked(&raw_category),
                    total: row.get(1)?,
                    count: row.get(2)?,
                })
            },
        )?
        .map(|maybe_summary| maybe_summary.map_err(|error| error.into()))
        .collect()
}
