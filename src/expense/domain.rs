//! Core expense domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::Error;

/// A validated, non-empty expense category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategory] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// A record of money spent on a single occasion.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The date the expense was recorded. Assigned by the store, never edited.
    pub date: Date,
    /// The amount of money spent in dollars.
    pub amount: f64,
    /// The category the expense belongs to, e.g. "Groceries", "Transport".
    pub category: CategoryName,
    /// A text description of what the money was spent on. May be empty.
    pub description: String,
}

fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount)
    }
}

/// A validated expense ready to be inserted into the database.
///
/// Use [NewExpense::new] so that the amount invariant is checked up front,
/// before the record gets anywhere near the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// The amount of money spent in dollars. Always finite and positive.
    pub amount: f64,
    /// The date to record the expense under, i.e. today in the server's timezone.
    pub date: Date,
    /// The category the expense belongs to.
    pub category: CategoryName,
    /// A text description of what the money was spent on.
    pub description: String,
}

impl NewExpense {
    /// Create a new expense to be inserted with [create_expense](crate::create_expense).
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidAmount] if `amount` is zero,
    /// negative, or not a finite number.
    pub fn new(
        amount: f64,
        date: Date,
        category: CategoryName,
        description: &str,
    ) -> Result<Self, Error> {
        let amount = validate_amount(amount)?;

        Ok(Self {
            amount,
            date,
            category,
            description: description.to_owned(),
        })
    }
}

/// The replacement field values for editing an expense.
///
/// The expense's ID and date are fixed at creation and cannot be replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseUpdate {
    /// The new amount in dollars. Always finite and positive.
    pub amount: f64,
    /// The new category.
    pub category: CategoryName,
    /// The new description.
    pub description: String,
}

impl ExpenseUpdate {
    /// Create the field values for updating an expense with
    /// [update_expense](super::update_expense).
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidAmount] if `amount` is zero,
    /// negative, or not a finite number.
    pub fn new(amount: f64, category: CategoryName, description: &str) -> Result<Self, Error> {
        let amount = validate_amount(amount)?;

        Ok(Self {
            amount,
            category,
            description: description.to_owned(),
        })
    }
}

/// Form data for expense creation and editing.
///
/// The date is not part of the form: new expenses are stamped with the current
/// date on the server, and edits never change the date.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseForm {
    /// The value of the expense in dollars.
    pub amount: f64,
    /// The category the expense belongs to.
    pub category: String,
    /// Text detailing the expense.
    pub description: String,
}

#[cfg(test)]
mod expense_form_tests {
    use super::ExpenseForm;

    #[test]
    fn parses_urlencoded_submission() {
        let form_data = "amount=12.5&category=food&description=lunch+at+cafe";
        let form: ExpenseForm = serde_html_form::from_str(form_data).unwrap();

        assert_eq!(form.amount, 12.5);
        assert_eq!(form.category, "food");
        assert_eq!(form.description, "lunch at cafe");
    }

    #[test]
    fn parses_empty_description() {
        let form_data = "amount=9.99&category=coffee&description=";
        let form: ExpenseForm = serde_html_form::from_str(form_data).unwrap();

        assert_eq!(form.description, "");
    }
}
