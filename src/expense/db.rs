//! Database operations for expenses.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    expense::{CategoryName, Expense, ExpenseId, ExpenseUpdate, NewExpense},
};

/// The order to return expenses from the full listing query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    /// The order the records were created in, oldest first.
    Insertion,
    /// Most recently dated expenses first.
    DateDescending,
}

/// Insert a validated expense and return the stored record with its generated ID.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "INSERT INTO expense (date, amount, category, description)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, date, amount, category, description",
        )?
        .query_row(
            (
                new_expense.date,
                new_expense.amount,
                new_expense.category.as_ref(),
                new_expense.description,
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve a single expense by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `expense_id` does not refer to a stored expense,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare("SELECT id, date, amount, category, description FROM expense WHERE id = :id;")?
        .query_one(&[(":id", &expense_id)], map_expense_row)
        .map_err(|error| error.into())
}

/// Retrieve all expenses in the given order.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_all_expenses(
    sort_order: SortOrder,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let order_clause = match sort_order {
        SortOrder::Insertion => "ORDER BY id ASC",
        // Fall back to the ID so expenses recorded on the same day keep a
        // stable order, newest insertion first.
        SortOrder::DateDescending => "ORDER BY date DESC, id DESC",
    };

    let query =
        format!("SELECT id, date, amount, category, description FROM expense {order_clause}");

    connection
        .prepare(&query)?
        .query_map([], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the expenses whose category exactly matches `category`.
///
/// An empty result is not an error, the returned vector is simply empty.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_expenses_by_category(
    category: &CategoryName,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, date, amount, category, description FROM expense
             WHERE category = :category ORDER BY id ASC;",
        )?
        .query_map(&[(":category", &category.as_ref())], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Replace an expense's amount, category, and description.
///
/// The expense's ID and date are left untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpense] if `expense_id` does not refer to a stored expense,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_expense(
    expense_id: ExpenseId,
    update: ExpenseUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET amount = ?1, category = ?2, description = ?3 WHERE id = ?4",
        (
            update.amount,
            update.category.as_ref(),
            update.description,
            expense_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete an expense by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpense] if `expense_id` does not refer to a stored expense,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expense(expense_id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [expense_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('expense', 0)",
        (),
    )?;

    // Indexes for the monthly summary and category filter queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_category ON expense(category);",
        (),
    )?;

    Ok(())
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let amount = row.get(2)?;
    let raw_category: String = row.get(3)?;
    let category = CategoryName::new_unchecked(&raw_category);
    let description = row.get::<usize, Option<String>>(4)?.unwrap_or_default();

    Ok(Expense {
        id,
        date,
        amount,
        category,
        description,
    })
}
