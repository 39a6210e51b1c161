//! The interactive text-menu front end.
//!
//! Drives the same expense store as the web server through a numbered menu
//! read from standard input. Errors are printed in red to the error stream
//! and the menu keeps running.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use rusqlite::Connection;

use crate::{
    Error,
    expense::{
        CategoryName, Expense, ExpenseId, ExpenseUpdate, MonthKey, NewExpense, SortOrder,
        create_expense, delete_expense, get_all_expenses, get_expenses_by_category,
        get_monthly_summary, update_expense,
    },
    timezone::current_local_date,
};

/// Run the menu loop until the user exits or `input` runs out.
///
/// `output` receives the menu, prompts, and success messages while `errors`
/// receives rejected input and storage failures. New expenses are stamped
/// with the current date in `local_timezone`.
///
/// # Errors
///
/// This function will return an error when one of the streams cannot be read
/// from or written to. Invalid input and storage failures are reported on
/// `errors` instead, and the menu moves on.
pub fn run_menu<R, W, E>(
    input: R,
    output: W,
    errors: E,
    connection: &Connection,
    local_timezone: &str,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    MenuSession {
        input,
        output,
        errors,
        connection,
        local_timezone,
    }
    .run()
}

struct MenuSession<'a, R, W, E> {
    input: R,
    output: W,
    errors: E,
    connection: &'a Connection,
    local_timezone: &'a str,
}

impl<R: BufRead, W: Write, E: Write> MenuSession<'_, R, W, E> {
    fn run(mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;

            // End of input is treated as quitting the menu.
            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };

            match choice.as_str() {
                "1" => self.add_expense()?,
                "2" => self.view_expenses()?,
                "3" => self.filter_by_category()?,
                "4" => self.edit_expense()?,
                "5" => self.delete_expense()?,
                "6" => self.monthly_summary()?,
                "7" => {
                    writeln!(self.output, "Goodbye")?;
                    return Ok(());
                }
                _ => self.print_error("Invalid choice.")?,
            }
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Expense Tracker (SQLite)")?;
        writeln!(self.output, "1. Add Expense")?;
        writeln!(self.output, "2. View Expenses")?;
        writeln!(self.output, "3. Filter by Category")?;
        writeln!(self.output, "4. Edit Expense")?;
        writeln!(self.output, "5. Delete Expense")?;
        writeln!(self.output, "6. Monthly Summary")?;
        writeln!(self.output, "7. Exit")
    }

    fn add_expense(&mut self) -> io::Result<()> {
        let Some(amount_text) = self.prompt("Amount: ")? else {
            return Ok(());
        };
        let amount: f64 = match amount_text.parse() {
            Ok(amount) => amount,
            Err(_) => return self.print_error(Error::InvalidAmountFormat),
        };

        let Some(category_text) = self.prompt("Category: ")? else {
            return Ok(());
        };
        let category = match CategoryName::new(&category_text) {
            Ok(category) => category,
            Err(error) => return self.print_error(error),
        };

        let Some(description) = self.prompt("Description: ")? else {
            return Ok(());
        };

        let today = match current_local_date(self.local_timezone) {
            Ok(today) => today,
            Err(error) => return self.print_error(error),
        };

        let new_expense = match NewExpense::new(amount, today, category, &description) {
            Ok(new_expense) => new_expense,
            Err(error) => return self.print_error(error),
        };

        match create_expense(new_expense, self.connection) {
            Ok(_) => writeln!(self.output, "Expense added successfully!"),
            Err(error) => self.print_error(error),
        }
    }

    fn view_expenses(&mut self) -> io::Result<()> {
        let expenses = match get_all_expenses(SortOrder::Insertion, self.connection) {
            Ok(expenses) => expenses,
            Err(error) => return self.print_error(error),
        };

        if expenses.is_empty() {
            return writeln!(self.output, "No expenses found.");
        }

        self.print_expense_table(&expenses)
    }

    fn filter_by_category(&mut self) -> io::Result<()> {
        let Some(category_text) = self.prompt("Enter category: ")? else {
            return Ok(());
        };

        let category = CategoryName::new_unchecked(&category_text);
        let expenses = match get_expenses_by_category(&category, self.connection) {
            Ok(expenses) => expenses,
            Err(error) => return self.print_error(error),
        };

        if expenses.is_empty() {
            return writeln!(self.output, "No expenses found for this category.");
        }

        self.print_expense_table(&expenses)
    }

    fn edit_expense(&mut self) -> io::Result<()> {
        self.view_expenses()?;

        let Some(expense_id) = self.prompt_expense_id("Enter expense ID to edit: ")? else {
            return Ok(());
        };

        let Some(amount_text) = self.prompt("New Amount: ")? else {
            return Ok(());
        };
        let amount: f64 = match amount_text.parse() {
            Ok(amount) => amount,
            Err(_) => return self.print_error(Error::InvalidAmountFormat),
        };

        let Some(category_text) = self.prompt("New Category: ")? else {
            return Ok(());
        };
        let category = match CategoryName::new(&category_text) {
            Ok(category) => category,
            Err(error) => return self.print_error(error),
        };

        let Some(description) = self.prompt("New Description: ")? else {
            return Ok(());
        };

        let update = match ExpenseUpdate::new(amount, category, &description) {
            Ok(update) => update,
            Err(error) => return self.print_error(error),
        };

        match update_expense(expense_id, update, self.connection) {
            Ok(()) => writeln!(self.output, "Expense updated successfully!"),
            Err(Error::UpdateMissingExpense) => self.print_error("Expense not found."),
            Err(error) => self.print_error(error),
        }
    }

    fn delete_expense(&mut self) -> io::Result<()> {
        self.view_expenses()?;

        let Some(expense_id) = self.prompt_expense_id("Enter expense ID to delete: ")? else {
            return Ok(());
        };

        match delete_expense(expense_id, self.connection) {
            Ok(()) => writeln!(self.output, "Expense deleted successfully!"),
            Err(Error::DeleteMissingExpense) => self.print_error("Expense not found."),
            Err(error) => self.print_error(error),
        }
    }

    fn monthly_summary(&mut self) -> io::Result<()> {
        let Some(month_text) = self.prompt("Enter month (YYYY-MM): ")? else {
            return Ok(());
        };
        let month = match MonthKey::parse(&month_text) {
            Ok(month) => month,
            Err(error) => return self.print_error(error),
        };

        match get_monthly_summary(month, self.connection) {
            Ok(summary) if summary.count == 0 => {
                writeln!(self.output, "No expenses found for {month}.")
            }
            Ok(summary) => writeln!(
                self.output,
                "Total expenses for {month}: ${:.2}",
                summary.total
            ),
            Err(error) => self.print_error(error),
        }
    }

    /// Print `text` without a trailing newline and read one line of input.
    ///
    /// Returns `None` when the input stream has ended.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_owned()))
    }

    fn prompt_expense_id(&mut self, text: &str) -> io::Result<Option<ExpenseId>> {
        let Some(id_text) = self.prompt(text)? else {
            return Ok(None);
        };

        match id_text.parse() {
            Ok(expense_id) => Ok(Some(expense_id)),
            Err(_) => {
                self.print_error("Invalid ID format.")?;
                Ok(None)
            }
        }
    }

    fn print_expense_table(&mut self, expenses: &[Expense]) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "ID | Date | Amount | Category | Description")?;
        writeln!(self.output, "{}", "-".repeat(55))?;

        for expense in expenses {
            writeln!(
                self.output,
                "{} | {} | ${:.2} | {} | {}",
                expense.id, expense.date, expense.amount, expense.category, expense.description
            )?;
        }

        Ok(())
    }

    fn print_error(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.errors, "\x1b[31;1m{message}\x1b[0m")
    }
}
