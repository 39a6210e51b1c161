use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, macros::date};

use expenseur_rs::{CategoryName, NewExpense, create_expense, initialize_db};

/// A utility for creating a demo database for the expenseur_rs server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Adding demo expenses...");

    for (amount, date, category, description) in demo_expenses() {
        create_expense(
            NewExpense::new(amount, date, CategoryName::new_unchecked(category), description)?,
            &connection,
        )?;
    }

    println!("Success!");

    Ok(())
}

fn demo_expenses() -> Vec<(f64, Date, &'static str, &'static str)> {
    vec![
        (42.17, date!(2025 - 05 - 03), "groceries", "Weekly shop"),
        (3.50, date!(2025 - 05 - 05), "coffee", "Flat white"),
        (89.00, date!(2025 - 05 - 12), "utilities", "Power bill"),
        (18.20, date!(2025 - 05 - 17), "transport", "Bus card top up"),
        (55.80, date!(2025 - 06 - 02), "groceries", "Weekly shop"),
        (120.00, date!(2025 - 06 - 10), "utilities", "Internet and power"),
        (14.00, date!(2025 - 06 - 14), "entertainment", "Movie ticket"),
        (7.00, date!(2025 - 06 - 21), "coffee", "Two flat whites"),
        (61.35, date!(2025 - 07 - 01), "groceries", "Weekly shop"),
        (32.50, date!(2025 - 07 - 08), "transport", "Fuel"),
        (95.60, date!(2025 - 07 - 15), "utilities", "Power bill"),
        (26.90, date!(2025 - 07 - 26), "entertainment", "Takeaways and a movie"),
    ]
}
