use std::io;

use clap::Parser;
use rusqlite::Connection;

use expenseur_rs::{initialize_db, run_menu};

/// New expenses added through the menu are stamped with the current date in
/// this timezone.
const LOCAL_TIMEZONE: &str = "Pacific/Auckland";

/// The interactive expense tracker menu for expenseur_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let connection = Connection::open(&args.db_path).expect("Could not open database file.");
    initialize_db(&connection).expect("Could not initialize the database.");

    let stdin = io::stdin();
    let stdout = io::stdout();

    run_menu(
        stdin.lock(),
        stdout.lock(),
        io::stderr(),
        &connection,
        LOCAL_TIMEZONE,
    )
}
