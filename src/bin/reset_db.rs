use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use cost_reports::{initialize_db, reset_db};

/// A utility for clearing the cost reports database and adding the default user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    db_path: String,
}

/// Delete all users, costs, logs and cached reports, then add the default user.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if db_path.extension().is_none_or(|extension| extension.is_empty()) {
        eprintln!("Database path must include a file extension (e.g., 'costs.db').");
        exit(1);
    }

    println!("Resetting database at {db_path:#?}");
    let conn = Connection::open(db_path)?;

    initialize_db(&conn)?;
    let user = reset_db(&conn)?;

    println!(
        "Success! Added user {} {} {}.",
        user.id, user.first_name, user.last_name
    );

    Ok(())
}
