use std::error::Error;
use std::io;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use time::{Duration, OffsetDateTime};
use tracing_subscriber::{EnvFilter, fmt};

use expense_ledger::{Dashboard, LedgerStore, SQLiteLedgerStore, Session, Transaction, TransactionType};

/// A utility for creating a ledger database populated with a demo user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// Email address of the demo user.
    #[arg(long, default_value = "test@example.com")]
    email: String,

    /// Display name of the demo user.
    #[arg(long, default_value = "Test User")]
    name: String,
}

/// Sample transactions as (days ago, amount, category, type, description).
const SAMPLE_TRANSACTIONS: [(i64, f64, &str, TransactionType, &str); 6] = [
    (30, 3200.0, "Salary", TransactionType::Income, "Monthly salary"),
    (25, 1200.0, "Bills", TransactionType::Expense, "Rent"),
    (12, 45.5, "Transport", TransactionType::Expense, "Bus pass"),
    (7, 62.3, "Food", TransactionType::Expense, "Groceries"),
    (3, 18.0, "Entertainment", TransactionType::Expense, "Cinema"),
    (1, 14.9, "Food", TransactionType::Expense, "Lunch"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let output_path = Path::new(&args.output_path);
    validate_output_path(output_path);

    let password = match prompt_password()? {
        Some(password) => password,
        None => return Ok(()),
    };

    println!("Creating database at {output_path:#?}");
    let store = SQLiteLedgerStore::open(output_path)?;

    println!("Creating test user {}...", args.email);
    let session = match Session::register(&store, &args.name, &args.email, &password)? {
        Some(session) => session,
        None => {
            eprintln!("A user with the email {} already exists!", args.email);
            exit(1);
        }
    };

    let now = OffsetDateTime::now_utc();
    for (days_ago, amount, category, kind, description) in SAMPLE_TRANSACTIONS {
        store.add_transaction(
            session.email(),
            Transaction::build(amount, category, kind, now - Duration::days(days_ago))
                .description(description),
        )?;
    }

    let dashboard = Dashboard::load(&store, &session)?;
    println!(
        "Added {} transactions, balance is {:.2}",
        SAMPLE_TRANSACTIONS.len(),
        dashboard.balance
    );

    println!("Success!");

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).init();
}

fn validate_output_path(output_path: &Path) {
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
}

/// Ask for the demo user's password, returning `None` if stdin was closed.
fn prompt_password() -> Result<Option<String>, io::Error> {
    loop {
        let password = match rpassword::prompt_password("Enter a password for the test user: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(error) => return Err(error),
        };

        if password.is_empty() {
            eprintln!("Password cannot be empty.");
            continue;
        }

        return Ok(Some(password));
    }
}
