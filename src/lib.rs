//! Expense Ledger is the persistence layer of a personal expense tracker.
//!
//! It stores users, income/expense transactions and a fixed list of
//! categories in a single SQLite file, and answers the queries a dashboard
//! needs: totals per transaction type, the running balance and the most
//! recent transactions.
//!
//! All operations are synchronous and run on the caller's thread.

#![warn(missing_docs)]

mod category;
mod dashboard;
mod database_id;
mod db;
mod session;
mod store;
mod summary;
mod transaction;
mod user;

pub use category::{DEFAULT_CATEGORIES, get_categories};
pub use dashboard::Dashboard;
pub use database_id::TransactionId;
pub use db::{DEFAULT_DB_NAME, SCHEMA_VERSION, initialize, open, schema_version};
pub use session::Session;
pub use store::{LedgerStore, SQLiteLedgerStore};
pub use summary::{CategoryExpense, TransactionStats, get_category_expenses, get_transaction_stats};
pub use transaction::{
    RECENT_TRANSACTION_LIMIT, Transaction, TransactionBuilder, TransactionType, add_transaction,
    count_transactions, delete_transaction, get_balance, get_recent_transactions, get_total,
    get_transactions,
};
pub use user::{DEFAULT_USER_NAME, authenticate, count_users, get_user_name, register_user};

/// The errors that may occur in the ledger store.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested row was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A transaction type string was neither `Income` nor `Expense`.
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// The database file was written by a newer version of the store.
    ///
    /// Older versions are dropped and recreated, but a newer schema cannot be
    /// downgraded without losing the caller's data, so the file is left alone.
    #[error("the database schema version {found} is newer than the supported version {supported}")]
    UnsupportedSchemaVersion {
        /// The version recorded in the database file.
        found: i32,
        /// The version this build of the store writes.
        supported: i32,
    },

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
