//! The ledger store interface used by presentation code, and its SQLite implementation.

use std::path::Path;

use rusqlite::Connection;

use crate::{
    Error,
    category::get_categories,
    database_id::TransactionId,
    db::{initialize, open},
    summary::{CategoryExpense, TransactionStats, get_category_expenses, get_transaction_stats},
    transaction::{
        Transaction, TransactionBuilder, TransactionType, add_transaction, count_transactions,
        delete_transaction, get_balance, get_recent_transactions, get_total, get_transactions,
    },
    user::{authenticate, count_users, get_user_name, register_user},
};

/// Handles users, transactions and categories for the presentation layer.
///
/// Every query that returns user data is scoped to the email it is given.
pub trait LedgerStore {
    /// Register a new user, returning `false` if the email is already registered.
    fn register(&self, name: &str, email: &str, password: &str) -> Result<bool, Error>;

    /// Whether `email` and `password` exactly match a registered user.
    fn authenticate(&self, email: &str, password: &str) -> Result<bool, Error>;

    /// The user's display name, or `"User"` if there is no such user.
    fn user_name(&self, email: &str) -> Result<String, Error>;

    /// The number of registered users.
    fn count_users(&self) -> Result<u32, Error>;

    /// Save a new transaction owned by `email`.
    fn add_transaction(
        &self,
        email: &str,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error>;

    /// Delete a transaction. Deleting a missing transaction does nothing.
    fn delete_transaction(&self, id: TransactionId) -> Result<(), Error>;

    /// The sum of the user's transactions of type `kind`, zero if there are none.
    fn total(&self, email: &str, kind: TransactionType) -> Result<f64, Error>;

    /// Total income minus total expenses.
    fn balance(&self, email: &str) -> Result<f64, Error>;

    /// The user's ten most recent transactions, newest first.
    fn recent_transactions(&self, email: &str) -> Result<Vec<Transaction>, Error>;

    /// All of the user's transactions, newest first.
    fn transactions(&self, email: &str) -> Result<Vec<Transaction>, Error>;

    /// The number of transactions the user owns.
    fn count_transactions(&self, email: &str) -> Result<u32, Error>;

    /// The category names in display order.
    fn categories(&self) -> Result<Vec<String>, Error>;

    /// The user's expense totals per category, largest first.
    fn category_expenses(&self, email: &str) -> Result<Vec<CategoryExpense>, Error>;

    /// Summary statistics over the user's transactions.
    fn transaction_stats(&self, email: &str) -> Result<TransactionStats, Error>;
}

/// A [LedgerStore] backed by a SQLite database.
///
/// The store owns its connection, so it can be moved to another thread but
/// not shared between threads without a lock.
#[derive(Debug)]
pub struct SQLiteLedgerStore {
    connection: Connection,
}

impl SQLiteLedgerStore {
    /// Open the database file at `path`, creating it and its schema if needed.
    ///
    /// # Errors
    ///
    /// Returns an [Error::UnsupportedSchemaVersion] if the file has a newer
    /// schema, or [Error::SqlError] if it cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let connection = open(path)?;

        Ok(Self { connection })
    }

    /// Create a store backed by an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if the database could not be created.
    pub fn open_in_memory() -> Result<Self, Error> {
        Self::new(Connection::open_in_memory()?)
    }

    /// Create a store from an existing connection, initializing its schema.
    ///
    /// # Errors
    ///
    /// Returns an [Error::UnsupportedSchemaVersion] if the database has a newer
    /// schema, or [Error::SqlError] if there is an SQL error.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self { connection })
    }

    /// The underlying database connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl LedgerStore for SQLiteLedgerStore {
    fn register(&self, name: &str, email: &str, password: &str) -> Result<bool, Error> {
        register_user(name, email, password, &self.connection)
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<bool, Error> {
        authenticate(email, password, &self.connection)
    }

    fn user_name(&self, email: &str) -> Result<String, Error> {
        get_user_name(email, &self.connection)
    }

    fn count_users(&self) -> Result<u32, Error> {
        count_users(&self.connection)
    }

    fn add_transaction(
        &self,
        email: &str,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error> {
        add_transaction(email, builder, &self.connection)
    }

    fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        delete_transaction(id, &self.connection)
    }

    fn total(&self, email: &str, kind: TransactionType) -> Result<f64, Error> {
        get_total(email, kind, &self.connection)
    }

    fn balance(&self, email: &str) -> Result<f64, Error> {
        get_balance(email, &self.connection)
    }

    fn recent_transactions(&self, email: &str) -> Result<Vec<Transaction>, Error> {
        get_recent_transactions(email, &self.connection)
    }

    fn transactions(&self, email: &str) -> Result<Vec<Transaction>, Error> {
        get_transactions(email, &self.connection)
    }

    fn count_transactions(&self, email: &str) -> Result<u32, Error> {
        count_transactions(email, &self.connection)
    }

    fn categories(&self) -> Result<Vec<String>, Error> {
        get_categories(&self.connection)
    }

    fn category_expenses(&self, email: &str) -> Result<Vec<CategoryExpense>, Error> {
        get_category_expenses(email, &self.connection)
    }

    fn transaction_stats(&self, email: &str) -> Result<TransactionStats, Error> {
        get_transaction_stats(email, &self.connection)
    }
}
