//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::TransactionId};

/// The maximum number of rows returned by [get_recent_transactions].
pub const RECENT_TRANSACTION_LIMIT: u32 = 10;

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction earned or spent money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The literal stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(TransactionType::Income),
            "Expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income recorded by a user.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The email of the user that owns the transaction.
    pub email: String,
    /// The amount of money spent or earned. Always a positive value, the
    /// direction is given by `kind`.
    pub amount: f64,
    /// The category name, usually one of the seeded categories.
    pub category: String,
    /// Whether money was earned or spent.
    pub kind: TransactionType,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened, with millisecond precision.
    pub date: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        category: &str,
        kind: TransactionType,
        date: OffsetDateTime,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            category: category.to_owned(),
            kind,
            description: String::new(),
            date,
        }
    }
}

/// A builder for transactions that have not been saved yet.
///
/// Nothing is validated: parsing the amount and choosing a category is up to
/// the caller.
///
/// # Examples
///
/// ```
/// use time::macros::datetime;
///
/// use expense_ledger::{Transaction, TransactionType};
///
/// let builder = Transaction::build(
///         12.5,
///         "Food",
///         TransactionType::Expense,
///         datetime!(2025-01-15 12:30 UTC),
///     )
///     .description("Lunch");
///
/// assert_eq!(builder.description, "Lunch");
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount of money spent or earned.
    pub amount: f64,
    /// The category name.
    pub category: String,
    /// Whether money was earned or spent.
    pub kind: TransactionType,
    /// A text description, empty unless set with [TransactionBuilder::description].
    pub description: String,
    /// When the transaction happened. Sub-millisecond precision is discarded on save.
    pub date: OffsetDateTime,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Save a new transaction owned by `email`.
///
/// The caller is responsible for `email` belonging to a registered user.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn add_transaction(
    email: &str,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO tx (email, amount, category, type, \"desc\", date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, email, amount, category, type, \"desc\", date",
        )?
        .query_row(
            (
                email,
                builder.amount,
                &builder.category,
                builder.kind,
                &builder.description,
                to_unix_millis(builder.date),
            ),
            map_transaction_row,
        )?;

    tracing::debug!(
        "Added {} transaction {} for {email}",
        transaction.kind,
        transaction.id
    );

    Ok(transaction)
}

/// Delete the transaction with `id`. Deleting a missing transaction does nothing.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM tx WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        tracing::debug!("Transaction {id} was already deleted");
    } else {
        tracing::debug!("Deleted transaction {id}");
    }

    Ok(())
}

/// Sum the amounts of every `kind` transaction owned by `email`.
///
/// Returns zero when the user has no matching transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_total(
    email: &str,
    kind: TransactionType,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM tx WHERE email = ?1 AND type = ?2",
            (email, kind),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Total income minus total expenses for `email`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_balance(email: &str, connection: &Connection) -> Result<f64, Error> {
    let income = get_total(email, TransactionType::Income, connection)?;
    let expense = get_total(email, TransactionType::Expense, connection)?;

    Ok(income - expense)
}

/// Get the [RECENT_TRANSACTION_LIMIT] most recent transactions owned by `email`,
/// newest first.
///
/// Transactions on the same date are ordered newest insert first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_recent_transactions(
    email: &str,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    query_transactions(email, Some(RECENT_TRANSACTION_LIMIT), connection)
}

/// Get every transaction owned by `email`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(email: &str, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    query_transactions(email, None, connection)
}

/// Get the number of transactions owned by `email`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(email: &str, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM tx WHERE email = ?1", [email], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

fn query_transactions(
    email: &str,
    limit: Option<u32>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    // SQLite treats a negative limit as no limit.
    let limit = limit.map_or(-1, i64::from);

    let mut statement = connection.prepare(
        "SELECT id, email, amount, category, type, \"desc\", date
         FROM tx
         WHERE email = ?1
         ORDER BY date DESC, id DESC
         LIMIT ?2",
    )?;

    let transactions = statement
        .query_map((email, limit), map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()?;

    Ok(transactions)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS tx (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT,
                amount REAL,
                category TEXT,
                type TEXT,
                \"desc\" TEXT,
                date INTEGER
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in table order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let email = row.get(1)?;
    let amount = row.get(2)?;
    let category = row.get(3)?;
    let kind = row.get(4)?;
    let description = row.get(5)?;
    let raw_date = row.get(6)?;
    let date = from_unix_millis(raw_date).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(6, Type::Integer, Box::new(error))
    })?;

    Ok(Transaction {
        id,
        email,
        amount,
        category,
        kind,
        description,
        date,
    })
}

fn to_unix_millis(date: OffsetDateTime) -> i64 {
    date.unix_timestamp_nanos().div_euclid(1_000_000) as i64
}

fn from_unix_millis(millis: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use std::str::FromStr;

    use time::macros::datetime;

    use crate::Error;

    use super::{TransactionType, from_unix_millis, to_unix_millis};

    #[test]
    fn transaction_type_parses_literals() {
        assert_eq!(
            TransactionType::from_str("Income"),
            Ok(TransactionType::Income)
        );
        assert_eq!(
            TransactionType::from_str("Expense"),
            Ok(TransactionType::Expense)
        );
    }

    #[test]
    fn transaction_type_rejects_other_strings() {
        assert_eq!(
            TransactionType::from_str("income"),
            Err(Error::InvalidTransactionType("income".to_owned()))
        );
        assert_eq!(
            TransactionType::from_str("Transfer"),
            Err(Error::InvalidTransactionType("Transfer".to_owned()))
        );
    }

    #[test]
    fn transaction_type_displays_as_stored_literal() {
        assert_eq!(TransactionType::Income.to_string(), "Income");
        assert_eq!(TransactionType::Expense.to_string(), "Expense");
    }

    #[test]
    fn unix_millis_truncates_to_milliseconds() {
        let date = datetime!(2025-10-05 12:34:56.789123 UTC);

        let millis = to_unix_millis(date);

        assert_eq!(millis % 1000, 789);
        assert_eq!(
            from_unix_millis(millis).unwrap(),
            datetime!(2025-10-05 12:34:56.789 UTC)
        );
    }

    #[test]
    fn unix_millis_before_epoch() {
        let date = datetime!(1969-12-31 23:59:59.999 UTC);

        assert_eq!(to_unix_millis(date), -1);
        assert_eq!(from_unix_millis(-1).unwrap(), date);
    }
}
