//! Creates the ledger schema and keeps it at the current version.

use std::path::Path;

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    category::{create_category_table, seed_categories},
    transaction::create_transaction_table,
    user::create_user_table,
};

/// The schema version written to SQLite's `user_version` pragma.
///
/// Bumping this drops every table and recreates it on the next open.
pub const SCHEMA_VERSION: i32 = 1;

/// The file name the application uses for its database.
pub const DEFAULT_DB_NAME: &str = "ExpDB_Final_v2";

/// Open the database at `path`, creating the file if needed, and bring its
/// schema up to [SCHEMA_VERSION].
///
/// # Errors
/// This function will return a:
/// - [Error::UnsupportedSchemaVersion] if the file was written by a newer schema,
/// - or [Error::SqlError] if the file could not be opened or there is some other SQL error.
pub fn open(path: impl AsRef<Path>) -> Result<Connection, Error> {
    let connection = Connection::open(path)?;
    initialize(&connection)?;

    Ok(connection)
}

/// Get the schema version recorded in the database, zero for a new database.
///
/// # Errors
/// Returns [Error::SqlError] if the pragma could not be read.
pub fn schema_version(connection: &Connection) -> Result<i32, Error> {
    connection
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the tables for the ledger and seed the category list.
///
/// A database at an older schema version has all of its tables dropped and
/// recreated, discarding every user and transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::UnsupportedSchemaVersion] if the database has a newer schema version,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    migrate(connection, SCHEMA_VERSION)
}

fn migrate(connection: &Connection, target_version: i32) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    match schema_version(&transaction)? {
        found if found == target_version => return Ok(()),
        0 => {
            tracing::info!("Creating ledger schema version {target_version}");
            create_tables(&transaction)?;
        }
        found if found < target_version => {
            tracing::info!(
                "Upgrading ledger schema from version {found} to {target_version}, existing data will be dropped"
            );
            drop_tables(&transaction)?;
            create_tables(&transaction)?;
        }
        found => {
            return Err(Error::UnsupportedSchemaVersion {
                found,
                supported: target_version,
            });
        }
    }

    transaction.execute_batch(&format!("PRAGMA user_version = {target_version}"))?;
    transaction.commit()?;

    Ok(())
}

fn create_tables(connection: &Connection) -> Result<(), Error> {
    create_user_table(connection)?;
    create_transaction_table(connection)?;
    create_category_table(connection)?;
    seed_categories(connection)?;

    Ok(())
}

fn drop_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "DROP TABLE IF EXISTS users;
         DROP TABLE IF EXISTS tx;
         DROP TABLE IF EXISTS cats;",
    )
}

#[cfg(test)]
mod db_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error, SCHEMA_VERSION, Transaction, TransactionType, add_transaction, count_users,
        get_categories, register_user,
    };

    use super::{initialize, migrate, schema_version};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn count_rows(table: &str, conn: &Connection) -> u32 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn initialize_sets_schema_version() {
        let conn = get_test_connection();

        assert_eq!(schema_version(&conn), Ok(SCHEMA_VERSION));
    }

    #[test]
    fn new_connection_has_version_zero() {
        let conn = Connection::open_in_memory().unwrap();

        assert_eq!(schema_version(&conn), Ok(0));
    }

    #[test]
    fn initialize_twice_keeps_data_and_does_not_reseed() {
        let conn = get_test_connection();
        register_user("Alice", "alice@example.com", "hunter2", &conn).unwrap();

        initialize(&conn).unwrap();

        assert_eq!(count_users(&conn), Ok(1));
        assert_eq!(get_categories(&conn).unwrap().len(), 7);
    }

    #[test]
    fn version_bump_drops_and_recreates_tables() {
        let conn = get_test_connection();
        register_user("Alice", "alice@example.com", "hunter2", &conn).unwrap();
        add_transaction(
            "alice@example.com",
            Transaction::build(
                10.0,
                "Food",
                TransactionType::Expense,
                datetime!(2025-10-05 12:00 UTC),
            ),
            &conn,
        )
        .unwrap();

        migrate(&conn, SCHEMA_VERSION + 1).unwrap();

        assert_eq!(schema_version(&conn), Ok(SCHEMA_VERSION + 1));
        assert_eq!(count_rows("users", &conn), 0);
        assert_eq!(count_rows("tx", &conn), 0);
        assert_eq!(count_rows("cats", &conn), 7);
    }

    #[test]
    fn newer_version_is_rejected() {
        let conn = get_test_connection();
        register_user("Alice", "alice@example.com", "hunter2", &conn).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION + 1))
            .unwrap();

        let result = initialize(&conn);

        assert_eq!(
            result,
            Err(Error::UnsupportedSchemaVersion {
                found: SCHEMA_VERSION + 1,
                supported: SCHEMA_VERSION
            })
        );
        assert_eq!(count_rows("users", &conn), 1);
    }
}
