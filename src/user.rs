//! Code for creating the user table, registering users and checking their credentials.
//!
//! Passwords are stored and compared as plain strings. This matches the
//! behaviour of the application the ledger backs; hashing them would change
//! the login contract for existing databases.

use rusqlite::{Connection, OptionalExtension};

use crate::Error;

/// The name returned by [get_user_name] when no user has the given email.
pub const DEFAULT_USER_NAME: &str = "User";

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                email TEXT PRIMARY KEY,
                name TEXT,
                password TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Register a new user.
///
/// Returns `false` without touching the database if `email` is already
/// registered, `true` once the user has been inserted.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn register_user(
    name: &str,
    email: &str,
    password: &str,
    connection: &Connection,
) -> Result<bool, Error> {
    let result = connection.execute(
        "INSERT INTO users (email, name, password) VALUES (?1, ?2, ?3)",
        (email, name, password),
    );

    match result {
        Ok(_) => {
            tracing::debug!("Registered user {email}");
            Ok(true)
        }
        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code:
                    rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        )) => {
            tracing::warn!("Rejected registration for {email}: the email is already registered");
            Ok(false)
        }
        Err(error) => Err(error.into()),
    }
}

/// Check whether `email` and `password` exactly match a registered user.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn authenticate(email: &str, password: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND password = ?2)",
            (email, password),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the display name of the user with `email`, or [DEFAULT_USER_NAME] if
/// there is no such user.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_user_name(email: &str, connection: &Connection) -> Result<String, Error> {
    let name: Option<Option<String>> = connection
        .query_row("SELECT name FROM users WHERE email = ?1", [email], |row| {
            row.get(0)
        })
        .optional()?;

    Ok(name
        .flatten()
        .unwrap_or_else(|| DEFAULT_USER_NAME.to_owned()))
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(email) FROM users;", [], |row| row.get(0))
        .map_err(|error| error.into())
}
