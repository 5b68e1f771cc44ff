//! The fixed list of category names offered when recording a transaction.

use rusqlite::Connection;

use crate::Error;

/// The category names seeded into a new database, in display order.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Salary",
    "Food",
    "Transport",
    "Bills",
    "Entertainment",
    "Health",
    "Other",
];

/// Create the category table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute("CREATE TABLE IF NOT EXISTS cats (name TEXT)", ())?;

    Ok(())
}

/// Insert [DEFAULT_CATEGORIES] if the category table is empty.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn seed_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let count: u32 = connection.query_row("SELECT COUNT(*) FROM cats", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(());
    }

    let mut statement = connection.prepare("INSERT INTO cats (name) VALUES (?1)")?;
    for name in DEFAULT_CATEGORIES {
        statement.execute([name])?;
    }

    Ok(())
}

/// Get every category name in the order they were seeded.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_categories(connection: &Connection) -> Result<Vec<String>, Error> {
    let mut statement = connection.prepare("SELECT name FROM cats ORDER BY rowid")?;

    let names = statement
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<String>, rusqlite::Error>>()?;

    Ok(names)
}
