//! Expense breakdowns by category and summary statistics for a user.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    transaction::{TransactionType, count_transactions},
};

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryExpense {
    /// The category name.
    pub category: String,
    /// The sum of expenses in the category.
    pub total: f64,
    /// The category's percentage (0 to 100) of the user's total expenses.
    pub share: f64,
}

/// Counts and averages over a user's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStats {
    /// The number of transactions of either type.
    pub transaction_count: u32,
    /// The number of distinct categories that have expenses.
    pub expense_category_count: u32,
    /// The mean expense amount, zero if there are no expenses.
    pub average_expense: f64,
    /// The total of the category with the most spending, zero if there are no expenses.
    pub largest_category_expense: f64,
}

/// Get the expense total for each category `email` has spent money in, largest first.
///
/// Categories with equal totals are ordered by name. Income is not included.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_category_expenses(
    email: &str,
    connection: &Connection,
) -> Result<Vec<CategoryExpense>, Error> {
    let mut statement = connection.prepare(
        "SELECT category, SUM(amount) AS total
         FROM tx
         WHERE email = ?1 AND type = ?2
         GROUP BY category
         ORDER BY total DESC, category ASC",
    )?;

    let totals = statement
        .query_map((email, TransactionType::Expense), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<(String, f64)>, rusqlite::Error>>()?;

    let total_expense: f64 = totals.iter().map(|(_, total)| total).sum();

    let expenses = totals
        .into_iter()
        .map(|(category, total)| {
            let share = if total_expense > 0.0 {
                total * 100.0 / total_expense
            } else {
                0.0
            };

            CategoryExpense {
                category,
                total,
                share,
            }
        })
        .collect();

    Ok(expenses)
}

/// Get summary statistics over the transactions owned by `email`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transaction_stats(
    email: &str,
    connection: &Connection,
) -> Result<TransactionStats, Error> {
    let transaction_count = count_transactions(email, connection)?;

    let (expense_count, average_expense): (u32, Option<f64>) = connection.query_row(
        "SELECT COUNT(id), AVG(amount) FROM tx WHERE email = ?1 AND type = ?2",
        (email, TransactionType::Expense),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let category_expenses = get_category_expenses(email, connection)?;
    let largest_category_expense = category_expenses
        .first()
        .map_or(0.0, |expense| expense.total);

    tracing::debug!("Computed stats for {email} over {expense_count} expenses");

    Ok(TransactionStats {
        transaction_count,
        expense_category_count: category_expenses.len() as u32,
        average_expense: average_expense.unwrap_or(0.0),
        largest_category_expense,
    })
}

#[cfg(test)]
mod summary_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{Transaction, TransactionType, add_transaction, db::initialize};

    use super::{CategoryExpense, TransactionStats, get_category_expenses, get_transaction_stats};

    const EMAIL: &str = "alice@example.com";

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn add(amount: f64, category: &str, kind: TransactionType, conn: &Connection) {
        add_transaction(
            EMAIL,
            Transaction::build(amount, category, kind, datetime!(2025-10-05 12:00 UTC)),
            conn,
        )
        .expect("Could not create transaction");
    }

    #[test]
    fn category_expenses_are_empty_without_expenses() {
        let conn = get_test_connection();
        add(1000.0, "Salary", TransactionType::Income, &conn);

        assert_eq!(get_category_expenses(EMAIL, &conn), Ok(vec![]));
    }

    #[test]
    fn category_expenses_are_grouped_and_sorted() {
        let conn = get_test_connection();
        add(1000.0, "Salary", TransactionType::Income, &conn);
        add(20.0, "Food", TransactionType::Expense, &conn);
        add(30.0, "Food", TransactionType::Expense, &conn);
        add(150.0, "Bills", TransactionType::Expense, &conn);
        add(50.0, "Transport", TransactionType::Expense, &conn);

        let expenses = get_category_expenses(EMAIL, &conn).unwrap();

        assert_eq!(
            expenses,
            vec![
                CategoryExpense {
                    category: "Bills".to_owned(),
                    total: 150.0,
                    share: 60.0,
                },
                CategoryExpense {
                    category: "Food".to_owned(),
                    total: 50.0,
                    share: 20.0,
                },
                CategoryExpense {
                    category: "Transport".to_owned(),
                    total: 50.0,
                    share: 20.0,
                },
            ]
        );
    }

    #[test]
    fn category_shares_sum_to_one_hundred() {
        let conn = get_test_connection();
        add(12.34, "Food", TransactionType::Expense, &conn);
        add(56.78, "Health", TransactionType::Expense, &conn);
        add(9.1, "Other", TransactionType::Expense, &conn);

        let total_share: f64 = get_category_expenses(EMAIL, &conn)
            .unwrap()
            .iter()
            .map(|expense| expense.share)
            .sum();

        assert!(
            (total_share - 100.0).abs() < 1e-9,
            "want shares to sum to 100, got {total_share}"
        );
    }

    #[test]
    fn stats_without_transactions_are_zero() {
        let conn = get_test_connection();

        assert_eq!(
            get_transaction_stats(EMAIL, &conn),
            Ok(TransactionStats {
                transaction_count: 0,
                expense_category_count: 0,
                average_expense: 0.0,
                largest_category_expense: 0.0,
            })
        );
    }

    #[test]
    fn stats_with_only_income_have_zero_average_expense() {
        let conn = get_test_connection();
        add(1000.0, "Salary", TransactionType::Income, &conn);

        let stats = get_transaction_stats(EMAIL, &conn).unwrap();

        assert_eq!(stats.transaction_count, 1);
        assert_eq!(stats.expense_category_count, 0);
        assert_eq!(stats.average_expense, 0.0);
    }

    #[test]
    fn stats_summarise_expenses() {
        let conn = get_test_connection();
        add(1000.0, "Salary", TransactionType::Income, &conn);
        add(20.0, "Food", TransactionType::Expense, &conn);
        add(40.0, "Food", TransactionType::Expense, &conn);
        add(90.0, "Bills", TransactionType::Expense, &conn);

        let stats = get_transaction_stats(EMAIL, &conn).unwrap();

        assert_eq!(
            stats,
            TransactionStats {
                transaction_count: 4,
                expense_category_count: 2,
                average_expense: 50.0,
                largest_category_expense: 90.0,
            }
        );
    }
}
