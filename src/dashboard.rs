//! The data shown on the dashboard: a greeting, totals, the balance and recent activity.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    session::Session,
    store::LedgerStore,
    transaction::{Transaction, TransactionType},
};

/// A snapshot of the logged-in user's finances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// The name to greet the user with.
    pub user_name: String,
    /// The sum of the user's income.
    pub total_income: f64,
    /// The sum of the user's expenses.
    pub total_expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// Up to ten of the user's latest transactions, newest first.
    pub recent_transactions: Vec<Transaction>,
}

impl Dashboard {
    /// Load the dashboard for the user logged in to `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not be queried.
    pub fn load(store: &impl LedgerStore, session: &Session) -> Result<Self, Error> {
        let email = session.email();

        let user_name = store.user_name(email)?;
        let total_income = store.total(email, TransactionType::Income)?;
        let total_expense = store.total(email, TransactionType::Expense)?;
        let recent_transactions = store.recent_transactions(email)?;

        Ok(Self {
            user_name,
            total_income,
            total_expense,
            balance: total_income - total_expense,
            recent_transactions,
        })
    }
}
