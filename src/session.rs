//! The logged-in user, passed explicitly to code that needs the current user.

use crate::{Error, store::LedgerStore};

/// Proof that a user logged in or registered.
///
/// Log out by dropping the session. Keeping the session across restarts is
/// up to the host application; the store does not persist it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    email: String,
}

impl Session {
    /// Log in with `email` and `password`.
    ///
    /// Returns `None` if the credentials do not match a registered user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not be queried.
    pub fn log_in(
        store: &impl LedgerStore,
        email: &str,
        password: &str,
    ) -> Result<Option<Self>, Error> {
        if store.authenticate(email, password)? {
            tracing::debug!("{email} logged in");
            Ok(Some(Self::new(email)))
        } else {
            tracing::debug!("Log in failed for {email}");
            Ok(None)
        }
    }

    /// Register a new user and log them in.
    ///
    /// Returns `None` if `email` is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not be queried.
    pub fn register(
        store: &impl LedgerStore,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<Self>, Error> {
        if store.register(name, email, password)? {
            Ok(Some(Self::new(email)))
        } else {
            Ok(None)
        }
    }

    /// Resume a session for `email`, e.g. one remembered by the host application.
    ///
    /// The email is not checked against the store.
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_owned(),
        }
    }

    /// The email of the logged-in user.
    pub fn email(&self) -> &str {
        &self.email
    }
}
