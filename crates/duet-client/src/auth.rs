//! Account registration and authentication.
//!
//! The [`Authenticator`] plays the identity-provider role: it issues stable
//! user identifiers at registration, verifies credentials at sign-in, and
//! publishes every authentication-state change on a watch channel so the
//! rest of the client can react (the session controller subscribes to it).

use std::sync::MutexGuard;

use chrono::Utc;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use duet_shared::{StoredCredential, UserId};
use duet_store::{Account, Database, StoreError, User};

use crate::error::{ClientError, Result};
use crate::SharedDb;

/// Identity provider backed by the accounts table.
pub struct Authenticator {
    db: SharedDb,
    identity_tx: watch::Sender<Option<UserId>>,
}

impl Authenticator {
    pub fn new(db: SharedDb) -> Self {
        let (identity_tx, _) = watch::channel(None);
        Self { db, identity_tx }
    }

    /// Register a new account and sign the session in.
    ///
    /// Two separate store writes: the credential row, then the profile
    /// document.  There is no cross-record transaction; if the second write
    /// fails the account exists without a profile and the error is surfaced
    /// as-is.
    pub fn register(&self, email: &str, password: &str) -> Result<UserId> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::MissingCredentials);
        }

        let credential = StoredCredential::hash_password(password);
        let user_id = UserId(Uuid::new_v4().to_string());
        let now = Utc::now();

        let db = self.db()?;
        db.create_account(&Account {
            user_id: user_id.clone(),
            email: email.to_string(),
            password_salt: credential.salt_hex(),
            password_hash: credential.digest_hex(),
            created_at: now,
        })
        .map_err(|e| match e {
            StoreError::AlreadyExists => ClientError::EmailTaken,
            other => ClientError::Store(other),
        })?;

        db.create_user(&User {
            id: user_id.clone(),
            email: email.to_string(),
            created_at: now,
        })?;
        drop(db);

        info!(user = %user_id, "account registered");
        self.identity_tx.send_replace(Some(user_id.clone()));
        Ok(user_id)
    }

    /// Verify credentials and sign the session in.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<UserId> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::MissingCredentials);
        }

        let account = {
            let db = self.db()?;
            db.get_account_by_email(email)?
        }
        .ok_or(ClientError::InvalidCredentials)?;

        let credential =
            StoredCredential::from_hex(&account.password_salt, &account.password_hash)?;
        if !credential.verify(password) {
            return Err(ClientError::InvalidCredentials);
        }

        info!(user = %account.user_id, "signed in");
        self.identity_tx.send_replace(Some(account.user_id.clone()));
        Ok(account.user_id)
    }

    /// Clear the authenticated identity.
    pub fn sign_out(&self) {
        self.identity_tx.send_replace(None);
    }

    /// The currently authenticated identifier, if any.
    pub fn current_identity(&self) -> Option<UserId> {
        self.identity_tx.borrow().clone()
    }

    /// Subscribe to authentication-state changes.  Each update carries the
    /// current identifier, or `None` after sign-out.
    pub fn watch_identity(&self) -> watch::Receiver<Option<UserId>> {
        self.identity_tx.subscribe()
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| ClientError::LockPoisoned)
    }
}
