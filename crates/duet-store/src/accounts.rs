//! CRUD operations for [`Account`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;

use duet_shared::UserId;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Account;

impl Database {
    /// Insert a new account.
    ///
    /// Returns [`StoreError::AlreadyExists`] when the email is already
    /// registered; uniqueness is enforced by the schema, not by a
    /// read-then-write race.
    pub fn create_account(&self, account: &Account) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO accounts (user_id, email, password_salt, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    account.user_id.as_str(),
                    account.email,
                    account.password_salt,
                    account.password_hash,
                    account.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    StoreError::AlreadyExists
                }
                other => StoreError::Sqlite(other),
            })?;
        Ok(())
    }

    /// Fetch the account registered under an email, if any.
    pub fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let result = self.conn().query_row(
            "SELECT user_id, email, password_salt, password_hash, created_at
             FROM accounts
             WHERE email = ?1",
            params![email],
            row_to_account,
        );

        match result {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(other) => Err(StoreError::Sqlite(other)),
        }
    }
}

fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let user_id: String = row.get(0)?;
    let email: String = row.get(1)?;
    let password_salt: String = row.get(2)?;
    let password_hash: String = row.get(3)?;
    let ts_str: String = row.get(4)?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Account {
        user_id: UserId(user_id),
        email,
        password_salt,
        password_hash,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account(email: &str, user_id: &str) -> Account {
        Account {
            user_id: UserId::from(user_id),
            email: email.to_string(),
            password_salt: "00".repeat(16),
            password_hash: "11".repeat(32),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_fetch_by_email() {
        let db = Database::open_in_memory().unwrap();
        let account = sample_account("a@example.com", "u1");
        db.create_account(&account).unwrap();

        let fetched = db.get_account_by_email("a@example.com").unwrap().unwrap();
        assert_eq!(fetched.user_id, account.user_id);
        assert_eq!(fetched.password_hash, account.password_hash);

        assert!(db.get_account_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_account(&sample_account("a@example.com", "u1")).unwrap();

        let err = db
            .create_account(&sample_account("a@example.com", "u2"))
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));
    }
}
