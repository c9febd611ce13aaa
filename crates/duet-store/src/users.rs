//! CRUD operations for [`User`] profiles and their friend sets.

use chrono::{DateTime, Utc};
use rusqlite::params;

use duet_shared::UserId;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::User;

impl Database {
    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    /// Insert a new user profile.
    pub fn create_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (id, email, created_at)
             VALUES (?1, ?2, ?3)",
            params![
                user.id.as_str(),
                user.email,
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a single user by identifier.
    pub fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let result = self.conn().query_row(
            "SELECT id, email, created_at FROM users WHERE id = ?1",
            params![id.as_str()],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(other) => Err(StoreError::Sqlite(other)),
        }
    }

    /// Look a user up by email.
    ///
    /// The email column on profiles is not constrained unique (the accounts
    /// table is); if duplicates ever exist the first match wins rather than
    /// erroring.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = self.conn().query_row(
            "SELECT id, email, created_at FROM users WHERE email = ?1 LIMIT 1",
            params![email],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(other) => Err(StoreError::Sqlite(other)),
        }
    }

    // ------------------------------------------------------------------
    // Friend sets
    // ------------------------------------------------------------------

    /// Add `friend_id` to `user_id`'s friend set.
    ///
    /// Set semantics: inserting an already-present member is a no-op, so the
    /// operation is idempotent.  Only the initiator's row is touched.
    pub fn add_friend(&self, user_id: &UserId, friend_id: &UserId) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO friends (user_id, friend_id) VALUES (?1, ?2)",
            params![user_id.as_str(), friend_id.as_str()],
        )?;
        Ok(())
    }

    /// The raw stored friend set for a user, in insertion-independent
    /// (identifier) order.
    pub fn friend_ids(&self, user_id: &UserId) -> Result<Vec<UserId>> {
        let mut stmt = self.conn().prepare(
            "SELECT friend_id FROM friends WHERE user_id = ?1 ORDER BY friend_id ASC",
        )?;

        let rows = stmt.query_map(params![user_id.as_str()], |row| {
            let id: String = row.get(0)?;
            Ok(UserId(id))
        })?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let email: String = row.get(1)?;
    let ts_str: String = row.get(2)?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(User {
        id: UserId(id),
        email,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_user(db: &Database, id: &str, email: &str) -> User {
        let user = User {
            id: UserId::from(id),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        db.create_user(&user).unwrap();
        user
    }

    #[test]
    fn find_by_email() {
        let db = Database::open_in_memory().unwrap();
        insert_user(&db, "u1", "a@example.com");

        let found = db.find_user_by_email("a@example.com").unwrap().unwrap();
        assert_eq!(found.id, UserId::from("u1"));

        assert!(db.find_user_by_email("x@example.com").unwrap().is_none());
    }

    #[test]
    fn add_friend_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        insert_user(&db, "u1", "a@example.com");
        insert_user(&db, "u2", "b@example.com");

        let a = UserId::from("u1");
        let b = UserId::from("u2");
        db.add_friend(&a, &b).unwrap();
        db.add_friend(&a, &b).unwrap();

        assert_eq!(db.friend_ids(&a).unwrap(), vec![b.clone()]);
        // Friendship is recorded only on the initiator's row.
        assert!(db.friend_ids(&b).unwrap().is_empty());
    }
}
