//! Friend lookup and friend-set maintenance.

use std::sync::MutexGuard;

use serde::Serialize;
use tracing::warn;

use duet_shared::UserId;
use duet_store::{Database, User};

use crate::error::{ClientError, Result};
use crate::SharedDb;

/// A friend-list entry resolved for display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FriendEntry {
    pub id: UserId,
    pub email: String,
}

/// Lookup-by-email and set-membership maintenance over a user's friend list.
pub struct FriendDirectory {
    db: SharedDb,
}

impl FriendDirectory {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    /// Look a user up by email.  No match is a normal negative result.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.db()?.find_user_by_email(email)?)
    }

    /// Add a friend to `self_id`'s set.
    ///
    /// Idempotent; re-adding an existing friend is a no-op.  Self-friending
    /// is rejected here; the policy lives at this layer, not in the key
    /// derivation or the store.
    pub fn add_friend(&self, self_id: &UserId, friend_id: &UserId) -> Result<()> {
        if friend_id == self_id {
            return Err(ClientError::SelfFriend);
        }
        self.db()?.add_friend(self_id, friend_id)?;
        Ok(())
    }

    /// Resolve `self_id`'s friend set to display entries.
    ///
    /// One profile read per stored identifier; identifiers that no longer
    /// resolve to a user are dropped from the result.
    pub fn list_friends(&self, self_id: &UserId) -> Result<Vec<FriendEntry>> {
        let db = self.db()?;
        let ids = db.friend_ids(self_id)?;

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            match db.get_user(&id)? {
                Some(user) => entries.push(FriendEntry {
                    id: user.id,
                    email: user.email,
                }),
                None => {
                    warn!(friend = %id, "dropping friend reference to unknown user");
                }
            }
        }
        Ok(entries)
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| ClientError::LockPoisoned)
    }
}
