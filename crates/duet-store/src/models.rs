//! Domain model structs persisted in the SQLite store.
//!
//! The records a presentation layer consumes (`User`, `Message`) derive
//! `Serialize` and `Deserialize`; `Account` carries credentials and never
//! leaves the store/auth boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use duet_shared::{ChannelKey, UserId};

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Credential record for a registered user.  Never leaves the store/auth
/// boundary; the salt and digest are hex-encoded in SQLite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Identifier assigned at registration.
    pub user_id: UserId,
    /// Sign-in email, unique across accounts.
    pub email: String,
    /// Hex-encoded 16-byte salt.
    pub password_salt: String,
    /// Hex-encoded BLAKE3 digest of salt || password.
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// User profile
// ---------------------------------------------------------------------------

/// A user profile document.  The friend set lives in its own table and is
/// read through [`crate::Database::friend_ids`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Identifier assigned by the authenticator.
    pub id: UserId,
    /// Display email (mirrors the account email at registration time).
    pub email: String,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.  Immutable once written; `seq` and `timestamp` are
/// assigned by the store so ordering never depends on sender clocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier.
    pub id: String,
    /// The pairwise channel this message belongs to.
    pub channel_key: ChannelKey,
    /// Identifier of the sender.
    pub sender_id: UserId,
    /// Plain text payload.
    pub text: String,
    /// Store-assigned monotonic sequence number; delivery order within a
    /// channel is ascending in this value.
    pub seq: i64,
    /// Store-assigned wall-clock timestamp.
    pub timestamp: DateTime<Utc>,
}
