//! v001 -- Initial schema creation.
//!
//! Creates the four core tables: `accounts`, `users`, `friends`, and
//! `messages`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Accounts (credentials)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS accounts (
    user_id       TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    email         TEXT NOT NULL UNIQUE,       -- enforced unique at write time
    password_salt TEXT NOT NULL,              -- hex-encoded 16-byte salt
    password_hash TEXT NOT NULL,              -- hex-encoded BLAKE3 digest
    created_at    TEXT NOT NULL               -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- User profiles
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    email      TEXT NOT NULL,                 -- display email
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

-- ----------------------------------------------------------------
-- Friend sets (one row per directed edge)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS friends (
    user_id   TEXT NOT NULL,                  -- FK -> users(id), the initiator
    friend_id TEXT NOT NULL,                  -- the user that was added

    PRIMARY KEY (user_id, friend_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id          TEXT PRIMARY KEY NOT NULL,    -- UUID v4
    channel_key TEXT NOT NULL,                -- pairwise channel identifier
    sender_id   TEXT NOT NULL,
    text        TEXT NOT NULL,
    seq         INTEGER NOT NULL,             -- store-assigned, monotonic
    timestamp   TEXT NOT NULL                 -- ISO-8601, store-assigned
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_messages_channel_seq
    ON messages(channel_key, seq);
"#;

/// Apply the v001 schema.
pub fn up(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(UP_SQL)
}
