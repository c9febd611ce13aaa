//! Append and snapshot operations for [`Message`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use duet_shared::{ChannelKey, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Message;

impl Database {
    /// Append a message to a channel.
    ///
    /// The store assigns the identifier, the monotonic sequence number, and
    /// the timestamp; callers only supply the payload, so ordering can never
    /// be skewed by a sender's clock.  Messages are immutable once written.
    pub fn append_message(
        &self,
        channel_key: &ChannelKey,
        sender_id: &UserId,
        text: &str,
    ) -> Result<Message> {
        let id = Uuid::new_v4().to_string();
        let timestamp = Utc::now();

        // Sequence assignment and insert in one statement keeps the
        // MAX(seq) read atomic with the write.
        self.conn().execute(
            "INSERT INTO messages (id, channel_key, sender_id, text, seq, timestamp)
             SELECT ?1, ?2, ?3, ?4, COALESCE(MAX(seq), 0) + 1, ?5 FROM messages",
            params![
                id,
                channel_key.as_str(),
                sender_id.as_str(),
                text,
                timestamp.to_rfc3339(),
            ],
        )?;

        // Read the row back so the caller sees the assigned sequence number.
        let message = self.get_message_by_id(&id)?;
        tracing::debug!(channel = %channel_key, seq = message.seq, "message appended");
        Ok(message)
    }

    /// The complete, ascending-ordered message list for a channel.
    pub fn messages_for_channel(&self, channel_key: &ChannelKey) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, channel_key, sender_id, text, seq, timestamp
             FROM messages
             WHERE channel_key = ?1
             ORDER BY seq ASC",
        )?;

        let rows = stmt.query_map(params![channel_key.as_str()], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Fetch a single message by identifier.
    pub fn get_message_by_id(&self, id: &str) -> Result<Message> {
        self.conn()
            .query_row(
                "SELECT id, channel_key, sender_id, text, seq, timestamp
                 FROM messages WHERE id = ?1",
                params![id],
                row_to_message,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id: String = row.get(0)?;
    let channel_key: String = row.get(1)?;
    let sender_id: String = row.get(2)?;
    let text: String = row.get(3)?;
    let seq: i64 = row.get(4)?;
    let ts_str: String = row.get(5)?;

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Message {
        id,
        channel_key: ChannelKey::from_raw(channel_key),
        sender_id: UserId(sender_id),
        text,
        seq,
        timestamp,
    })
}
