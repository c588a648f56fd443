use anyhow::Result;

use greenlands_types::models::ChannelType;

use crate::models::{MessageRow, NewMessage};
use crate::{Database, OptionalExt};

/// Columns with sender (s) and recipient (r) contact fields joined in.
const MESSAGE_SELECT: &str = "SELECT m.id, m.subject, m.content, m.thread_id, m.channel_type, \
     m.read, m.created_at, \
     s.id, s.name, s.email, s.role, \
     r.id, r.name, r.email, r.role \
     FROM messages m \
     JOIN users s ON m.sender_id = s.id \
     JOIN users r ON m.recipient_id = r.id";

impl Database {
    pub fn insert_message(&self, msg: &NewMessage) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, sender_id, recipient_id, subject, content, \
                 thread_id, channel_type, read, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
                rusqlite::params![
                    msg.id,
                    msg.sender_id,
                    msg.recipient_id,
                    msg.subject,
                    msg.content,
                    msg.thread_id,
                    msg.channel_type,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE m.id = ?1", MESSAGE_SELECT);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], message_from_row).optional()
        })
    }

    /// All messages where the user is sender or recipient, newest first
    /// (inbox ordering), optionally restricted to one channel type.
    pub fn list_messages_for_user(
        &self,
        user_id: &str,
        channel_type: Option<ChannelType>,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut sql = format!(
                "{} WHERE (m.sender_id = ?1 OR m.recipient_id = ?1)",
                MESSAGE_SELECT
            );
            if channel_type.is_some() {
                sql.push_str(" AND m.channel_type = ?2");
            }
            sql.push_str(" ORDER BY m.created_at DESC, m.id DESC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = match channel_type {
                Some(ct) => stmt
                    .query_map(rusqlite::params![user_id, ct.as_str()], message_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?,
                None => stmt
                    .query_map([user_id], message_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            };
            Ok(rows)
        })
    }

    /// Messages of one thread, oldest first (conversation ordering).
    pub fn thread_messages(&self, thread_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} WHERE m.thread_id = ?1 ORDER BY m.created_at ASC, m.id ASC",
                MESSAGE_SELECT
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([thread_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Channel type of an existing thread; None if the thread has no
    /// messages. Every message in a thread carries the same channel type, so
    /// any row answers the question.
    pub fn thread_channel_type(&self, thread_id: &str) -> Result<Option<ChannelType>> {
        self.with_conn(|conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT channel_type FROM messages WHERE thread_id = ?1 LIMIT 1",
                    [thread_id],
                    |row| row.get(0),
                )
                .optional()?;
            raw.map(|s| s.parse().map_err(anyhow::Error::msg)).transpose()
        })
    }

    /// Marks every message in the thread addressed to `recipient_id` as
    /// read. One UPDATE statement, so concurrent readers of the thread never
    /// observe a half-applied batch. Returns the number of rows flipped;
    /// calling again is a no-op.
    pub fn mark_thread_read(&self, thread_id: &str, recipient_id: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET read = 1 \
                 WHERE thread_id = ?1 AND recipient_id = ?2 AND read = 0",
                rusqlite::params![thread_id, recipient_id],
            )?;
            Ok(changed)
        })
    }

    pub fn unread_count(
        &self,
        recipient_id: &str,
        channel_type: Option<ChannelType>,
    ) -> Result<u64> {
        self.with_conn(|conn| {
            let count: u64 = match channel_type {
                Some(ct) => conn.query_row(
                    "SELECT COUNT(*) FROM messages \
                     WHERE recipient_id = ?1 AND read = 0 AND channel_type = ?2",
                    rusqlite::params![recipient_id, ct.as_str()],
                    |row| row.get(0),
                )?,
                None => conn.query_row(
                    "SELECT COUNT(*) FROM messages WHERE recipient_id = ?1 AND read = 0",
                    [recipient_id],
                    |row| row.get(0),
                )?,
            };
            Ok(count)
        })
    }
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        subject: row.get(1)?,
        content: row.get(2)?,
        thread_id: row.get(3)?,
        channel_type: row.get(4)?,
        read: row.get(5)?,
        created_at: row.get(6)?,
        sender_id: row.get(7)?,
        sender_name: row.get(8)?,
        sender_email: row.get(9)?,
        sender_role: row.get(10)?,
        recipient_id: row.get(11)?,
        recipient_name: row.get(12)?,
        recipient_email: row.get(13)?,
        recipient_role: row.get(14)?,
    })
}
