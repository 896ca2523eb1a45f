//! SQLite-backed link registry.
//!
//! Uses its own SQLite file so link data is isolated from either system's
//! storage.

use crate::error::{StoreError, StoreResult};
use groupbridge_sync::{LinkRegistry, SyncResult};
use groupbridge_types::{GroupId, GroupLink, System};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Persistent link registry backed by SQLite.
#[derive(Clone)]
pub struct SqliteLinkRegistry {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLinkRegistry {
    /// Opens (or creates) a link registry at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory link registry.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.lock().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS group_links (
                social_id TEXT NOT NULL UNIQUE,
                course_id TEXT NOT NULL UNIQUE,
                linked_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Loads all links, oldest first.
    pub fn links(&self) -> StoreResult<Vec<GroupLink>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT social_id, course_id FROM group_links ORDER BY linked_at, rowid")?;
        let rows = stmt.query_map([], |row| {
            let social: String = row.get(0)?;
            let course: String = row.get(1)?;
            Ok((social, course))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (social, course) = row?;
            result.push(GroupLink::new(parse_id(&social)?, parse_id(&course)?));
        }
        Ok(result)
    }

    fn find(&self, system: System, group: GroupId) -> StoreResult<Option<GroupLink>> {
        let sql = match system {
            System::Social => "SELECT social_id, course_id FROM group_links WHERE social_id = ?1",
            System::Course => "SELECT social_id, course_id FROM group_links WHERE course_id = ?1",
        };
        let row = self
            .lock()
            .query_row(sql, params![group.to_string()], |row| {
                let social: String = row.get(0)?;
                let course: String = row.get(1)?;
                Ok((social, course))
            })
            .optional()?;

        match row {
            Some((social, course)) => Ok(Some(GroupLink::new(parse_id(&social)?, parse_id(&course)?))),
            None => Ok(None),
        }
    }

    fn insert(&self, link: GroupLink) -> StoreResult<()> {
        let linked_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        // Replacing keeps links 1:1 on both sides.
        tx.execute(
            "DELETE FROM group_links WHERE social_id = ?1 OR course_id = ?2",
            params![link.social.to_string(), link.course.to_string()],
        )?;
        tx.execute(
            "INSERT INTO group_links (social_id, course_id, linked_at) VALUES (?1, ?2, ?3)",
            params![link.social.to_string(), link.course.to_string(), linked_at],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, link: GroupLink) -> StoreResult<()> {
        self.lock().execute(
            "DELETE FROM group_links WHERE social_id = ?1",
            params![link.social.to_string()],
        )?;
        Ok(())
    }
}

impl LinkRegistry for SqliteLinkRegistry {
    fn resolve_counterpart(&self, system: System, group: GroupId) -> SyncResult<Option<GroupId>> {
        Ok(self
            .find(system, group)?
            .map(|link| link.side(system.other())))
    }

    fn set_link(&self, link: GroupLink) -> SyncResult<()> {
        self.insert(link)?;
        debug!(social = %link.social, course = %link.course, "stored group link");
        Ok(())
    }

    fn remove_link(&self, system: System, group: GroupId) -> SyncResult<Option<GroupLink>> {
        let Some(link) = self.find(system, group)? else {
            return Ok(None);
        };
        self.delete(link)?;
        debug!(social = %link.social, course = %link.course, "removed group link");
        Ok(Some(link))
    }
}

fn parse_id(s: &str) -> StoreResult<GroupId> {
    GroupId::parse(s).map_err(|e| StoreError::InvalidData(format!("invalid group id {s:?}: {e}")))
}
