use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::store::schema::{self, SchemaState};
use crate::store::{ClassRecord, Store, StoreError, WordRecord};
use crate::types::identifiers::{ClassId, WordId};

/// SQLite-backed [`Store`].
///
/// The connection stays in autocommit mode until the first write, which
/// opens a transaction that lasts until `commit` or `rollback`.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open the database at `path`, creating it and installing the schema
    /// if it has no tables yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened classifier store");
        Self::prepare(conn, Some(path.to_path_buf()))
    }

    /// A private database that disappears when the store is dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(conn, None)
    }

    fn prepare(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        let tables = {
            let mut stmt =
                conn.prepare("SELECT tbl_name FROM sqlite_master WHERE type = 'table'")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        match schema::inspect(tables) {
            SchemaState::Empty => {
                conn.execute_batch(&format!("BEGIN;{}COMMIT;", schema::SCHEMA))?;
                tracing::debug!("installed classifier schema");
            }
            SchemaState::Compatible => {}
            SchemaState::Incompatible(tables) => {
                tracing::warn!(?tables, "refusing incompatible database");
                if let Err((_, err)) = conn.close() {
                    tracing::warn!(%err, "failed to close incompatible database");
                }
                return Err(StoreError::IncompatibleStore { tables });
            }
        }

        Ok(SqliteStore { conn, path })
    }

    /// Shut down the connection, rolling back anything uncommitted.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::Sqlite(err))
    }

    fn begin(&self) -> Result<(), StoreError> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }
}

fn to_sql(count: u64) -> Result<i64, StoreError> {
    i64::try_from(count).map_err(|_| StoreError::CountOverflow(count))
}

// Counts are guarded by CHECK constraints, so a negative value is never stored.
fn from_sql(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

impl Store for SqliteStore {
    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load_classes(&self) -> Result<Vec<ClassRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT idNum, name, count FROM Classes ORDER BY idNum")?;
        let rows = stmt.query_map([], |row| {
            Ok(ClassRecord {
                id: ClassId::new(row.get(0)?),
                name: row.get(1)?,
                count: from_sql(row.get(2)?),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn max_class_id(&self) -> Result<Option<ClassId>, StoreError> {
        let max: Option<i64> = self
            .conn
            .query_row("SELECT max(idNum) FROM Classes", [], |row| row.get(0))?;
        Ok(max.map(ClassId::new))
    }

    fn insert_class(&mut self, id: ClassId, name: &str) -> Result<(), StoreError> {
        self.begin()?;
        self.conn.execute(
            "INSERT INTO Classes VALUES (?1, ?2, 0)",
            params![id.get(), name],
        )?;
        Ok(())
    }

    fn update_class_count(&mut self, id: ClassId, count: u64) -> Result<(), StoreError> {
        self.begin()?;
        self.conn.execute(
            "UPDATE Classes SET count = ?1 WHERE idNum = ?2",
            params![to_sql(count)?, id.get()],
        )?;
        Ok(())
    }

    fn class_count(&self, id: ClassId) -> Result<Option<u64>, StoreError> {
        let count: Option<i64> = self
            .conn
            .query_row(
                "SELECT count FROM Classes WHERE idNum = ?1",
                params![id.get()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.map(from_sql))
    }

    fn delete_class(&mut self, id: ClassId) -> Result<(), StoreError> {
        self.begin()?;
        self.conn.execute(
            "UPDATE Words SET total = total - \
               (SELECT count FROM Data WHERE wordID = Words.idNum AND classID = ?1) \
             WHERE idNum IN (SELECT wordID FROM Data WHERE classID = ?1)",
            params![id.get()],
        )?;
        self.conn
            .execute("DELETE FROM Classes WHERE idNum = ?1", params![id.get()])?;
        Ok(())
    }

    fn lookup_word(&self, text: &str) -> Result<Option<WordRecord>, StoreError> {
        let row: Option<(i64, i64)> = self
            .conn
            .query_row(
                "SELECT idNum, total FROM Words WHERE word = ?1",
                params![text],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.map(|(id, total)| WordRecord {
            id: WordId::new(id),
            total: from_sql(total),
        }))
    }

    fn joint_count(&self, word: WordId, class: ClassId) -> Result<u64, StoreError> {
        let count: Option<i64> = self
            .conn
            .query_row(
                "SELECT count FROM Data WHERE wordID = ?1 AND classID = ?2",
                params![word.get(), class.get()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.map(from_sql).unwrap_or(0))
    }

    fn ensure_word(&mut self, text: &str) -> Result<WordId, StoreError> {
        self.begin()?;
        self.conn
            .execute("INSERT OR IGNORE INTO Words(word) VALUES (?1)", params![text])?;
        let id: i64 = self.conn.query_row(
            "SELECT idNum FROM Words WHERE word = ?1",
            params![text],
            |row| row.get(0),
        )?;
        Ok(WordId::new(id))
    }

    fn write_joint_count(
        &mut self,
        word: WordId,
        class: ClassId,
        count: u64,
    ) -> Result<(), StoreError> {
        self.begin()?;
        if count == 0 {
            self.conn.execute(
                "DELETE FROM Data WHERE wordID = ?1 AND classID = ?2",
                params![word.get(), class.get()],
            )?;
        } else {
            self.conn.execute(
                "INSERT OR REPLACE INTO Data VALUES (?1, ?2, ?3)",
                params![word.get(), class.get(), to_sql(count)?],
            )?;
        }
        Ok(())
    }

    fn update_word_total(&mut self, word: WordId, total: u64) -> Result<(), StoreError> {
        self.begin()?;
        self.conn.execute(
            "UPDATE Words SET total = ?1 WHERE idNum = ?2",
            params![to_sql(total)?, word.get()],
        )?;
        Ok(())
    }

    fn delete_word(&mut self, text: &str) -> Result<bool, StoreError> {
        self.begin()?;
        let removed = self
            .conn
            .execute("DELETE FROM Words WHERE word = ?1", params![text])?;
        Ok(removed > 0)
    }

    fn read_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT value FROM Settings WHERE name = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    fn write_setting(&mut self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        self.begin()?;
        match value {
            Some(value) => self.conn.execute(
                "INSERT OR REPLACE INTO Settings VALUES (?1, ?2)",
                params![key, value],
            )?,
            None => self
                .conn
                .execute("DELETE FROM Settings WHERE name = ?1", params![key])?,
        };
        Ok(())
    }

    fn savepoint(&mut self) -> Result<(), StoreError> {
        self.begin()?;
        self.conn.execute_batch("SAVEPOINT commit_batch")?;
        Ok(())
    }

    fn release_savepoint(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("RELEASE commit_batch")?;
        Ok(())
    }

    fn rollback_to_savepoint(&mut self) -> Result<(), StoreError> {
        // ROLLBACK TO leaves the savepoint on the stack
        self.conn.execute_batch("ROLLBACK TO commit_batch; RELEASE commit_batch")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}
