pub mod schema;
pub mod sqlite;

use std::path::Path;

use thiserror::Error;

use crate::types::identifiers::{ClassId, WordId};

pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Incompatible database: found tables {tables:?}")]
    IncompatibleStore { tables: Vec<String> },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Setting {key} holds a non-numeric value: {value}")]
    InvalidSetting { key: String, value: String },
    #[error("Count {0} does not fit the store's integer range")]
    CountOverflow(u64),
}

/// A class row as read from `Classes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub id: ClassId,
    pub name: String,
    pub count: u64,
}

/// A word row as read from `Words`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordRecord {
    pub id: WordId,
    pub total: u64,
}

/// Transactional backend holding classes, words, joint counts and settings.
///
/// Writes join a single ambient transaction that stays open until
/// [`Store::commit`] or [`Store::rollback`]. Reads observe that transaction.
/// Callers own all caching; a store answers every call from its tables.
pub trait Store {
    /// Location of the backing database, if it lives on disk.
    fn path(&self) -> Option<&Path>;

    fn load_classes(&self) -> Result<Vec<ClassRecord>, StoreError>;

    fn max_class_id(&self) -> Result<Option<ClassId>, StoreError>;

    fn insert_class(&mut self, id: ClassId, name: &str) -> Result<(), StoreError>;

    fn update_class_count(&mut self, id: ClassId, count: u64) -> Result<(), StoreError>;

    /// Document count of a class, `None` if the class does not exist.
    fn class_count(&self, id: ClassId) -> Result<Option<u64>, StoreError>;

    /// Delete a class. Its joint counts go with it and the totals of the
    /// affected words are reduced accordingly.
    fn delete_class(&mut self, id: ClassId) -> Result<(), StoreError>;

    fn lookup_word(&self, text: &str) -> Result<Option<WordRecord>, StoreError>;

    /// Joint count of a word within a class; a missing row reads as 0.
    fn joint_count(&self, word: WordId, class: ClassId) -> Result<u64, StoreError>;

    /// Insert the word if it is absent and return its id either way.
    fn ensure_word(&mut self, text: &str) -> Result<WordId, StoreError>;

    /// Write an absolute joint count. Zero removes the row.
    fn write_joint_count(&mut self, word: WordId, class: ClassId, count: u64)
        -> Result<(), StoreError>;

    fn update_word_total(&mut self, word: WordId, total: u64) -> Result<(), StoreError>;

    /// Delete a word and its joint counts. Returns whether the word existed.
    fn delete_word(&mut self, text: &str) -> Result<bool, StoreError>;

    fn read_setting(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a setting; `None` deletes it.
    fn write_setting(&mut self, key: &str, value: Option<&str>) -> Result<(), StoreError>;

    /// Mark a point inside the open transaction that a batch of writes can
    /// be undone back to without losing earlier writes.
    fn savepoint(&mut self) -> Result<(), StoreError>;

    /// Keep the writes made since [`Store::savepoint`].
    fn release_savepoint(&mut self) -> Result<(), StoreError>;

    /// Undo the writes made since [`Store::savepoint`] and drop the mark.
    fn rollback_to_savepoint(&mut self) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    fn rollback(&mut self) -> Result<(), StoreError>;
}
