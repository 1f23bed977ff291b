use serde::{Deserialize, Serialize};
use std::fmt;

/// Store identifier of a class row (`Classes.idNum`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(i64);

impl ClassId {
    pub fn new(raw: i64) -> Self {
        ClassId(raw)
    }

    /// The id handed out after this one: max existing id + 1.
    pub fn next(self) -> Self {
        ClassId(self.0 + 1)
    }

    /// Allocated when the class table is empty.
    pub fn first() -> Self {
        ClassId(1)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store identifier of a word row (`Words.idNum`), assigned by the store
/// the first time the word is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(i64);

impl WordId {
    pub fn new(raw: i64) -> Self {
        WordId(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
