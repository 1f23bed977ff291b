use std::collections::BTreeMap;

use crate::cache::count::Count;
use crate::store::ClassRecord;
use crate::types::identifiers::{ClassId, WordId};

/// A class as the cache sees it: its document count and every word that has
/// been referenced in its context since the last fill.
#[derive(Debug, Clone)]
pub struct Class {
    id: ClassId,
    name: String,
    count: Count,
    pub(crate) words: BTreeMap<String, Count>,
}

impl Class {
    pub(crate) fn new(id: ClassId, name: impl Into<String>, count: u64) -> Self {
        Class {
            id,
            name: name.into(),
            count: Count::loaded(count),
            words: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of documents trained into this class, pending changes included.
    pub fn count(&self) -> u64 {
        self.count.value().unwrap_or(0)
    }

    pub fn increment(&mut self, n: u64) {
        self.count.increment(n);
    }

    pub fn decrement(&mut self, n: u64) {
        self.count.decrement(n);
    }

    pub fn set_count(&mut self, value: u64) {
        self.count.set(value);
    }

    pub fn is_dirty(&self) -> bool {
        self.count.is_dirty()
    }

    /// Cached word counts in this class, ordered by word.
    pub fn words(&self) -> impl Iterator<Item = (&str, &Count)> {
        self.words.iter().map(|(text, count)| (text.as_str(), count))
    }

    pub(crate) fn document_count(&self) -> &Count {
        &self.count
    }

    pub(crate) fn document_count_mut(&mut self) -> &mut Count {
        &mut self.count
    }
}

impl From<ClassRecord> for Class {
    fn from(record: ClassRecord) -> Self {
        Class::new(record.id, record.name, record.count)
    }
}

/// Word data shared by every class: the store id and the total across classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WordEntry {
    pub(crate) id: Option<WordId>,
    pub(crate) total: u64,
}
