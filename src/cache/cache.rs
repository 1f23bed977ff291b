use std::collections::btree_map::Entry as ClassEntry;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use thiserror::Error;

use crate::cache::class::{Class, WordEntry};
use crate::cache::count::{Count, Pending};
use crate::store::{Store, StoreError};
use crate::types::identifiers::{ClassId, WordId};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Unknown class: {0}")]
    UnknownClass(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Write-back cache over a [`Store`].
///
/// Classes and words are read from the store on first use and kept until
/// [`Cache::discard`]. Count mutations stay in memory until
/// [`Cache::commit`] writes them in one store transaction. Class creation is
/// the exception and is committed immediately.
#[derive(Debug)]
pub struct Cache<S> {
    pub(crate) store: S,
    pub(crate) classes: Option<BTreeMap<String, Class>>,
    pub(crate) words: HashMap<String, WordEntry>,
}

impl<S: Store> Cache<S> {
    pub fn new(store: S) -> Self {
        Cache {
            store,
            classes: None,
            words: HashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access. Writes made here bypass the cache, which keeps
    /// serving whatever it has already loaded.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn path(&self) -> Option<&Path> {
        self.store.path()
    }

    /// Discard pending changes and hand back the store.
    pub fn into_store(mut self) -> Result<S, CacheError> {
        self.discard()?;
        Ok(self.store)
    }

    fn load_classes(&mut self) -> Result<&mut BTreeMap<String, Class>, CacheError> {
        let classes = match self.classes.take() {
            Some(classes) => classes,
            None => {
                let records = self.store.load_classes()?;
                tracing::debug!(classes = records.len(), "loaded class table");
                records
                    .into_iter()
                    .map(|record| (record.name.clone(), Class::from(record)))
                    .collect()
            }
        };
        Ok(self.classes.insert(classes))
    }

    pub fn has_class(&mut self, name: &str) -> Result<bool, CacheError> {
        Ok(self.load_classes()?.contains_key(name))
    }

    pub fn class(&mut self, name: &str) -> Result<&Class, CacheError> {
        self.load_classes()?
            .get(name)
            .ok_or_else(|| CacheError::UnknownClass(name.to_string()))
    }

    pub fn class_mut(&mut self, name: &str) -> Result<&mut Class, CacheError> {
        self.load_classes()?
            .get_mut(name)
            .ok_or_else(|| CacheError::UnknownClass(name.to_string()))
    }

    /// Return the named class, creating and committing it if it is new.
    pub fn ensure_class(&mut self, name: &str) -> Result<&mut Class, CacheError> {
        self.load_classes()?;
        let Cache { store, classes, .. } = self;
        let classes = classes.get_or_insert_with(BTreeMap::new);

        match classes.entry(name.to_string()) {
            ClassEntry::Occupied(entry) => Ok(entry.into_mut()),
            ClassEntry::Vacant(entry) => {
                let id = store
                    .max_class_id()?
                    .map(ClassId::next)
                    .unwrap_or_else(ClassId::first);
                store.insert_class(id, name)?;
                store.commit()?;
                tracing::debug!(%id, name, "created class");
                Ok(entry.insert(Class::new(id, name, 0)))
            }
        }
    }

    /// Names of all classes, in order.
    pub fn class_names(&mut self) -> Result<Vec<String>, CacheError> {
        Ok(self.load_classes()?.keys().cloned().collect())
    }

    /// All classes, ordered by name.
    pub fn classes(&mut self) -> Result<Vec<&Class>, CacheError> {
        Ok(self.load_classes()?.values().collect())
    }

    pub fn len(&mut self) -> Result<usize, CacheError> {
        Ok(self.load_classes()?.len())
    }

    pub fn is_empty(&mut self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    /// Handle on `text` within the named class. The word's id and total are
    /// read from the store the first time the word is referenced.
    pub fn word(&mut self, class: &str, text: &str) -> Result<WordHandle<'_, S>, CacheError> {
        self.load_classes()?;
        let Cache {
            store,
            classes,
            words,
        } = self;

        let class_data = classes
            .as_mut()
            .and_then(|classes| classes.get_mut(class))
            .ok_or_else(|| CacheError::UnknownClass(class.to_string()))?;

        let entry = match words.entry(text.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let record = store.lookup_word(text)?;
                entry.insert(WordEntry {
                    id: record.map(|r| r.id),
                    total: record.map(|r| r.total).unwrap_or(0),
                })
            }
        };

        let class_id = class_data.id();
        let count = class_data
            .words
            .entry(text.to_string())
            .or_insert_with(Count::unloaded);

        Ok(WordHandle {
            store: &*store,
            class_id,
            entry: &*entry,
            count,
        })
    }

    pub fn read_setting(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.store.read_setting(key)?)
    }

    /// Write a setting inside the open transaction; `None` deletes it.
    /// The write becomes durable with the next commit.
    pub fn write_setting(&mut self, key: &str, value: Option<&str>) -> Result<(), CacheError> {
        Ok(self.store.write_setting(key, value)?)
    }

    /// Delete a class and its joint counts. Pending changes are committed
    /// first and every cached entity is evicted afterwards.
    pub fn remove_class(&mut self, name: &str) -> Result<(), CacheError> {
        self.commit()?;
        let id = self.class(name)?.id();
        self.store.delete_class(id)?;
        self.store.commit()?;
        tracing::debug!(%id, name, "removed class");
        self.evict();
        Ok(())
    }

    /// Delete a word and its joint counts everywhere. Pending changes are
    /// committed first and every cached entity is evicted afterwards.
    pub fn remove_word(&mut self, text: &str) -> Result<bool, CacheError> {
        self.commit()?;
        let removed = self.store.delete_word(text)?;
        self.store.commit()?;
        self.evict();
        Ok(removed)
    }

    /// Roll back the store transaction and forget every cached entity, so
    /// the next access reads the store again.
    pub fn discard(&mut self) -> Result<(), CacheError> {
        self.evict();
        self.store.rollback()?;
        tracing::debug!("discarded cached changes");
        Ok(())
    }

    pub(crate) fn evict(&mut self) {
        self.classes = None;
        self.words.clear();
    }
}

/// A word seen from one class. Count reads fill from the store lazily;
/// mutations stay pending until the cache commits.
#[derive(Debug)]
pub struct WordHandle<'a, S> {
    store: &'a S,
    class_id: ClassId,
    entry: &'a WordEntry,
    count: &'a mut Count,
}

impl<'a, S: Store> WordHandle<'a, S> {
    /// Store id, `None` until the word has been committed once.
    pub fn id(&self) -> Option<WordId> {
        self.entry.id
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    /// Count in this class, pending mutations included.
    pub fn count(&mut self) -> Result<u64, CacheError> {
        if let Some(value) = self.count.value() {
            return Ok(value);
        }
        let stored = match self.entry.id {
            Some(id) => self.store.joint_count(id, self.class_id)?,
            None => 0,
        };
        self.count.fill(stored);
        Ok(self.count.value().unwrap_or(stored))
    }

    /// Committed total across all classes.
    pub fn total(&self) -> u64 {
        self.entry.total
    }

    pub fn pending(&self) -> Option<Pending> {
        self.count.pending()
    }

    pub fn is_dirty(&self) -> bool {
        self.count.is_dirty()
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
}
