use std::collections::{BTreeMap, HashMap};

use crate::cache::cache::{Cache, CacheError};
use crate::cache::class::{Class, WordEntry};
use crate::cache::count::Count;
use crate::store::{Store, StoreError};
use crate::types::identifiers::WordId;

/// What a successful commit wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub classes_written: usize,
    pub counts_written: usize,
    pub words_created: usize,
}

/// Word state that only becomes true once the store transaction commits.
#[derive(Debug, Default)]
struct Staged {
    ids: HashMap<String, WordId>,
    totals: BTreeMap<String, u64>,
    summary: CommitSummary,
}

impl<S: Store> Cache<S> {
    /// Write every pending mutation to the store in one transaction.
    ///
    /// Class counts are written before word counts. Word ids, totals and the
    /// pending markers are updated only after the store confirms the commit;
    /// on failure the cache is left exactly as it was, so committing again
    /// writes the same values.
    pub fn commit(&mut self) -> Result<CommitSummary, CacheError> {
        let Cache {
            store,
            classes,
            words,
        } = self;

        let staged = match classes.as_mut() {
            Some(classes) => write_batch(store, classes, words),
            None => Ok(Staged::default()),
        }
        .and_then(|staged| {
            store.commit()?;
            Ok(staged)
        });

        let staged = match staged {
            Ok(staged) => staged,
            Err(err) => {
                tracing::warn!(%err, "commit failed, pending changes kept");
                return Err(err.into());
            }
        };

        if let Some(classes) = classes.as_mut() {
            for class in classes.values_mut() {
                settle(class.document_count_mut());
                class.words.values_mut().for_each(settle);
            }
        }

        for (text, id) in staged.ids {
            words.entry(text).or_default().id = Some(id);
        }
        for (text, total) in staged.totals {
            words.entry(text).or_default().total = total;
        }

        tracing::debug!(
            classes = staged.summary.classes_written,
            counts = staged.summary.counts_written,
            created = staged.summary.words_created,
            "committed cached changes"
        );
        Ok(staged.summary)
    }
}

fn settle(count: &mut Count) {
    if !count.is_dirty() {
        return;
    }
    if let Some(value) = count.value() {
        count.mark_committed(value);
    }
}

/// Write all pending changes or none of them. Writes already in the open
/// transaction (settings, earlier batches) survive a failure.
fn write_batch<S: Store>(
    store: &mut S,
    classes: &mut BTreeMap<String, Class>,
    words: &HashMap<String, WordEntry>,
) -> Result<Staged, StoreError> {
    store.savepoint()?;
    match write_pending(store, classes, words) {
        Ok(staged) => {
            store.release_savepoint()?;
            Ok(staged)
        }
        Err(err) => {
            if let Err(undo) = store.rollback_to_savepoint() {
                tracing::warn!(%undo, "could not undo partial batch");
            }
            Err(err)
        }
    }
}

fn write_pending<S: Store>(
    store: &mut S,
    classes: &mut BTreeMap<String, Class>,
    words: &HashMap<String, WordEntry>,
) -> Result<Staged, StoreError> {
    let mut staged = Staged::default();

    for class in classes.values() {
        let count = class.document_count();
        if count.is_dirty() {
            store.update_class_count(class.id(), count.value().unwrap_or(0))?;
            staged.summary.classes_written += 1;
        }
    }

    for class in classes.values_mut() {
        let class_id = class.id();
        for (text, count) in class.words.iter_mut() {
            let Some(pending) = count.pending() else {
                continue;
            };

            let cached = match words.get(text) {
                Some(entry) => *entry,
                None => store
                    .lookup_word(text)?
                    .map(|record| WordEntry {
                        id: Some(record.id),
                        total: record.total,
                    })
                    .unwrap_or_default(),
            };

            // A word without a committed id has no rows in any class yet.
            let prior = match (count.stored(), cached.id) {
                (Some(stored), _) => stored,
                (None, Some(id)) => count.fill(store.joint_count(id, class_id)?),
                (None, None) => count.fill(0),
            };
            let value = pending.apply(prior);

            let id = match cached.id.or_else(|| staged.ids.get(text).copied()) {
                Some(id) => id,
                None => {
                    staged.summary.words_created += 1;
                    store.ensure_word(text)?
                }
            };
            staged.ids.insert(text.clone(), id);

            store.write_joint_count(id, class_id, value)?;
            staged.summary.counts_written += 1;

            let total = staged.totals.entry(text.clone()).or_insert(cached.total);
            *total = total.saturating_add(value).saturating_sub(prior);
        }
    }

    for (text, total) in &staged.totals {
        if let Some(id) = staged.ids.get(text) {
            store.update_word_total(*id, *total)?;
        }
    }

    Ok(staged)
}
