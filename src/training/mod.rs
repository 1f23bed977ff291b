use crate::cache::{Cache, CacheError};
use crate::store::{Store, StoreError};

/// Setting that holds the number of documents in the training set.
pub const DOCUMENT_COUNT_KEY: &str = "document_count";

/// Updates training data through a [`Cache`].
///
/// Word counts and document bookkeeping are committed separately: a failure
/// between the two commits leaves word counts updated and document counts
/// unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trainer;

impl Trainer {
    pub fn new() -> Self {
        Trainer
    }

    /// Add each token's count to the named classes. For a new document the
    /// class document counts and the global document count go up by one.
    pub fn train<S, I, T, C>(
        &self,
        cache: &mut Cache<S>,
        tokens: I,
        classes: &[C],
        is_new: bool,
    ) -> Result<(), CacheError>
    where
        S: Store,
        I: IntoIterator<Item = (T, u64)>,
        T: AsRef<str>,
        C: AsRef<str>,
    {
        let classes = resolve(cache, classes)?;

        for (token, count) in tokens {
            for class in &classes {
                cache.word(class, token.as_ref())?.increment(count);
            }
        }
        cache.commit()?;

        if is_new {
            for class in &classes {
                cache.class_mut(class)?.increment(1);
            }
            self.increment_document_count(cache)?;
            cache.commit()?;
        }
        Ok(())
    }

    /// Take each token's count away from the named classes, never below zero.
    /// With `remove`, the document counts go down by one as well.
    pub fn untrain<S, I, T, C>(
        &self,
        cache: &mut Cache<S>,
        tokens: I,
        classes: &[C],
        remove: bool,
    ) -> Result<(), CacheError>
    where
        S: Store,
        I: IntoIterator<Item = (T, u64)>,
        T: AsRef<str>,
        C: AsRef<str>,
    {
        let classes = resolve(cache, classes)?;

        for (token, count) in tokens {
            for class in &classes {
                cache.word(class, token.as_ref())?.decrement(count);
            }
        }
        cache.commit()?;

        if remove {
            for class in &classes {
                cache.class_mut(class)?.decrement(1);
            }
            self.decrement_document_count(cache)?;
            cache.commit()?;
        }
        Ok(())
    }

    /// Move a document already in the training set from `old` to `new`.
    /// Document counts are left alone.
    pub fn retrain<S, T, C, D>(
        &self,
        cache: &mut Cache<S>,
        tokens: &[(T, u64)],
        old: &[C],
        new: &[D],
    ) -> Result<(), CacheError>
    where
        S: Store,
        T: AsRef<str>,
        C: AsRef<str>,
        D: AsRef<str>,
    {
        let pairs = || tokens.iter().map(|(token, count)| (token.as_ref(), *count));
        self.untrain(cache, pairs(), old, false)?;
        self.train(cache, pairs(), new, false)
    }

    pub fn document_count<S: Store>(&self, cache: &Cache<S>) -> Result<u64, CacheError> {
        match cache.read_setting(DOCUMENT_COUNT_KEY)? {
            None => Ok(0),
            Some(value) => value.trim().parse().map_err(|_| {
                CacheError::Store(StoreError::InvalidSetting {
                    key: DOCUMENT_COUNT_KEY.to_string(),
                    value,
                })
            }),
        }
    }

    pub fn increment_document_count<S: Store>(
        &self,
        cache: &mut Cache<S>,
    ) -> Result<(), CacheError> {
        let count = self.document_count(cache)?.saturating_add(1);
        cache.write_setting(DOCUMENT_COUNT_KEY, Some(count.to_string().as_str()))
    }

    pub fn decrement_document_count<S: Store>(
        &self,
        cache: &mut Cache<S>,
    ) -> Result<(), CacheError> {
        let count = self.document_count(cache)?.saturating_sub(1);
        cache.write_setting(DOCUMENT_COUNT_KEY, Some(count.to_string().as_str()))
    }
}

/// Check every class name before anything is mutated; no class is created.
fn resolve<S: Store, C: AsRef<str>>(
    cache: &mut Cache<S>,
    classes: &[C],
) -> Result<Vec<String>, CacheError> {
    classes
        .iter()
        .map(|name| cache.class(name.as_ref()).map(|class| class.name().to_string()))
        .collect()
}
