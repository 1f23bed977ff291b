pub mod features;
pub mod scores;
pub mod scoring;

use std::collections::{BTreeMap, HashSet};

use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::cache::{Cache, CacheError};
use crate::config::ClassifierConfig;
use crate::store::Store;

pub use scores::Scores;
pub use scoring::{HmmScorer, Scorer};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("No classification classes are defined")]
    EmptyClassSet,
    #[error("No maximal score in an empty result")]
    EmptyResult,
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Scores documents against every class in a cache.
///
/// Each run is a [`Classification`]: created by [`start`](Self::start), fed
/// with [`Classification::update`] as often as needed, and consumed by
/// [`Classification::finish`].
#[derive(Debug, Clone)]
pub struct ClassificationEngine<M = HmmScorer> {
    scorer: M,
}

impl Default for ClassificationEngine<HmmScorer> {
    fn default() -> Self {
        Self {
            scorer: HmmScorer::default(),
        }
    }
}

impl ClassificationEngine<HmmScorer> {
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self::new(HmmScorer::new(config))
    }
}

impl<M: Scorer> ClassificationEngine<M> {
    pub fn new(scorer: M) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &M {
        &self.scorer
    }

    /// Begin a run. Every class starts at the uniform prior `1 / N`.
    pub fn start<'c, S: Store>(
        &'c self,
        cache: &'c mut Cache<S>,
    ) -> Result<Classification<'c, S, M>, ClassifyError> {
        let names = cache.class_names()?;
        if names.is_empty() {
            return Err(ClassifyError::EmptyClassSet);
        }

        let prior = self.scorer.prior(names.len());
        let scores = names
            .into_iter()
            .map(|name| (name, prior.clone()))
            .collect();

        Ok(Classification {
            scorer: &self.scorer,
            cache,
            prior,
            scores,
        })
    }

    /// Run a whole classification over one document.
    pub fn classify<S, I, T>(
        &self,
        cache: &mut Cache<S>,
        tokens: I,
    ) -> Result<Scores, ClassifyError>
    where
        S: Store,
        I: IntoIterator<Item = (T, u64)>,
        T: AsRef<str>,
    {
        let mut run = self.start(cache)?;
        run.update(tokens)?;
        Ok(run.finish())
    }
}

/// A classification in progress.
#[derive(Debug)]
pub struct Classification<'c, S, M> {
    scorer: &'c M,
    cache: &'c mut Cache<S>,
    prior: BigDecimal,
    scores: BTreeMap<String, BigDecimal>,
}

impl<'c, S: Store, M: Scorer> Classification<'c, S, M> {
    pub fn prior(&self) -> &BigDecimal {
        &self.prior
    }

    /// Fold more `(token, count)` pairs into every class's score.
    /// Repeated tokens within one call count once; counts are not used.
    pub fn update<I, T>(&mut self, tokens: I) -> Result<(), ClassifyError>
    where
        I: IntoIterator<Item = (T, u64)>,
        T: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|(token, _)| token.as_ref().to_string())
            .filter(|token| seen.insert(token.clone()))
            .collect();

        for (class, score) in self.scores.iter_mut() {
            self.scorer
                .score_class(self.cache, class, &tokens, &self.prior, score)?;
        }
        Ok(())
    }

    /// Close the run and hand back the per-class scores.
    pub fn finish(self) -> Scores {
        Scores::from_iter(self.scores)
    }
}
