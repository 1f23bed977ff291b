use bigdecimal::{BigDecimal, One, Zero};

use crate::cache::{Cache, CacheError};
use crate::classify::features;
use crate::config::ClassifierConfig;
use crate::store::Store;

/// A classification strategy: how evidence moves one class's score.
pub trait Scorer {
    /// Starting score shared by all `classes` classes.
    fn prior(&self, classes: usize) -> BigDecimal {
        BigDecimal::one() / BigDecimal::from(classes as u64)
    }

    /// Fold `tokens` (distinct, in input order) into `score` for `class`.
    fn score_class<S: Store>(
        &self,
        cache: &mut Cache<S>,
        class: &str,
        tokens: &[String],
        prior: &BigDecimal,
        score: &mut BigDecimal,
    ) -> Result<(), CacheError>;
}

/// Multiplies in the relative frequency of the most interesting tokens.
///
/// A token is more interesting the further its frequency in a class lies
/// from the uniform prior. Tokens never seen in training get epsilon.
#[derive(Debug, Clone, Default)]
pub struct HmmScorer {
    config: ClassifierConfig,
}

impl HmmScorer {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    fn frequency(&self, count: u64, total: u64) -> BigDecimal {
        if total == 0 {
            return self.config.epsilon.clone();
        }
        (BigDecimal::from(count) / BigDecimal::from(total)).with_prec(self.config.precision)
    }
}

impl Scorer for HmmScorer {
    fn prior(&self, classes: usize) -> BigDecimal {
        (BigDecimal::one() / BigDecimal::from(classes as u64)).with_prec(self.config.precision)
    }

    fn score_class<S: Store>(
        &self,
        cache: &mut Cache<S>,
        class: &str,
        tokens: &[String],
        prior: &BigDecimal,
        score: &mut BigDecimal,
    ) -> Result<(), CacheError> {
        let mut frequencies = Vec::with_capacity(tokens.len());
        for token in tokens {
            let mut word = cache.word(class, token)?;
            let count = word.count()?;
            frequencies.push(self.frequency(count, word.total()));
        }

        let keep = features::select(
            &frequencies,
            prior,
            &self.config.feature_threshold,
            self.config.feature_minimum,
        );
        tracing::trace!(class, tokens = tokens.len(), kept = keep.len(), "scored class");

        for index in keep {
            // a word seen elsewhere but never in this class
            let factor = if frequencies[index].is_zero() {
                &self.config.epsilon
            } else {
                &frequencies[index]
            };
            *score = (&*score * factor).with_prec(self.config.precision);
        }
        Ok(())
    }
}
