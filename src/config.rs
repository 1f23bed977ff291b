use std::fs;
use std::path::Path;

use bigdecimal::{BigDecimal, One, Zero};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// Key point:
// Serializable
// Comparable
// Explicit defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Fraction of a document's distinct tokens kept as features, in (0, 1].
    pub feature_threshold: BigDecimal,
    /// Lower bound on the number of features kept.
    pub feature_minimum: usize,
    /// Probability imputed to a token with no evidence, in (0, 1].
    pub epsilon: BigDecimal,
    /// Significant digits kept in every score product.
    pub precision: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            feature_threshold: BigDecimal::new(1.into(), 1),
            feature_minimum: 15,
            epsilon: BigDecimal::new(1.into(), 2),
            precision: 28,
        }
    }
}

impl ClassifierConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ClassifierConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |value: &BigDecimal| *value > BigDecimal::zero() && *value <= BigDecimal::one();

        if !unit(&self.feature_threshold) {
            return Err(ConfigError::Invalid(format!(
                "feature_threshold must lie in (0, 1], got {}",
                self.feature_threshold
            )));
        }
        if !unit(&self.epsilon) {
            return Err(ConfigError::Invalid(format!(
                "epsilon must lie in (0, 1], got {}",
                self.epsilon
            )));
        }
        if self.precision == 0 {
            return Err(ConfigError::Invalid("precision must be positive".into()));
        }
        Ok(())
    }
}
