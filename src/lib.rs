//! Trainable statistical text classification.
//!
//! `classifier-core` keeps per-class word counts in a SQLite store behind a
//! write-back [`cache::Cache`], trains them with [`training::Trainer`], and
//! scores documents with [`classify::ClassificationEngine`] using
//! arbitrary-precision decimals, so long probability products never
//! underflow.
//!
//! ```no_run
//! use classifier_core::cache::Cache;
//! use classifier_core::classify::ClassificationEngine;
//! use classifier_core::store::SqliteStore;
//! use classifier_core::tokens::aggregate;
//! use classifier_core::training::Trainer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut cache = Cache::new(SqliteStore::open("mail.db")?);
//! cache.ensure_class("spam")?;
//! cache.ensure_class("ham")?;
//!
//! let trainer = Trainer::new();
//! trainer.train(&mut cache, aggregate("win free money".split_whitespace()), &["spam"], true)?;
//! trainer.train(&mut cache, aggregate("meeting agenda".split_whitespace()), &["ham"], true)?;
//!
//! let engine = ClassificationEngine::default();
//! let scores = engine.classify(&mut cache, aggregate("free money".split_whitespace()))?;
//! println!("{}", scores.best()?);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod classify;
pub mod config;
pub mod store;
pub mod tokens;
pub mod training;
pub mod types;

pub use cache::{Cache, CacheError};
pub use classify::{ClassificationEngine, ClassifyError, Scores};
pub use config::{ClassifierConfig, ConfigError};
pub use store::{SqliteStore, Store, StoreError};
pub use training::Trainer;
