use classifier_core::cache::{Cache, CacheError};
use classifier_core::store::{SqliteStore, StoreError};
use classifier_core::tokens::aggregate;
use classifier_core::training::{Trainer, DOCUMENT_COUNT_KEY};

fn cache_with(classes: &[&str]) -> Cache<SqliteStore> {
    let mut cache = Cache::new(SqliteStore::open_in_memory().unwrap());
    for class in classes {
        cache.ensure_class(class).unwrap();
    }
    cache
}

fn pairs(items: &[(&str, u64)]) -> Vec<(String, u64)> {
    items.iter().map(|(t, c)| (t.to_string(), *c)).collect()
}

fn count(cache: &mut Cache<SqliteStore>, class: &str, word: &str) -> u64 {
    cache.word(class, word).unwrap().count().unwrap()
}

fn total(cache: &mut Cache<SqliteStore>, class: &str, word: &str) -> u64 {
    cache.word(class, word).unwrap().total()
}

#[test]
fn training_a_new_document_updates_every_counter() {
    let mut cache = cache_with(&["spam"]);
    let trainer = Trainer::new();

    let doc = aggregate("win free win money win".split_whitespace());
    trainer.train(&mut cache, doc, &["spam"], true).unwrap();

    assert_eq!(count(&mut cache, "spam", "win"), 3);
    assert_eq!(count(&mut cache, "spam", "free"), 1);
    assert_eq!(total(&mut cache, "spam", "money"), 1);
    assert_eq!(cache.class("spam").unwrap().count(), 1);
    assert_eq!(trainer.document_count(&cache).unwrap(), 1);

    // everything reached the store
    cache.discard().unwrap();
    assert_eq!(count(&mut cache, "spam", "win"), 3);
    assert_eq!(cache.class("spam").unwrap().count(), 1);
    assert_eq!(trainer.document_count(&cache).unwrap(), 1);
}

#[test]
fn retraining_an_existing_document_leaves_document_counts() {
    let mut cache = cache_with(&["spam"]);
    let trainer = Trainer::new();

    trainer
        .train(&mut cache, pairs(&[("win", 1)]), &["spam"], false)
        .unwrap();

    assert_eq!(count(&mut cache, "spam", "win"), 1);
    assert_eq!(cache.class("spam").unwrap().count(), 0);
    assert_eq!(trainer.document_count(&cache).unwrap(), 0);
}

#[test]
fn train_then_untrain_restores_previous_state() {
    let mut cache = cache_with(&["ham", "spam"]);
    let trainer = Trainer::new();

    trainer
        .train(&mut cache, pairs(&[("agenda", 2), ("win", 1)]), &["ham"], true)
        .unwrap();
    trainer
        .train(&mut cache, pairs(&[("win", 3), ("free", 2)]), &["spam"], true)
        .unwrap();

    let words = ["agenda", "win", "free", "offer"];
    let snapshot = |cache: &mut Cache<SqliteStore>| {
        let mut state = Vec::new();
        for class in ["ham", "spam"] {
            for word in words {
                state.push(count(cache, class, word));
                state.push(total(cache, class, word));
            }
            state.push(cache.class(class).unwrap().count());
        }
        state.push(Trainer::new().document_count(&*cache).unwrap());
        state
    };
    let before = snapshot(&mut cache);

    let doc = pairs(&[("win", 4), ("offer", 1), ("agenda", 1)]);
    trainer.train(&mut cache, doc.clone(), &["spam"], true).unwrap();
    assert_ne!(snapshot(&mut cache), before);

    trainer.untrain(&mut cache, doc, &["spam"], true).unwrap();
    assert_eq!(snapshot(&mut cache), before);

    cache.discard().unwrap();
    assert_eq!(snapshot(&mut cache), before);
}

#[test]
fn untraining_clamps_at_zero() {
    let mut cache = cache_with(&["ham"]);
    let trainer = Trainer::new();

    trainer
        .train(&mut cache, pairs(&[("agenda", 2)]), &["ham"], false)
        .unwrap();
    trainer
        .untrain(&mut cache, pairs(&[("agenda", 10), ("unseen", 3)]), &["ham"], true)
        .unwrap();

    assert_eq!(count(&mut cache, "ham", "agenda"), 0);
    assert_eq!(total(&mut cache, "ham", "agenda"), 0);
    assert_eq!(count(&mut cache, "ham", "unseen"), 0);
    assert_eq!(cache.class("ham").unwrap().count(), 0);
    assert_eq!(trainer.document_count(&cache).unwrap(), 0);
}

#[test]
fn unknown_class_is_rejected_without_side_effects() {
    let mut cache = cache_with(&["ham"]);
    let trainer = Trainer::new();

    let err = trainer
        .train(&mut cache, pairs(&[("agenda", 1)]), &["ham", "nope"], true)
        .unwrap_err();
    assert!(matches!(err, CacheError::UnknownClass(name) if name == "nope"));

    assert!(!cache.has_class("nope").unwrap());
    assert_eq!(count(&mut cache, "ham", "agenda"), 0);
    assert_eq!(trainer.document_count(&cache).unwrap(), 0);

    let err = trainer
        .untrain(&mut cache, pairs(&[("agenda", 1)]), &["nope"], false)
        .unwrap_err();
    assert!(matches!(err, CacheError::UnknownClass(_)));
}

#[test]
fn retrain_moves_counts_between_classes() {
    let mut cache = cache_with(&["ham", "spam"]);
    let trainer = Trainer::new();
    let doc = pairs(&[("meeting", 2), ("win", 1)]);

    trainer.train(&mut cache, doc.clone(), &["spam"], true).unwrap();
    trainer.retrain(&mut cache, &doc, &["spam"], &["ham"]).unwrap();

    assert_eq!(count(&mut cache, "spam", "meeting"), 0);
    assert_eq!(count(&mut cache, "ham", "meeting"), 2);
    assert_eq!(total(&mut cache, "ham", "meeting"), 2);
    assert_eq!(count(&mut cache, "ham", "win"), 1);

    // the document was already counted
    assert_eq!(cache.class("spam").unwrap().count(), 1);
    assert_eq!(cache.class("ham").unwrap().count(), 0);
    assert_eq!(trainer.document_count(&cache).unwrap(), 1);
}

#[test]
fn training_into_several_classes_counts_each() {
    let mut cache = cache_with(&["ham", "work"]);
    let trainer = Trainer::new();

    trainer
        .train(&mut cache, pairs(&[("agenda", 2)]), &["ham", "work"], true)
        .unwrap();

    assert_eq!(count(&mut cache, "ham", "agenda"), 2);
    assert_eq!(count(&mut cache, "work", "agenda"), 2);
    assert_eq!(total(&mut cache, "ham", "agenda"), 4);
    assert_eq!(cache.class("work").unwrap().count(), 1);
    // one document, however many classes it lands in
    assert_eq!(trainer.document_count(&cache).unwrap(), 1);
}

#[test]
fn document_count_setting_round_trip() {
    let mut cache = cache_with(&[]);
    let trainer = Trainer::new();

    assert_eq!(trainer.document_count(&cache).unwrap(), 0);
    trainer.increment_document_count(&mut cache).unwrap();
    trainer.increment_document_count(&mut cache).unwrap();
    assert_eq!(cache.read_setting(DOCUMENT_COUNT_KEY).unwrap().as_deref(), Some("2"));

    trainer.decrement_document_count(&mut cache).unwrap();
    trainer.decrement_document_count(&mut cache).unwrap();
    trainer.decrement_document_count(&mut cache).unwrap();
    assert_eq!(trainer.document_count(&cache).unwrap(), 0);

    cache.write_setting(DOCUMENT_COUNT_KEY, None).unwrap();
    assert_eq!(trainer.document_count(&cache).unwrap(), 0);
}

#[test]
fn garbage_document_count_is_reported() {
    let mut cache = cache_with(&[]);
    cache.write_setting(DOCUMENT_COUNT_KEY, Some("many")).unwrap();

    let err = Trainer::new().document_count(&cache).unwrap_err();
    assert!(matches!(
        err,
        CacheError::Store(StoreError::InvalidSetting { ref value, .. }) if value == "many"
    ));
}
