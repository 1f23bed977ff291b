use classifier_core::store::{SqliteStore, Store, StoreError};
use classifier_core::types::ClassId;
use rusqlite::Connection;
use tempfile::tempdir;

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT tbl_name FROM sqlite_master WHERE type = 'table' ORDER BY tbl_name")
        .unwrap();
    let rows = stmt.query_map([], |row| row.get::<_, String>(0)).unwrap();
    rows.map(Result::unwrap)
        .filter(|name| !name.starts_with("sqlite_"))
        .collect()
}

#[test]
fn new_database_gets_the_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.db");

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.path(), Some(path.as_path()));
    store.close().unwrap();

    let conn = Connection::open(&path).unwrap();
    assert_eq!(table_names(&conn), vec!["Classes", "Data", "Settings", "Words"]);
}

#[test]
fn existing_compatible_database_reopens() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reopen.db");

    let mut store = SqliteStore::open(&path).unwrap();
    store.insert_class(ClassId::first(), "spam").unwrap();
    store.commit().unwrap();
    store.close().unwrap();

    let store = SqliteStore::open(&path).unwrap();
    let classes = store.load_classes().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name, "spam");
    assert_eq!(classes[0].count, 0);
}

#[test]
fn incompatible_database_is_rejected_and_released() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("other.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE Notes (body TEXT);").unwrap();
    }

    match SqliteStore::open(&path) {
        Err(StoreError::IncompatibleStore { tables }) => assert_eq!(tables, vec!["Notes"]),
        other => panic!("expected incompatible store error, got {other:?}"),
    }

    // the rejected connection is closed, so the file is free for writers
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("DROP TABLE Notes;").unwrap();
}

#[test]
fn partial_schema_is_incompatible() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Classes (idNum INTEGER); CREATE TABLE Words (idNum INTEGER);",
        )
        .unwrap();
    }

    assert!(matches!(
        SqliteStore::open(&path),
        Err(StoreError::IncompatibleStore { .. })
    ));
}

#[test]
fn settings_round_trip_and_delete() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.read_setting("document_count").unwrap(), None);

    store.write_setting("document_count", Some("12")).unwrap();
    assert_eq!(store.read_setting("document_count").unwrap().as_deref(), Some("12"));

    store.write_setting("document_count", Some("13")).unwrap();
    assert_eq!(store.read_setting("document_count").unwrap().as_deref(), Some("13"));

    store.write_setting("document_count", None).unwrap();
    assert_eq!(store.read_setting("document_count").unwrap(), None);
}

#[test]
fn zero_joint_count_removes_the_row() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.insert_class(ClassId::first(), "ham").unwrap();
    let word = store.ensure_word("agenda").unwrap();

    store.write_joint_count(word, ClassId::first(), 3).unwrap();
    assert_eq!(store.joint_count(word, ClassId::first()).unwrap(), 3);

    store.write_joint_count(word, ClassId::first(), 0).unwrap();
    assert_eq!(store.joint_count(word, ClassId::first()).unwrap(), 0);
    store.commit().unwrap();
}

#[test]
fn ensure_word_is_idempotent() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let first = store.ensure_word("free").unwrap();
    let second = store.ensure_word("free").unwrap();
    assert_eq!(first, second);

    let record = store.lookup_word("free").unwrap().unwrap();
    assert_eq!(record.id, first);
    assert_eq!(record.total, 0);
    assert!(store.lookup_word("absent").unwrap().is_none());
}

#[test]
fn deleting_a_class_cascades_and_fixes_totals() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let ham = ClassId::first();
    let spam = ham.next();
    store.insert_class(ham, "ham").unwrap();
    store.insert_class(spam, "spam").unwrap();

    let word = store.ensure_word("win").unwrap();
    store.write_joint_count(word, ham, 1).unwrap();
    store.write_joint_count(word, spam, 3).unwrap();
    store.update_word_total(word, 4).unwrap();
    store.commit().unwrap();

    store.delete_class(spam).unwrap();
    store.commit().unwrap();

    assert_eq!(store.class_count(spam).unwrap(), None);
    assert_eq!(store.class_count(ham).unwrap(), Some(0));
    assert_eq!(store.joint_count(word, spam).unwrap(), 0);
    assert_eq!(store.joint_count(word, ham).unwrap(), 1);
    assert_eq!(store.lookup_word("win").unwrap().unwrap().total, 1);
}

#[test]
fn deleting_a_word_cascades() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.insert_class(ClassId::first(), "ham").unwrap();
    let word = store.ensure_word("agenda").unwrap();
    store.write_joint_count(word, ClassId::first(), 2).unwrap();

    assert!(store.delete_word("agenda").unwrap());
    assert!(!store.delete_word("agenda").unwrap());
    assert_eq!(store.joint_count(word, ClassId::first()).unwrap(), 0);
}

#[test]
fn rollback_discards_uncommitted_writes() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.insert_class(ClassId::first(), "ham").unwrap();
    store.commit().unwrap();

    store.update_class_count(ClassId::first(), 9).unwrap();
    store.write_setting("document_count", Some("9")).unwrap();
    store.rollback().unwrap();

    assert_eq!(store.class_count(ClassId::first()).unwrap(), Some(0));
    assert_eq!(store.read_setting("document_count").unwrap(), None);
    assert_eq!(store.max_class_id().unwrap(), Some(ClassId::first()));
}

#[test]
fn fresh_store_accepts_joint_counts() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let spam = ClassId::first();
    let ham = spam.next();
    store.insert_class(spam, "spam").unwrap();
    store.insert_class(ham, "ham").unwrap();
    let win = store.ensure_word("win").unwrap();

    store.write_joint_count(win, spam, 3).unwrap();
    store.write_joint_count(win, ham, 1).unwrap();
    store.commit().unwrap();

    assert_eq!(store.joint_count(win, spam).unwrap(), 3);
    assert_eq!(store.joint_count(win, ham).unwrap(), 1);
}
