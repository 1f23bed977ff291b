use std::collections::BTreeSet;

/// Tables a compatible database holds, no more and no less.
pub const TABLES: [&str; 4] = ["Classes", "Data", "Settings", "Words"];

pub const SCHEMA: &str = "
CREATE TABLE Classes (
  idNum    INTEGER NOT NULL,
  name     VARCHAR(64) NOT NULL,
  count    INTEGER NOT NULL DEFAULT 0
           CHECK (count >= 0),
  PRIMARY KEY (idNum, name)
);
CREATE TABLE Words (
  idNum    INTEGER PRIMARY KEY AUTOINCREMENT,
  word     VARCHAR(255) UNIQUE NOT NULL,
  total    INTEGER NOT NULL DEFAULT 0
           CHECK (total >= 0)
);
CREATE TABLE Data (
  wordID   INTEGER REFERENCES Words(idNum),
  classID  INTEGER,
  count    INTEGER NOT NULL DEFAULT 1
           CHECK (count > 0),
  PRIMARY KEY (wordID, classID)
);
CREATE TABLE Settings (
  name     VARCHAR(255) PRIMARY KEY,
  value    VARCHAR(255) NULL
);
CREATE TRIGGER WordDrop
AFTER DELETE ON Words
FOR EACH ROW
BEGIN
  DELETE FROM Data WHERE wordID = OLD.idNum;
END;
CREATE TRIGGER ClassDrop
AFTER DELETE ON Classes
FOR EACH ROW
BEGIN
  DELETE FROM Data WHERE classID = OLD.idNum;
END;
";

/// What opening a database found, judged by its user table names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaState {
    Empty,
    Compatible,
    Incompatible(Vec<String>),
}

/// Classify a database by its table names. Internal `sqlite_*` tables are ignored.
pub fn inspect<I, T>(table_names: I) -> SchemaState
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let found: BTreeSet<String> = table_names
        .into_iter()
        .map(Into::into)
        .filter(|name| !name.starts_with("sqlite_"))
        .collect();

    if found.is_empty() {
        return SchemaState::Empty;
    }

    let expected: BTreeSet<String> = TABLES.iter().map(|t| t.to_string()).collect();
    if found == expected {
        SchemaState::Compatible
    } else {
        SchemaState::Incompatible(found.into_iter().collect())
    }
}
