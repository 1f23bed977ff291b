pub mod identifiers;

pub use identifiers::{ClassId, WordId};
