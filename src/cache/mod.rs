pub mod cache;
pub mod class;
pub mod commit;
pub mod count;

pub use cache::{Cache, CacheError, WordHandle};
pub use class::Class;
pub use commit::CommitSummary;
pub use count::{Count, Pending};
