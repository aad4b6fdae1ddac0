use crate::domain::{Direction, Record};
use crate::error::FetchError;

/// Resolves one side of a record's citation relation.
///
/// Implementations are bound to a [`Direction`] when constructed and are called
/// from worker threads only. They must not block the interactive thread and
/// must not mutate the record they are given.
pub trait RelationFetcher: Send + Sync {
    fn direction(&self) -> Direction;
    fn perform_search(&self, record: &Record) -> Result<Vec<Record>, FetchError>;
}
