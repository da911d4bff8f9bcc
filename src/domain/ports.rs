use super::collection::Collections;
use super::errors::DomainError;

/// Owner of all application records.
///
/// Reads see a consistent view. A write either applies completely or, when
/// the closure fails, leaves the records exactly as they were.
pub trait RecordStore: Send + Sync + 'static {
    fn read<T>(
        &self,
        f: impl FnOnce(&Collections) -> Result<T, DomainError>,
    ) -> Result<T, DomainError>;

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<T, DomainError>,
    ) -> Result<T, DomainError>;
}
