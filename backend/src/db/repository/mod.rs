//! Repository traits: the storage seam the query engine talks to.
//!
//! Stores execute primitive [`Predicate`](crate::query::Predicate) clauses
//! (membership, range, overlap, substring) and insert one record at a time.
//! Uniqueness of names and aliases is the store's job and must be checked and
//! applied atomically.

pub mod catalog;
pub mod error;
pub mod observation;

pub use catalog::CatalogRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use observation::ObservationRepository;

/// Everything the collection façade needs from a store.
pub trait FullRepository: CatalogRepository + ObservationRepository {}

impl<T> FullRepository for T where T: CatalogRepository + ObservationRepository {}
