//! Storage layer for the pulsar observation database.
//!
//! The query engine talks to storage through the repository traits only, so
//! stores can be swapped without touching compilation or execution.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Collections façade (services) - post / get              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Query engine (query) - resolve, compile, execute        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository) - primitive predicates   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────────────────┐
//!     │   Local repository (in-memory, JSON snapshot) │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! - `repository`: trait definitions and the storage error taxonomy
//! - `repositories::local`: in-memory implementation
//! - `factory`: creating repository instances from type, environment or config
//! - `repo_config`: `pulsardb.toml` parsing

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::{LocalRepository, Snapshot};
pub use repository::{
    CatalogRepository, ErrorContext, FullRepository, ObservationRepository, RepositoryError,
    RepositoryResult,
};
