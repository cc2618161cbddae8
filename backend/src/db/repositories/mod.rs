//! Repository implementations module.
//!
//! - `local`: In-memory implementation with JSON snapshot persistence, used by
//!   tests, local development and the command-line tool
pub mod local;

pub use local::{LocalRepository, Snapshot};
