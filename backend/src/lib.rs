//! # PulsarDB Rust Backend
//!
//! Query and filter resolution engine for a shared database of radio-pulsar
//! observation metadata: which telescope observed which pulsar, at what
//! frequency, backend and receiver, during what time window, under which project.
//!
//! The crate answers two questions quickly:
//!
//! - "who else observed pulsar X during period P?"
//! - "what data might be affected given an anomaly at telescope/backend Y during period P?"
//!
//! ## Architecture
//!
//! ```text
//! raw parameters ──► models (time/frequency normalization)
//!                └─► query::resolver (name / alias resolution)
//!                        │
//!                        ▼
//!                 query::compile (predicates + sort)
//!                        │
//!                        ▼
//!                 query::exec (storage pushdown, stable sort) ──► format
//! ```
//!
//! - [`models`]: Domain types (pulsars, telescopes, observations) and the unit/time normalizer
//! - [`query`]: Parameter vocabulary, alias resolver, filter compiler and query executor
//! - [`db`]: Repository traits, the in-memory store, configuration and factory
//! - [`auth`]: API key validation for mutating operations
//! - [`format`]: Output renderers (JSON, plain-text table, column frame)
//! - [`services`]: The `Pulsars` / `Telescopes` / `Observations` collection façade

// RepositoryError carries rich context; keep it by value in results.
#![allow(clippy::result_large_err)]

pub mod auth;
pub mod db;
pub mod error;
pub mod format;
pub mod models;
pub mod query;
pub mod services;

pub use error::{PulsarDbError, PulsarDbResult};
pub use services::{Observations, PulsarDb, Pulsars, Telescopes};
