//! Query/filter resolution engine.
//!
//! Raw parameters flow through the normalizers and the alias resolver into the
//! filter compiler, which emits one predicate per parameter. The executor
//! pushes those predicates to the store, re-checks the rows and applies the
//! stable sort, producing a [`RecordSet`].
//!
//! ```text
//! Params ─► FilterCompiler ─► CompiledQuery ─► QueryExecutor ─► RecordSet
//!              │      ▲
//!              ▼      │
//!           AliasResolver ◄─► repository
//! ```

pub mod compile;
pub mod exec;
pub mod params;
pub mod predicate;
pub mod record;
pub mod record_set;
pub mod resolver;
pub mod sort;
pub mod vocabulary;

pub use compile::{CompiledQuery, FilterCompiler};
pub use exec::QueryExecutor;
pub use params::{ParamValue, Params};
pub use predicate::{matches_all, Predicate};
pub use record::{Field, FieldValue, Record};
pub use record_set::RecordSet;
pub use resolver::{AliasResolver, ResolveMode};
pub use sort::SortSpec;
pub use vocabulary::{Bound, MatchMode, ParamSpec};
