//! Provider search.
//!
//! Parameters become a list of conjunctive predicates plus an ordering,
//! which either the SQL builder or the in-memory store executes.

pub mod dispatch;
pub mod params;
pub mod plan;
pub mod predicate;
pub mod query_builder;
pub mod service;
pub mod store;

pub use dispatch::LatestSearch;
pub use params::SearchParams;
pub use plan::SearchPlan;
pub use predicate::{Column, Op, Predicate, Value};
pub use query_builder::ProviderQueryBuilder;
pub use service::{SearchPage, SearchService};
pub use store::{MemoryProviderStore, PgProviderStore, ProviderStore, StorePage, load_seed_file};
