//! Roster Kernel Library
//!
//! Provider directory search: the filter model used by clients, search
//! parameter handling, query construction, storage, and the HTTP API.
//! The `roster` binary wires these together.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod search;
pub mod state;
