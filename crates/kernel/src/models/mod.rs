//! Database models.

pub mod provider;

pub use provider::{NewProvider, ProviderProfile};
