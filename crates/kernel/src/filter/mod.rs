//! Client-side filter state.
//!
//! The filter object, its mutators, the panel controller, and the
//! query-string form used for shareable links.

pub mod controller;
pub mod state;
pub mod types;
pub mod url;

pub use controller::{ActiveFilter, FilterController, SearchTicket, active_filters, active_filters_count};
pub use state::{FilterKey, FilterUpdate};
pub use types::{
    Availability, BodyType, EyeColor, FilterSection, HairColor, Location, PhysicalFilters,
    PriceBounds, ProviderFilters, RangeFilter, SortKey, TriState,
};
