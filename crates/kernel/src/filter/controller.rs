//! Filter panel controller.
//!
//! Owns the filter values, which panel sections are expanded, and a
//! generation counter. Section state is independent of filter values.
//! When catalog price bounds are known, the price range is kept within them.
//!
//! Every filter mutation bumps the generation. A search started under an
//! older generation is stale: its results must not replace newer ones.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::state::{FilterKey, FilterUpdate};
use super::types::{
    BodyType, EyeColor, FilterSection, HairColor, PriceBounds, ProviderFilters, RangeFilter,
};
use super::url;
use crate::catalog::LocationCatalog;
use crate::search::SearchParams;

/// Sections expanded when the panel first opens.
const DEFAULT_EXPANDED: &[FilterSection] = &[FilterSection::Location, FilterSection::Price];

/// One removable chip in the active-filter summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFilter {
    pub key: FilterKey,
    pub label: &'static str,
    pub value: String,
    pub removable: bool,
}

/// Identifies the filter generation a search was started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Stateful owner of one filter panel.
#[derive(Debug, Clone)]
pub struct FilterController {
    filters: ProviderFilters,
    expanded: HashSet<FilterSection>,
    catalog: Arc<LocationCatalog>,
    price_bounds: Option<PriceBounds>,
    generation: u64,
}

impl FilterController {
    /// Fresh panel with no filters.
    pub fn new(catalog: Arc<LocationCatalog>) -> Self {
        Self {
            filters: ProviderFilters::default(),
            expanded: DEFAULT_EXPANDED.iter().copied().collect(),
            catalog,
            price_bounds: None,
            generation: 0,
        }
    }

    /// Keep the price range within catalog-wide bounds from now on.
    ///
    /// The current range is clamped immediately.
    pub fn with_price_bounds(mut self, bounds: Option<PriceBounds>) -> Self {
        self.price_bounds = bounds;
        let current = self.filters.clone();
        self.commit(current);
        self
    }

    pub fn price_bounds(&self) -> Option<PriceBounds> {
        self.price_bounds
    }

    /// Panel restored from a shared link.
    pub fn from_query_string(catalog: Arc<LocationCatalog>, query: &str) -> Self {
        let mut controller = Self::new(catalog);
        controller.replace(url::from_query_string(query));
        controller
    }

    pub fn filters(&self) -> &ProviderFilters {
        &self.filters
    }

    /// Replace the whole filter object.
    ///
    /// A district outside the selected city is dropped.
    pub fn replace(&mut self, filters: ProviderFilters) {
        let mut filters = filters;
        if let Some(location) = filters.location.as_mut()
            && let Some(district) = location.district.as_deref()
            && !self.catalog.contains(&location.city, district)
        {
            debug!(
                city = %location.city,
                district = %district,
                "dropping district outside selected city"
            );
            location.district = None;
        }
        self.commit(filters);
    }

    /// Apply one field change.
    ///
    /// Unknown districts for the selected city are ignored.
    pub fn apply(&mut self, update: FilterUpdate) {
        if let FilterUpdate::District(Some(district)) = &update {
            let known = self
                .filters
                .city()
                .is_some_and(|city| self.catalog.contains(city, district.trim()));
            if !known {
                debug!(district = %district, city = ?self.filters.city(), "ignoring unknown district");
                return;
            }
        }
        let next = self.filters.update(update);
        self.commit(next);
    }

    pub fn remove(&mut self, key: FilterKey) {
        let next = self.filters.remove(key);
        self.commit(next);
    }

    pub fn toggle_hair_color(&mut self, value: HairColor) {
        let next = self.filters.toggle_hair_color(value);
        self.commit(next);
    }

    pub fn toggle_eye_color(&mut self, value: EyeColor) {
        let next = self.filters.toggle_eye_color(value);
        self.commit(next);
    }

    pub fn toggle_body_type(&mut self, value: BodyType) {
        let next = self.filters.toggle_body_type(value);
        self.commit(next);
    }

    pub fn toggle_service(&mut self, value: &str) {
        let next = self.filters.toggle_service(value);
        self.commit(next);
    }

    /// Reset every filter. Expanded sections are kept.
    pub fn clear(&mut self) {
        self.commit(ProviderFilters::default());
    }

    fn commit(&mut self, mut next: ProviderFilters) {
        if let (Some(bounds), Some(range)) = (self.price_bounds, next.price_range) {
            next.price_range = Some(range.clamp_to(bounds));
        }
        if next != self.filters {
            self.filters = next;
            self.generation += 1;
        }
    }

    // ---------------------------------------------------------------------
    // Sections
    // ---------------------------------------------------------------------

    pub fn toggle_section(&mut self, section: FilterSection) {
        if !self.expanded.remove(&section) {
            self.expanded.insert(section);
        }
    }

    pub fn is_expanded(&self, section: FilterSection) -> bool {
        self.expanded.contains(&section)
    }

    /// Expanded sections in display order.
    pub fn expanded_sections(&self) -> Vec<FilterSection> {
        FilterSection::ALL
            .iter()
            .copied()
            .filter(|s| self.expanded.contains(s))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Summary
    // ---------------------------------------------------------------------

    pub fn active_filters_count(&self) -> usize {
        active_filters_count(&self.filters)
    }

    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        active_filters(&self.filters)
    }

    // ---------------------------------------------------------------------
    // Search hand-off
    // ---------------------------------------------------------------------

    /// Ticket for a search about to be issued with the current filters.
    pub fn ticket(&self) -> SearchTicket {
        SearchTicket(self.generation)
    }

    /// Whether results for `ticket` still reflect the current filters.
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.generation
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams::from(&self.filters)
    }

    pub fn to_query_string(&self) -> String {
        url::to_query_string(&self.filters)
    }
}

/// Number of independently set top-level concerns.
///
/// Physical attributes count once however many are set; so do the
/// availability flags. Free text is not a filter concern.
pub fn active_filters_count(filters: &ProviderFilters) -> usize {
    [
        filters.city().is_some(),
        filters.district().is_some(),
        filters.price_range.is_some(),
        filters.is_vip.is_set(),
        filters.is_verified.is_set(),
        !filters.physical.is_empty(),
        filters.services.is_some(),
        filters.availability.any_set(),
        filters.sort_by.is_some(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count()
}

/// Chip summary. Only location, price and status flags are surfaced.
pub fn active_filters(filters: &ProviderFilters) -> Vec<ActiveFilter> {
    let mut chips = Vec::new();

    if let Some(city) = filters.city() {
        chips.push(chip(FilterKey::City, "City", city.to_string()));
    }
    if let Some(district) = filters.district() {
        chips.push(chip(FilterKey::District, "District", district.to_string()));
    }
    if let Some(range) = filters.price_range {
        chips.push(chip(FilterKey::PriceRange, "Price", format_range(range)));
    }
    if let Some(value) = filters.is_vip.as_bool() {
        chips.push(chip(FilterKey::IsVip, "VIP", yes_no(value)));
    }
    if let Some(value) = filters.is_verified.as_bool() {
        chips.push(chip(FilterKey::IsVerified, "Verified", yes_no(value)));
    }

    chips
}

fn chip(key: FilterKey, label: &'static str, value: String) -> ActiveFilter {
    ActiveFilter {
        key,
        label,
        value,
        removable: true,
    }
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

fn format_range(range: RangeFilter) -> String {
    match (range.min, range.max) {
        (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
        (Some(lo), None) => format!("from {lo}"),
        (None, Some(hi)) => format!("up to {hi}"),
        (None, None) => String::new(),
    }
}
