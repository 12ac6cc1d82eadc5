//! Filter mutators.
//!
//! Every operation takes the current filter object and returns the complete
//! next one. None of them can fail; values are not validated here.

use serde::Serialize;

use super::types::{
    BodyType, EyeColor, HairColor, Location, ProviderFilters, RangeFilter, SortKey, TriState,
};

/// Top-level filter fields, as addressed by removal and the chip summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    City,
    District,
    PriceRange,
    AgeRange,
    HairColor,
    EyeColor,
    BodyType,
    Services,
    AvailableToday,
    Incall,
    Outcall,
    SortBy,
    IsVip,
    IsVerified,
    Search,
}

/// A single-field replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    /// Selecting a city always clears the district.
    City(Option<String>),
    /// Ignored while no city is selected.
    District(Option<String>),
    PriceRange(Option<RangeFilter>),
    AgeRange(Option<RangeFilter>),
    HairColor(Option<Vec<HairColor>>),
    EyeColor(Option<Vec<EyeColor>>),
    BodyType(Option<Vec<BodyType>>),
    Services(Option<Vec<String>>),
    AvailableToday(bool),
    Incall(bool),
    Outcall(bool),
    SortBy(Option<SortKey>),
    IsVip(bool),
    IsVerified(bool),
    Search(Option<String>),
}

impl FilterUpdate {
    pub fn key(&self) -> FilterKey {
        match self {
            Self::City(_) => FilterKey::City,
            Self::District(_) => FilterKey::District,
            Self::PriceRange(_) => FilterKey::PriceRange,
            Self::AgeRange(_) => FilterKey::AgeRange,
            Self::HairColor(_) => FilterKey::HairColor,
            Self::EyeColor(_) => FilterKey::EyeColor,
            Self::BodyType(_) => FilterKey::BodyType,
            Self::Services(_) => FilterKey::Services,
            Self::AvailableToday(_) => FilterKey::AvailableToday,
            Self::Incall(_) => FilterKey::Incall,
            Self::Outcall(_) => FilterKey::Outcall,
            Self::SortBy(_) => FilterKey::SortBy,
            Self::IsVip(_) => FilterKey::IsVip,
            Self::IsVerified(_) => FilterKey::IsVerified,
            Self::Search(_) => FilterKey::Search,
        }
    }
}

impl ProviderFilters {
    /// Replace one field in a copy of the filters.
    pub fn update(&self, update: FilterUpdate) -> Self {
        let mut next = self.clone();
        match update {
            FilterUpdate::City(city) => {
                next.location = city
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .map(Location::city);
            }
            FilterUpdate::District(district) => {
                if let Some(location) = next.location.as_mut() {
                    location.district = district
                        .map(|d| d.trim().to_string())
                        .filter(|d| !d.is_empty());
                }
            }
            FilterUpdate::PriceRange(range) => {
                next.price_range = range.and_then(|r| RangeFilter::new(r.min, r.max));
            }
            FilterUpdate::AgeRange(range) => {
                next.physical.age_range = range.and_then(|r| RangeFilter::new(r.min, r.max));
            }
            FilterUpdate::HairColor(values) => next.physical.hair_color = normalize_set(values),
            FilterUpdate::EyeColor(values) => next.physical.eye_color = normalize_set(values),
            FilterUpdate::BodyType(values) => next.physical.body_type = normalize_set(values),
            FilterUpdate::Services(values) => {
                next.services = normalize_set(values.map(|v| {
                    v.into_iter()
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                }));
            }
            FilterUpdate::AvailableToday(on) => {
                next.availability.available_today = TriState::from_toggle(on);
            }
            FilterUpdate::Incall(on) => next.availability.incall = TriState::from_toggle(on),
            FilterUpdate::Outcall(on) => next.availability.outcall = TriState::from_toggle(on),
            FilterUpdate::SortBy(key) => next.sort_by = key,
            FilterUpdate::IsVip(on) => next.is_vip = TriState::from_toggle(on),
            FilterUpdate::IsVerified(on) => next.is_verified = TriState::from_toggle(on),
            FilterUpdate::Search(term) => {
                next.search = term
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty());
            }
        }
        next
    }

    /// Clear one field in a copy of the filters.
    ///
    /// Removing the city removes the district with it.
    pub fn remove(&self, key: FilterKey) -> Self {
        let mut next = self.clone();
        match key {
            FilterKey::City => next.location = None,
            FilterKey::District => {
                if let Some(location) = next.location.as_mut() {
                    location.district = None;
                }
            }
            FilterKey::PriceRange => next.price_range = None,
            FilterKey::AgeRange => next.physical.age_range = None,
            FilterKey::HairColor => next.physical.hair_color = None,
            FilterKey::EyeColor => next.physical.eye_color = None,
            FilterKey::BodyType => next.physical.body_type = None,
            FilterKey::Services => next.services = None,
            FilterKey::AvailableToday => next.availability.available_today = TriState::Unset,
            FilterKey::Incall => next.availability.incall = TriState::Unset,
            FilterKey::Outcall => next.availability.outcall = TriState::Unset,
            FilterKey::SortBy => next.sort_by = None,
            FilterKey::IsVip => next.is_vip = TriState::Unset,
            FilterKey::IsVerified => next.is_verified = TriState::Unset,
            FilterKey::Search => next.search = None,
        }
        next
    }

    pub fn toggle_hair_color(&self, value: HairColor) -> Self {
        let mut next = self.clone();
        next.physical.hair_color = toggle(next.physical.hair_color.take(), value);
        next
    }

    pub fn toggle_eye_color(&self, value: EyeColor) -> Self {
        let mut next = self.clone();
        next.physical.eye_color = toggle(next.physical.eye_color.take(), value);
        next
    }

    pub fn toggle_body_type(&self, value: BodyType) -> Self {
        let mut next = self.clone();
        next.physical.body_type = toggle(next.physical.body_type.take(), value);
        next
    }

    /// Surrounding whitespace is ignored; a blank value changes nothing.
    pub fn toggle_service(&self, value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.services = toggle(next.services.take(), value.to_string());
        next
    }
}

/// Remove `value` if present, append it otherwise. Empty collapses to `None`.
fn toggle<T: PartialEq>(current: Option<Vec<T>>, value: T) -> Option<Vec<T>> {
    let mut values = current.unwrap_or_default();
    match values.iter().position(|v| *v == value) {
        Some(pos) => {
            values.remove(pos);
        }
        None => values.push(value),
    }
    if values.is_empty() { None } else { Some(values) }
}

/// Drop duplicates (first occurrence wins) and collapse empty to `None`.
fn normalize_set<T: PartialEq>(values: Option<Vec<T>>) -> Option<Vec<T>> {
    let mut out: Vec<T> = Vec::new();
    for v in values.unwrap_or_default() {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    if out.is_empty() { None } else { Some(out) }
}
