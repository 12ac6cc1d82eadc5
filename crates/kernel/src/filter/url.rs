//! Query-string mirroring of filter state for shareable links.
//!
//! Keys use the same camelCase names as the search endpoint, so a shared
//! link can be handed straight to `GET /api/providers/search`. Multi-select
//! values are comma-joined; repeated keys are also accepted when parsing.

use tracing::debug;
use url::form_urlencoded;

use super::types::{BodyType, EyeColor, HairColor, Location, ProviderFilters, RangeFilter, SortKey, TriState};

/// Serialize filters into an `application/x-www-form-urlencoded` string.
///
/// Unset fields are omitted, so default filters produce an empty string.
pub fn to_query_string(filters: &ProviderFilters) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());

    if let Some(location) = &filters.location {
        out.append_pair("city", &location.city);
        if let Some(district) = &location.district {
            out.append_pair("district", district);
        }
    }
    append_range(&mut out, "minPrice", "maxPrice", filters.price_range);
    append_range(&mut out, "minAge", "maxAge", filters.physical.age_range);
    append_list(&mut out, "hairColor", filters.physical.hair_color.as_deref(), |v| v.as_str());
    append_list(&mut out, "eyeColor", filters.physical.eye_color.as_deref(), |v| v.as_str());
    append_list(&mut out, "bodyType", filters.physical.body_type.as_deref(), |v| v.as_str());
    append_list(&mut out, "services", filters.services.as_deref(), String::as_str);
    append_flag(&mut out, "availableToday", filters.availability.available_today);
    append_flag(&mut out, "incall", filters.availability.incall);
    append_flag(&mut out, "outcall", filters.availability.outcall);
    append_flag(&mut out, "isVip", filters.is_vip);
    append_flag(&mut out, "isVerified", filters.is_verified);
    if let Some(sort) = filters.sort_by {
        out.append_pair("sortBy", sort.as_str());
    }
    if let Some(q) = &filters.search {
        out.append_pair("q", q);
    }

    out.finish()
}

/// Parse filters back from a query string.
///
/// Unknown keys and values are ignored. A district without a city is
/// dropped. A leading `?` is tolerated.
pub fn from_query_string(query: &str) -> ProviderFilters {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut raw = RawFilters::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match &*key {
            "city" => raw.city = Some(value.to_string()),
            "district" => raw.district = Some(value.to_string()),
            "minPrice" => raw.min_price = parse_int(&key, value),
            "maxPrice" => raw.max_price = parse_int(&key, value),
            "minAge" => raw.min_age = parse_int(&key, value),
            "maxAge" => raw.max_age = parse_int(&key, value),
            "hairColor" => push_choices(&mut raw.hair_color, value, HairColor::parse),
            "eyeColor" => push_choices(&mut raw.eye_color, value, EyeColor::parse),
            "bodyType" => push_choices(&mut raw.body_type, value, BodyType::parse),
            "services" => push_choices(&mut raw.services, value, |s| Some(s.to_string())),
            "availableToday" => raw.available_today = parse_flag(&key, value),
            "incall" => raw.incall = parse_flag(&key, value),
            "outcall" => raw.outcall = parse_flag(&key, value),
            "isVip" => raw.is_vip = parse_flag(&key, value),
            "isVerified" => raw.is_verified = parse_flag(&key, value),
            "sortBy" => {
                raw.sort_by = SortKey::parse(value);
                if raw.sort_by.is_none() {
                    debug!(value = %value, "ignoring unknown sort key");
                }
            }
            "q" => raw.search = Some(value.to_string()),
            other => debug!(key = %other, "ignoring unknown filter parameter"),
        }
    }

    raw.into_filters()
}

#[derive(Default)]
struct RawFilters {
    city: Option<String>,
    district: Option<String>,
    min_price: Option<i32>,
    max_price: Option<i32>,
    min_age: Option<i32>,
    max_age: Option<i32>,
    hair_color: Vec<HairColor>,
    eye_color: Vec<EyeColor>,
    body_type: Vec<BodyType>,
    services: Vec<String>,
    available_today: TriState,
    incall: TriState,
    outcall: TriState,
    is_vip: TriState,
    is_verified: TriState,
    sort_by: Option<SortKey>,
    search: Option<String>,
}

impl RawFilters {
    fn into_filters(self) -> ProviderFilters {
        if self.city.is_none() && self.district.is_some() {
            debug!("ignoring district without city");
        }
        let location = self.city.map(|city| Location {
            city,
            district: self.district,
        });

        let mut filters = ProviderFilters {
            location,
            price_range: RangeFilter::new(self.min_price, self.max_price),
            services: non_empty(self.services),
            sort_by: self.sort_by,
            is_vip: self.is_vip,
            is_verified: self.is_verified,
            search: self.search,
            ..Default::default()
        };
        filters.physical.age_range = RangeFilter::new(self.min_age, self.max_age);
        filters.physical.hair_color = non_empty(self.hair_color);
        filters.physical.eye_color = non_empty(self.eye_color);
        filters.physical.body_type = non_empty(self.body_type);
        filters.availability.available_today = self.available_today;
        filters.availability.incall = self.incall;
        filters.availability.outcall = self.outcall;
        filters
    }
}

fn append_range(
    out: &mut form_urlencoded::Serializer<'_, String>,
    min_key: &str,
    max_key: &str,
    range: Option<RangeFilter>,
) {
    let Some(range) = range else { return };
    if let Some(min) = range.min {
        out.append_pair(min_key, &min.to_string());
    }
    if let Some(max) = range.max {
        out.append_pair(max_key, &max.to_string());
    }
}

fn append_list<T>(
    out: &mut form_urlencoded::Serializer<'_, String>,
    key: &str,
    values: Option<&[T]>,
    as_str: impl Fn(&T) -> &str,
) {
    if let Some(values) = values {
        let joined = values.iter().map(as_str).collect::<Vec<_>>().join(",");
        out.append_pair(key, &joined);
    }
}

fn append_flag(out: &mut form_urlencoded::Serializer<'_, String>, key: &str, flag: TriState) {
    if let Some(value) = flag.as_param() {
        out.append_pair(key, value);
    }
}

fn parse_int(key: &str, value: &str) -> Option<i32> {
    let parsed = value.parse().ok();
    if parsed.is_none() {
        debug!(key = %key, value = %value, "ignoring non-numeric filter value");
    }
    parsed
}

fn parse_flag(key: &str, value: &str) -> TriState {
    TriState::from_param(value).unwrap_or_else(|| {
        debug!(key = %key, value = %value, "ignoring non-boolean filter value");
        TriState::Unset
    })
}

/// Split a comma list and append parsed, not-yet-present values.
fn push_choices<T: PartialEq>(target: &mut Vec<T>, value: &str, parse: impl Fn(&str) -> Option<T>) {
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match parse(part) {
            Some(v) if !target.contains(&v) => target.push(v),
            Some(_) => {}
            None => debug!(value = %part, "ignoring unknown filter choice"),
        }
    }
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() { None } else { Some(values) }
}
