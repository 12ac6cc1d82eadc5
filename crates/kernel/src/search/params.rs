//! Search entry-point parameters.
//!
//! Parameters are validated for type only. Values that fail to parse are
//! treated as absent, and ranges are not sanity-checked: `minAge=40&maxAge=20`
//! is accepted and simply matches nothing.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use url::form_urlencoded;

use crate::filter::types::parse_bool;
use crate::filter::{ProviderFilters, SortKey};

/// Default page size.
pub const DEFAULT_LIMIT: u64 = 50;

/// Parameters accepted by the provider search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    /// Free text matched against display name and bio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_weight: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<i32>,

    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub hair_color: Vec<String>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub eye_color: Vec<String>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub skin_tone: Vec<String>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub breast_size: Vec<String>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub body_type: Vec<String>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub ethnicity: Vec<String>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub nationality: Vec<String>,
    /// Every listed service must be offered.
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_vip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_today: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incall: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcall: Option<bool>,
    pub is_active_only: bool,

    #[serde(deserialize_with = "lenient_sort", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,

    pub limit: u64,
    pub offset: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            q: None,
            city: None,
            district: None,
            category: None,
            min_age: None,
            max_age: None,
            min_height: None,
            max_height: None,
            min_weight: None,
            max_weight: None,
            min_price: None,
            max_price: None,
            hair_color: Vec::new(),
            eye_color: Vec::new(),
            skin_tone: Vec::new(),
            breast_size: Vec::new(),
            body_type: Vec::new(),
            ethnicity: Vec::new(),
            nationality: Vec::new(),
            services: Vec::new(),
            is_vip: None,
            is_verified: None,
            available_today: None,
            incall: None,
            outcall: None,
            is_active_only: false,
            sort_by: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl SearchParams {
    /// Parse a raw query string.
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(
            form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned())),
        )
    }

    /// Build from decoded key/value pairs.
    ///
    /// Repeated list keys accumulate; repeated scalar keys keep the last
    /// value. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if value.is_empty() {
                continue;
            }
            match key {
                "q" => params.q = Some(value.to_string()),
                "city" => params.city = Some(value.to_string()),
                "district" => params.district = Some(value.to_string()),
                "category" => params.category = Some(value.to_string()),
                "minAge" => params.min_age = int(key, value),
                "maxAge" => params.max_age = int(key, value),
                "minHeight" => params.min_height = int(key, value),
                "maxHeight" => params.max_height = int(key, value),
                "minWeight" => params.min_weight = int(key, value),
                "maxWeight" => params.max_weight = int(key, value),
                "minPrice" => params.min_price = int(key, value),
                "maxPrice" => params.max_price = int(key, value),
                "hairColor" => extend_list(&mut params.hair_color, value),
                "eyeColor" => extend_list(&mut params.eye_color, value),
                "skinTone" => extend_list(&mut params.skin_tone, value),
                "breastSize" => extend_list(&mut params.breast_size, value),
                "bodyType" => extend_list(&mut params.body_type, value),
                "ethnicity" => extend_list(&mut params.ethnicity, value),
                "nationality" => extend_list(&mut params.nationality, value),
                "services" => extend_list(&mut params.services, value),
                "isVip" => params.is_vip = flag(key, value),
                "isVerified" => params.is_verified = flag(key, value),
                "availableToday" => params.available_today = flag(key, value),
                "incall" => params.incall = flag(key, value),
                "outcall" => params.outcall = flag(key, value),
                "isActiveOnly" => params.is_active_only = flag(key, value).unwrap_or(false),
                "sortBy" => {
                    params.sort_by = SortKey::parse(value);
                    if params.sort_by.is_none() {
                        debug!(value = %value, "ignoring unknown sort key");
                    }
                }
                "limit" => {
                    if let Some(limit) = unsigned(key, value) {
                        params.limit = limit;
                    }
                }
                "offset" => {
                    if let Some(offset) = unsigned(key, value) {
                        params.offset = offset;
                    }
                }
                other => debug!(key = %other, "ignoring unknown search parameter"),
            }
        }
        params
    }

    /// Canonical form: text trimmed, blank text dropped, lists sorted and
    /// de-duplicated. Matching semantics are unchanged.
    pub fn normalized(mut self) -> Self {
        for text in [
            &mut self.q,
            &mut self.city,
            &mut self.district,
            &mut self.category,
        ] {
            *text = text
                .take()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
        }
        for list in [
            &mut self.hair_color,
            &mut self.eye_color,
            &mut self.skin_tone,
            &mut self.breast_size,
            &mut self.body_type,
            &mut self.ethnicity,
            &mut self.nationality,
            &mut self.services,
        ] {
            for v in list.iter_mut() {
                *v = v.trim().to_string();
            }
            list.retain(|v| !v.is_empty());
            list.sort();
            list.dedup();
        }
        self
    }

    /// Stable key identifying this parameter set in the result cache.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&ProviderFilters> for SearchParams {
    /// Directory searches issued from the filter panel only list active
    /// profiles.
    fn from(filters: &ProviderFilters) -> Self {
        let price = filters.price_range;
        let age = filters.physical.age_range;

        Self {
            q: filters.search.clone(),
            city: filters.city().map(str::to_string),
            district: filters.district().map(str::to_string),
            min_price: price.and_then(|r| r.min),
            max_price: price.and_then(|r| r.max),
            min_age: age.and_then(|r| r.min),
            max_age: age.and_then(|r| r.max),
            hair_color: choice_names(filters.physical.hair_color.as_deref(), |v| v.as_str()),
            eye_color: choice_names(filters.physical.eye_color.as_deref(), |v| v.as_str()),
            body_type: choice_names(filters.physical.body_type.as_deref(), |v| v.as_str()),
            services: filters.services.clone().unwrap_or_default(),
            is_vip: filters.is_vip.as_bool(),
            is_verified: filters.is_verified.as_bool(),
            available_today: filters.availability.available_today.as_bool(),
            incall: filters.availability.incall.as_bool(),
            outcall: filters.availability.outcall.as_bool(),
            is_active_only: true,
            sort_by: filters.sort_by,
            ..Default::default()
        }
    }
}

fn choice_names<T>(values: Option<&[T]>, as_str: impl Fn(&T) -> &str) -> Vec<String> {
    values
        .map(|vs| vs.iter().map(|v| as_str(v).to_string()).collect())
        .unwrap_or_default()
}

fn int(key: &str, value: &str) -> Option<i32> {
    let parsed = value.parse().ok();
    if parsed.is_none() {
        debug!(key = %key, value = %value, "treating non-numeric parameter as absent");
    }
    parsed
}

fn unsigned(key: &str, value: &str) -> Option<u64> {
    let parsed = value.parse().ok();
    if parsed.is_none() {
        debug!(key = %key, value = %value, "ignoring invalid pagination parameter");
    }
    parsed
}

fn flag(key: &str, value: &str) -> Option<bool> {
    let parsed = parse_bool(value);
    if parsed.is_none() {
        debug!(key = %key, value = %value, "treating non-boolean parameter as absent");
    }
    parsed
}

fn extend_list(list: &mut Vec<String>, value: &str) {
    list.extend(
        value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    );
}

/// Accept either a single string or an array of strings in JSON bodies.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => {
            let mut list = Vec::new();
            extend_list(&mut list, &value);
            list
        }
        Some(OneOrMany::Many(values)) => values,
    })
}

/// Unknown sort keys in JSON bodies are treated as absent.
fn lenient_sort<'de, D>(deserializer: D) -> Result<Option<SortKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|value| {
        let key = SortKey::parse(value);
        if key.is_none() {
            debug!(value = %value, "ignoring unknown sort key");
        }
        key
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::filter::{FilterUpdate, HairColor, RangeFilter};

    #[test]
    fn defaults() {
        let params = SearchParams::from_query_str("");
        assert_eq!(params.limit, 50);
        assert_eq!(params.offset, 0);
        assert!(!params.is_active_only);
        assert_eq!(params, SearchParams::default());
    }

    #[test]
    fn parses_every_kind_of_parameter() {
        let params = SearchParams::from_query_str(
            "city=Berlin&district=Mitte&minAge=21&maxPrice=300&hairColor=red,black\
             &isVip=true&isVerified=false&isActiveOnly=1&sortBy=price_desc&limit=10&offset=20&q=anna",
        );
        assert_eq!(params.city.as_deref(), Some("Berlin"));
        assert_eq!(params.district.as_deref(), Some("Mitte"));
        assert_eq!(params.min_age, Some(21));
        assert_eq!(params.max_price, Some(300));
        assert_eq!(params.hair_color, vec!["red", "black"]);
        assert_eq!(params.is_vip, Some(true));
        assert_eq!(params.is_verified, Some(false));
        assert!(params.is_active_only);
        assert_eq!(params.sort_by, Some(SortKey::PriceDesc));
        assert_eq!((params.limit, params.offset), (10, 20));
        assert_eq!(params.q.as_deref(), Some("anna"));
    }

    #[test]
    fn malformed_values_are_absent() {
        let params =
            SearchParams::from_query_str("minAge=old&isVip=perhaps&limit=-5&sortBy=random&zzz=1");
        assert_eq!(params.min_age, None);
        assert_eq!(params.is_vip, None);
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.sort_by, None);
    }

    #[test]
    fn inverted_ranges_are_kept_as_given() {
        let params = SearchParams::from_query_str("minPrice=1000&maxPrice=500");
        assert_eq!(params.min_price, Some(1000));
        assert_eq!(params.max_price, Some(500));
    }

    #[test]
    fn repeated_list_keys_accumulate() {
        let params = SearchParams::from_query_str("services=travel&services=massage");
        assert_eq!(params.services, vec!["travel", "massage"]);
    }

    #[test]
    fn json_accepts_string_or_array() {
        let params: SearchParams =
            serde_json::from_str(r#"{"hairColor":"red","services":["a","b"],"sortBy":"nope"}"#)
                .unwrap();
        assert_eq!(params.hair_color, vec!["red"]);
        assert_eq!(params.services, vec!["a", "b"]);
        assert_eq!(params.sort_by, None);
        assert_eq!(params.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn normalized_cache_key_ignores_list_order() {
        let a = SearchParams::from_query_str("services=b,a&city=%20Berlin").normalized();
        let b = SearchParams::from_query_str("services=a,b,a&city=Berlin").normalized();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn bridges_from_filter_state() {
        let filters = ProviderFilters::default()
            .update(FilterUpdate::City(Some("Berlin".into())))
            .update(FilterUpdate::PriceRange(RangeFilter::new(Some(100), None)))
            .update(FilterUpdate::IsVerified(true))
            .toggle_hair_color(HairColor::Auburn);
        let params = SearchParams::from(&filters);

        assert_eq!(params.city.as_deref(), Some("Berlin"));
        assert_eq!(params.min_price, Some(100));
        assert_eq!(params.max_price, None);
        assert_eq!(params.hair_color, vec!["auburn"]);
        assert_eq!(params.is_verified, Some(true));
        assert_eq!(params.is_vip, None);
        assert!(params.is_active_only);
    }
}
