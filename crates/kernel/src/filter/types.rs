//! Filter state types.
//!
//! `ProviderFilters` is the client-held filter object. Absent fields mean
//! "no constraint". Multi-select fields are `None` rather than empty.

use serde::{Deserialize, Serialize};

/// A flag whose absence is distinct from both requiring and excluding it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    #[default]
    Unset,
    Require,
    Exclude,
}

impl TriState {
    /// Checkbox semantics: checked requires, unchecked removes the constraint.
    ///
    /// An unchecked box never means "exclude".
    pub fn from_toggle(on: bool) -> Self {
        if on { Self::Require } else { Self::Unset }
    }

    /// Parse a query-string flag. `true`/`1` require, `false`/`0` exclude.
    pub fn from_param(value: &str) -> Option<Self> {
        parse_bool(value).map(|b| if b { Self::Require } else { Self::Exclude })
    }

    /// Query-string form; `None` when unset.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Unset => None,
            Self::Require => Some("true"),
            Self::Exclude => Some("false"),
        }
    }

    /// Nullable-boolean form used by the search entry point.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::Require => Some(true),
            Self::Exclude => Some(false),
        }
    }

    pub fn is_set(self) -> bool {
        self != Self::Unset
    }
}

/// Lenient boolean parsing shared by query-string readers.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Implements the string form shared by all fixed-choice filter enums.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every choice, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Parse the wire form; unknown values yield `None`.
            pub fn parse(value: &str) -> Option<Self> {
                match value.trim() {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    /// Hair colour choices.
    pub enum HairColor {
        Blonde => "blonde",
        Brunette => "brunette",
        Black => "black",
        Red => "red",
        Auburn => "auburn",
        Grey => "grey",
        Colored => "colored",
    }
}

choice_enum! {
    /// Eye colour choices.
    pub enum EyeColor {
        Blue => "blue",
        Green => "green",
        Brown => "brown",
        Hazel => "hazel",
        Grey => "grey",
        Black => "black",
    }
}

choice_enum! {
    /// Body type choices.
    pub enum BodyType {
        Petite => "petite",
        Slim => "slim",
        Athletic => "athletic",
        Average => "average",
        Curvy => "curvy",
        Plus => "plus",
    }
}

choice_enum! {
    /// Secondary sort keys. VIP-first ordering always applies before these.
    pub enum SortKey {
        Newest => "newest",
        PriceAsc => "price_asc",
        PriceDesc => "price_desc",
        AgeAsc => "age_asc",
        AgeDesc => "age_desc",
        Verified => "verified",
    }
}

choice_enum! {
    /// Collapsible sections of the filter panel.
    pub enum FilterSection {
        Location => "location",
        Price => "price",
        Status => "status",
        Physical => "physical",
        Services => "services",
    }
}

/// City plus optional district.
///
/// A district cannot exist without its city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

impl Location {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            district: None,
        }
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }
}

/// Inclusive numeric range with independent optional bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}

impl RangeFilter {
    /// Build a normalised range: inverted bounds are swapped and a range
    /// with neither bound collapses to `None`.
    pub fn new(min: Option<i32>, max: Option<i32>) -> Option<Self> {
        match (min, max) {
            (None, None) => None,
            (Some(lo), Some(hi)) if lo > hi => Some(Self {
                min: Some(hi),
                max: Some(lo),
            }),
            _ => Some(Self { min, max }),
        }
    }

    /// Clamp both bounds into the catalog-wide price bounds.
    ///
    /// Inverted `bounds` are read in ascending order.
    pub fn clamp_to(self, bounds: PriceBounds) -> Self {
        let (lo, hi) = if bounds.min <= bounds.max {
            (bounds.min, bounds.max)
        } else {
            (bounds.max, bounds.min)
        };
        let clamp = |v: i32| v.clamp(lo, hi);
        Self {
            min: self.min.map(clamp),
            max: self.max.map(clamp),
        }
    }
}

/// Catalog-wide minimum and maximum hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: i32,
    pub max: i32,
}

impl PriceBounds {
    /// The full range as a filter value (a slider at rest).
    pub fn full_range(self) -> RangeFilter {
        RangeFilter {
            min: Some(self.min),
            max: Some(self.max),
        }
    }
}

/// Physical attribute filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<RangeFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hair_color: Option<Vec<HairColor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<Vec<EyeColor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<Vec<BodyType>>,
}

impl PhysicalFilters {
    pub fn is_empty(&self) -> bool {
        self.age_range.is_none()
            && self.hair_color.is_none()
            && self.eye_color.is_none()
            && self.body_type.is_none()
    }
}

/// Availability flags. Each one is independent and unset by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default)]
    pub available_today: TriState,
    #[serde(default)]
    pub incall: TriState,
    #[serde(default)]
    pub outcall: TriState,
}

impl Availability {
    pub fn any_set(&self) -> bool {
        self.available_today.is_set() || self.incall.is_set() || self.outcall.is_set()
    }
}

/// The complete filter object for a directory search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<RangeFilter>,

    #[serde(default)]
    pub physical: PhysicalFilters,

    /// Selected service identifiers. `None` means no constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,

    #[serde(default)]
    pub availability: Availability,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,

    #[serde(default)]
    pub is_vip: TriState,

    #[serde(default)]
    pub is_verified: TriState,

    /// Free-text term matched against display name and bio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ProviderFilters {
    pub fn city(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.city.as_str())
    }

    pub fn district(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.district.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tri_state_toggle_never_excludes() {
        assert_eq!(TriState::from_toggle(true), TriState::Require);
        assert_eq!(TriState::from_toggle(false), TriState::Unset);
    }

    #[test]
    fn tri_state_params() {
        assert_eq!(TriState::from_param("true"), Some(TriState::Require));
        assert_eq!(TriState::from_param("0"), Some(TriState::Exclude));
        assert_eq!(TriState::from_param("maybe"), None);
        assert_eq!(TriState::Unset.as_param(), None);
        assert_eq!(TriState::Exclude.as_bool(), Some(false));
    }

    #[test]
    fn choice_parse_and_display() {
        assert_eq!(HairColor::parse("red"), Some(HairColor::Red));
        assert_eq!(HairColor::parse("purple"), None);
        assert_eq!(SortKey::PriceDesc.to_string(), "price_desc");
        assert_eq!(BodyType::ALL.len(), 6);
    }

    #[test]
    fn choice_serde_matches_wire_form() {
        let json = serde_json::to_string(&SortKey::AgeAsc).unwrap();
        assert_eq!(json, "\"age_asc\"");
        let parsed: EyeColor = serde_json::from_str("\"hazel\"").unwrap();
        assert_eq!(parsed, EyeColor::Hazel);
    }

    #[test]
    fn range_normalises() {
        assert_eq!(RangeFilter::new(None, None), None);
        assert_eq!(
            RangeFilter::new(Some(300), Some(100)),
            Some(RangeFilter {
                min: Some(100),
                max: Some(300)
            })
        );
        assert_eq!(
            RangeFilter::new(None, Some(50)),
            Some(RangeFilter {
                min: None,
                max: Some(50)
            })
        );
    }

    #[test]
    fn range_clamps_to_bounds() {
        let bounds = PriceBounds { min: 80, max: 500 };
        let range = RangeFilter::new(Some(20), Some(900)).unwrap().clamp_to(bounds);
        assert_eq!(range, bounds.full_range());
    }

    #[test]
    fn clamp_accepts_inverted_bounds() {
        let inverted = PriceBounds { min: 500, max: 80 };
        let range = RangeFilter::new(Some(20), Some(300)).unwrap().clamp_to(inverted);
        assert_eq!(
            range,
            RangeFilter {
                min: Some(80),
                max: Some(300)
            }
        );
    }

    #[test]
    fn default_filters_are_unconstrained() {
        let filters = ProviderFilters::default();
        assert!(filters.physical.is_empty());
        assert!(!filters.availability.any_set());
        assert_eq!(filters.city(), None);
        assert_eq!(filters.district(), None);
    }
}
