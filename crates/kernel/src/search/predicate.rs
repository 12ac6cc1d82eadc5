//! Search predicates.
//!
//! A search is a list of atomic conditions ANDed together. The same list
//! drives both the SQL builder and the in-memory store, so both backends
//! agree on what matches.
//!
//! Comparisons against an absent profile value never match, mirroring SQL
//! `NULL` semantics. Inside an [`Predicate::AnyOf`] that only removes the
//! one branch, never the whole disjunction.

use tracing::debug;

use super::params::SearchParams;
use crate::filter::{BodyType, EyeColor, HairColor};
use crate::models::ProviderProfile;

/// Filterable profile columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    DisplayName,
    Bio,
    City,
    District,
    Category,
    Age,
    Height,
    Weight,
    HairColor,
    EyeColor,
    SkinTone,
    BreastSize,
    BodyType,
    Ethnicity,
    Nationality,
    HourlyRate,
    Services,
    IsVip,
    IsVerifiedByAdmin,
    IsActive,
    AvailableToday,
    Incall,
    Outcall,
}

impl Column {
    /// Column name in `provider_profile`.
    pub fn name(self) -> &'static str {
        match self {
            Self::DisplayName => "display_name",
            Self::Bio => "bio",
            Self::City => "city",
            Self::District => "district",
            Self::Category => "category",
            Self::Age => "age",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::HairColor => "hair_color",
            Self::EyeColor => "eye_color",
            Self::SkinTone => "skin_tone",
            Self::BreastSize => "breast_size",
            Self::BodyType => "body_type",
            Self::Ethnicity => "ethnicity",
            Self::Nationality => "nationality",
            Self::HourlyRate => "hourly_rate",
            Self::Services => "services",
            Self::IsVip => "is_vip",
            Self::IsVerifiedByAdmin => "is_verified_by_admin",
            Self::IsActive => "is_active",
            Self::AvailableToday => "available_today",
            Self::Incall => "incall",
            Self::Outcall => "outcall",
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
    /// Column value is one of a list.
    In,
    /// Case-insensitive substring match.
    Contains,
    /// Array column holds the value.
    Includes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(i32),
    Bool(bool),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Compare { column: Column, op: Op, value: Value },
    /// Disjunction; matches when any branch matches.
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(column: Column, op: Op, value: Value) -> Self {
        Self::Compare { column, op, value }
    }

    /// Evaluate against one profile.
    pub fn matches(&self, profile: &ProviderProfile) -> bool {
        match self {
            Self::AnyOf(branches) => branches.iter().any(|p| p.matches(profile)),
            Self::Compare { column, op, value } => compare(field(profile, *column), *op, value),
        }
    }
}

/// Whether a profile satisfies every predicate. An empty list matches all.
pub fn matches_all(predicates: &[Predicate], profile: &ProviderProfile) -> bool {
    predicates.iter().all(|p| p.matches(profile))
}

/// Translate search parameters into conjunctive predicates.
pub fn predicates(params: &SearchParams) -> Vec<Predicate> {
    let mut out = Vec::new();

    // Equality
    push_text(&mut out, Column::City, params.city.as_deref());
    push_text(&mut out, Column::District, params.district.as_deref());
    if let Some(vip) = params.is_vip {
        out.push(Predicate::compare(Column::IsVip, Op::Eq, Value::Bool(vip)));
    }
    push_text(&mut out, Column::Category, params.category.as_deref());

    // Ranges; each bound stands alone.
    push_range(&mut out, Column::Age, params.min_age, params.max_age);
    push_range(&mut out, Column::Height, params.min_height, params.max_height);
    push_range(&mut out, Column::Weight, params.min_weight, params.max_weight);
    push_range(&mut out, Column::HourlyRate, params.min_price, params.max_price);

    // Attributes
    push_list(&mut out, Column::HairColor, known(&params.hair_color, HairColor::parse));
    push_list(&mut out, Column::EyeColor, known(&params.eye_color, EyeColor::parse));
    push_list(&mut out, Column::BodyType, known(&params.body_type, BodyType::parse));
    push_list(&mut out, Column::SkinTone, params.skin_tone.clone());
    push_list(&mut out, Column::BreastSize, params.breast_size.clone());
    push_list(&mut out, Column::Ethnicity, params.ethnicity.clone());
    push_list(&mut out, Column::Nationality, params.nationality.clone());

    // Flags
    let flags = [
        (Column::IsVerifiedByAdmin, params.is_verified),
        (Column::AvailableToday, params.available_today),
        (Column::Incall, params.incall),
        (Column::Outcall, params.outcall),
    ];
    for (column, flag) in flags {
        if let Some(flag) = flag {
            out.push(Predicate::compare(column, Op::Eq, Value::Bool(flag)));
        }
    }
    if params.is_active_only {
        out.push(Predicate::compare(Column::IsActive, Op::Eq, Value::Bool(true)));
    }

    // Every requested service must be offered.
    for service in params.services.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        out.push(Predicate::compare(
            Column::Services,
            Op::Includes,
            Value::Text(service.to_string()),
        ));
    }

    // Free text
    if let Some(term) = params.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let term = term.to_lowercase();
        out.push(Predicate::AnyOf(vec![
            Predicate::compare(Column::DisplayName, Op::Contains, Value::Text(term.clone())),
            Predicate::compare(Column::Bio, Op::Contains, Value::Text(term)),
        ]));
    }

    out
}

fn push_text(out: &mut Vec<Predicate>, column: Column, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        out.push(Predicate::compare(column, Op::Eq, Value::Text(value.to_string())));
    }
}

fn push_range(out: &mut Vec<Predicate>, column: Column, min: Option<i32>, max: Option<i32>) {
    if let Some(min) = min {
        out.push(Predicate::compare(column, Op::Gte, Value::Int(min)));
    }
    if let Some(max) = max {
        out.push(Predicate::compare(column, Op::Lte, Value::Int(max)));
    }
}

/// One value compares with `=`, several with `IN`.
fn push_list(out: &mut Vec<Predicate>, column: Column, mut values: Vec<String>) {
    values.retain(|v| !v.trim().is_empty());
    match values.len() {
        0 => {}
        1 => {
            let value = values.remove(0);
            out.push(Predicate::compare(column, Op::Eq, Value::Text(value)));
        }
        _ => out.push(Predicate::compare(column, Op::In, Value::List(values))),
    }
}

/// Keep only values of a fixed enumeration.
fn known<T>(values: &[String], parse: fn(&str) -> Option<T>) -> Vec<String> {
    values
        .iter()
        .filter(|v| {
            let ok = parse(v.as_str()).is_some();
            if !ok {
                debug!(value = %v, "ignoring unknown attribute value");
            }
            ok
        })
        .map(|v| v.trim().to_string())
        .collect()
}

/// A profile value viewed through its column.
enum Field<'a> {
    Text(Option<&'a str>),
    Int(Option<i32>),
    Bool(bool),
    List(&'a [String]),
}

fn field(p: &ProviderProfile, column: Column) -> Field<'_> {
    match column {
        Column::DisplayName => Field::Text(Some(&p.display_name)),
        Column::Bio => Field::Text(p.bio.as_deref()),
        Column::City => Field::Text(p.city.as_deref()),
        Column::District => Field::Text(p.district.as_deref()),
        Column::Category => Field::Text(p.category.as_deref()),
        Column::Age => Field::Int(p.age),
        Column::Height => Field::Int(p.height),
        Column::Weight => Field::Int(p.weight),
        Column::HairColor => Field::Text(p.hair_color.as_deref()),
        Column::EyeColor => Field::Text(p.eye_color.as_deref()),
        Column::SkinTone => Field::Text(p.skin_tone.as_deref()),
        Column::BreastSize => Field::Text(p.breast_size.as_deref()),
        Column::BodyType => Field::Text(p.body_type.as_deref()),
        Column::Ethnicity => Field::Text(p.ethnicity.as_deref()),
        Column::Nationality => Field::Text(p.nationality.as_deref()),
        Column::HourlyRate => Field::Int(p.hourly_rate),
        Column::Services => Field::List(&p.services),
        Column::IsVip => Field::Bool(p.is_vip),
        Column::IsVerifiedByAdmin => Field::Bool(p.is_verified_by_admin),
        Column::IsActive => Field::Bool(p.is_active),
        Column::AvailableToday => Field::Bool(p.available_today),
        Column::Incall => Field::Bool(p.incall),
        Column::Outcall => Field::Bool(p.outcall),
    }
}

fn compare(field: Field<'_>, op: Op, value: &Value) -> bool {
    match (field, op, value) {
        (Field::Text(Some(a)), Op::Eq, Value::Text(b)) => a == b,
        (Field::Text(Some(a)), Op::In, Value::List(bs)) => bs.iter().any(|b| a == b),
        (Field::Text(Some(a)), Op::Contains, Value::Text(b)) => {
            a.to_lowercase().contains(&b.to_lowercase())
        }
        (Field::Int(Some(a)), Op::Eq, Value::Int(b)) => a == *b,
        (Field::Int(Some(a)), Op::Gte, Value::Int(b)) => a >= *b,
        (Field::Int(Some(a)), Op::Lte, Value::Int(b)) => a <= *b,
        (Field::Bool(a), Op::Eq, Value::Bool(b)) => a == *b,
        (Field::List(items), Op::Includes, Value::Text(b)) => items.iter().any(|i| i == b),
        _ => false,
    }
}
