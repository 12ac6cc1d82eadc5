//! Executable search plan: predicates, ordering and page window.
//!
//! Ordering is always VIP first. The optional sort key comes next, with
//! missing values last in either direction. Ties fall back to descending id,
//! which for UUIDv7 identifiers is newest first.

use std::cmp::Ordering;

use tracing::warn;

use super::params::SearchParams;
use super::predicate::{self, Predicate};
use crate::filter::SortKey;
use crate::models::ProviderProfile;

/// Largest window value PostgreSQL accepts for LIMIT and OFFSET (bigint).
const MAX_WINDOW: u64 = i64::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    pub predicates: Vec<Predicate>,
    pub sort: Option<SortKey>,
    pub limit: u64,
    pub offset: u64,
}

impl SearchPlan {
    /// Build a plan, capping the page size at `max_limit`.
    ///
    /// Both window values are also capped at the bigint range so that every
    /// store sees the same window.
    pub fn new(params: &SearchParams, max_limit: u64) -> Self {
        let max_limit = max_limit.min(MAX_WINDOW);
        let limit = if params.limit > max_limit {
            warn!(requested = params.limit, max_limit, "capping search page size");
            max_limit
        } else {
            params.limit
        };

        Self {
            predicates: predicate::predicates(params),
            sort: params.sort_by,
            limit,
            offset: params.offset.min(MAX_WINDOW),
        }
    }

    pub fn matches(&self, profile: &ProviderProfile) -> bool {
        predicate::matches_all(&self.predicates, profile)
    }

    /// Result ordering as a comparator.
    pub fn compare(&self, a: &ProviderProfile, b: &ProviderProfile) -> Ordering {
        b.is_vip
            .cmp(&a.is_vip)
            .then_with(|| match self.sort {
                None | Some(SortKey::Newest) => Ordering::Equal,
                Some(SortKey::PriceAsc) => nulls_last(a.hourly_rate, b.hourly_rate, false),
                Some(SortKey::PriceDesc) => nulls_last(a.hourly_rate, b.hourly_rate, true),
                Some(SortKey::AgeAsc) => nulls_last(a.age, b.age, false),
                Some(SortKey::AgeDesc) => nulls_last(a.age, b.age, true),
                Some(SortKey::Verified) => b.is_verified_by_admin.cmp(&a.is_verified_by_admin),
            })
            .then_with(|| b.id.cmp(&a.id))
    }
}

fn nulls_last(a: Option<i32>, b: Option<i32>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProvider;
    use uuid::Uuid;

    fn p(id: u128, vip: bool, rate: Option<i32>) -> ProviderProfile {
        NewProvider {
            id: Some(Uuid::from_u128(id)),
            display_name: format!("p{id}"),
            is_vip: vip,
            hourly_rate: rate,
            ..Default::default()
        }
        .into_profile()
    }

    fn ids(plan: &SearchPlan, mut items: Vec<ProviderProfile>) -> Vec<u128> {
        items.sort_by(|a, b| plan.compare(a, b));
        items.iter().map(|p| p.id.as_u128()).collect()
    }

    #[test]
    fn default_order_is_vip_then_newest() {
        let plan = SearchPlan::new(&SearchParams::default(), 100);
        let items = vec![p(1, false, None), p(2, true, None), p(3, false, None), p(4, true, None)];
        assert_eq!(ids(&plan, items), vec![4, 2, 3, 1]);
    }

    #[test]
    fn price_sort_keeps_vip_first_and_missing_last() {
        let params = SearchParams {
            sort_by: Some(SortKey::PriceAsc),
            ..Default::default()
        };
        let plan = SearchPlan::new(&params, 100);
        let items = vec![
            p(1, false, Some(300)),
            p(2, false, None),
            p(3, false, Some(100)),
            p(4, true, Some(900)),
        ];
        assert_eq!(ids(&plan, items), vec![4, 3, 1, 2]);
    }

    #[test]
    fn descending_sort_still_puts_missing_last() {
        let params = SearchParams {
            sort_by: Some(SortKey::PriceDesc),
            ..Default::default()
        };
        let plan = SearchPlan::new(&params, 100);
        let items = vec![p(1, false, None), p(2, false, Some(100)), p(3, false, Some(300))];
        assert_eq!(ids(&plan, items), vec![3, 2, 1]);
    }

    #[test]
    fn limit_is_capped() {
        let params = SearchParams {
            limit: 500,
            offset: 7,
            ..Default::default()
        };
        let plan = SearchPlan::new(&params, 100);
        assert_eq!(plan.limit, 100);
        assert_eq!(plan.offset, 7);
    }

    #[test]
    fn window_fits_bigint() {
        let params = SearchParams {
            limit: u64::MAX,
            offset: u64::MAX,
            ..Default::default()
        };
        let plan = SearchPlan::new(&params, u64::MAX);
        assert_eq!(plan.limit, i64::MAX as u64);
        assert_eq!(plan.offset, i64::MAX as u64);
    }
}
