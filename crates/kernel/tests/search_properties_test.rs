#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Search semantics over the memory store: refinement narrows results,
//! the unfiltered ordering, inverted ranges and predicate details.

mod common;

use roster_kernel::search::SearchParams;
use roster_test_utils::{numbered_providers, test_provider};
use uuid::Uuid;

use common::TestApp;

fn directory() -> TestApp {
    TestApp::new(&[
        test_provider("Alba")
            .with_id(Uuid::from_u128(1))
            .in_district("Berlin", "Mitte")
            .priced(150)
            .aged(24)
            .with_hair("blonde")
            .offering(&["dinner", "travel"])
            .verified(),
        test_provider("Bea")
            .with_id(Uuid::from_u128(2))
            .in_district("Berlin", "Kreuzberg")
            .priced(300)
            .aged(31)
            .with_hair("red")
            .offering(&["travel"])
            .vip(),
        test_provider("Cleo")
            .with_id(Uuid::from_u128(3))
            .in_city("Berlin")
            .aged(28)
            .with_bio("Art lover, 100% discreet"),
        test_provider("Dana")
            .with_id(Uuid::from_u128(4))
            .in_district("Hamburg", "Altona")
            .priced(220)
            .with_hair("black")
            .with_body_type("curvy")
            .available_today()
            .incall(),
        test_provider("Eve")
            .with_id(Uuid::from_u128(5))
            .in_district("Berlin", "Mitte")
            .priced(500)
            .vip()
            .inactive(),
    ])
}

async fn search(app: &TestApp, params: SearchParams) -> Vec<String> {
    let page = app.state.search().search(params).await.expect("search");
    page.items.iter().map(|p| p.display_name.clone()).collect()
}

fn params(query: &str) -> SearchParams {
    SearchParams::from_query_str(query)
}

// =============================================================================
// Refinement
// =============================================================================

#[tokio::test]
async fn district_results_are_subset_of_city_results() {
    let app = directory();
    for district in ["Mitte", "Kreuzberg", "Altona", "Nowhere"] {
        let city = search(&app, params("city=Berlin")).await;
        let refined = search(&app, params(&format!("city=Berlin&district={district}"))).await;
        assert!(
            refined.iter().all(|name| city.contains(name)),
            "{district}: {refined:?} not within {city:?}"
        );
    }
}

#[tokio::test]
async fn every_added_predicate_narrows() {
    let app = directory();
    let steps = [
        "",
        "city=Berlin",
        "city=Berlin&minPrice=100",
        "city=Berlin&minPrice=100&services=travel",
        "city=Berlin&minPrice=100&services=travel&isVip=true",
    ];
    let mut previous: Option<Vec<String>> = None;
    for step in steps {
        let current = search(&app, params(step)).await;
        if let Some(prev) = &previous {
            assert!(current.iter().all(|n| prev.contains(n)), "{step}");
        }
        previous = Some(current);
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn unfiltered_search_is_vip_first_then_newest() {
    let app = directory();
    let names = search(&app, SearchParams::default()).await;
    assert_eq!(names, vec!["Eve", "Bea", "Dana", "Cleo", "Alba"]);
}

#[tokio::test]
async fn unfiltered_search_pages_through_whole_catalog() {
    let app = TestApp::new(&numbered_providers(7));
    let mut seen = Vec::new();
    let mut offset = 0;
    loop {
        let page = app
            .state
            .search()
            .search(SearchParams {
                limit: 3,
                offset,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 7);
        seen.extend(page.items.iter().map(|p| p.id));
        if !page.has_more {
            break;
        }
        offset += 3;
    }

    let expected: Vec<Uuid> = (1..=7).rev().map(Uuid::from_u128).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn price_sort_puts_missing_rates_last() {
    let app = directory();
    let names = search(&app, params("city=Berlin&sortBy=price_asc")).await;
    // VIPs lead; the sort key orders within each group.
    assert_eq!(names, vec!["Bea", "Eve", "Alba", "Cleo"]);
}

// =============================================================================
// Inverted ranges
// =============================================================================

#[tokio::test]
async fn inverted_price_range_is_empty_not_an_error() {
    let app = directory();
    let page = app
        .state
        .search()
        .search(params("minPrice=1000&maxPrice=500"))
        .await
        .expect("inverted range must not fail");
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
    assert!(!page.has_more);
}

#[tokio::test]
async fn inverted_age_range_is_empty() {
    let app = directory();
    assert!(search(&app, params("minAge=40&maxAge=20")).await.is_empty());
}

// =============================================================================
// Predicates
// =============================================================================

#[tokio::test]
async fn profiles_without_a_rate_never_match_price_bounds() {
    let app = directory();
    let names = search(&app, params("city=Berlin&minPrice=0")).await;
    assert!(!names.contains(&"Cleo".to_string()));
}

#[tokio::test]
async fn services_require_every_listed_value() {
    let app = directory();
    assert_eq!(
        search(&app, params("services=travel&services=dinner")).await,
        vec!["Alba"]
    );
    assert_eq!(
        search(&app, params("services=travel")).await,
        vec!["Bea", "Alba"]
    );
}

#[tokio::test]
async fn hair_color_list_matches_any() {
    let app = directory();
    let names = search(&app, params("hairColor=red&hairColor=black")).await;
    assert_eq!(names, vec!["Bea", "Dana"]);
}

#[tokio::test]
async fn unknown_attribute_values_are_dropped() {
    let app = directory();
    assert_eq!(search(&app, params("bodyType=curvy")).await, vec!["Dana"]);
    assert_eq!(
        search(&app, params("bodyType=curvy&bodyType=cubist")).await,
        vec!["Dana"]
    );
}

#[tokio::test]
async fn availability_flags() {
    let app = directory();
    assert_eq!(
        search(&app, params("availableToday=true&incall=1")).await,
        vec!["Dana"]
    );
    assert!(search(&app, params("availableToday=true&outcall=true")).await.is_empty());
}

#[tokio::test]
async fn free_text_matches_bio_case_insensitively() {
    let app = directory();
    assert_eq!(search(&app, params("q=ART%20LOVER")).await, vec!["Cleo"]);
    // Wildcards in the term are literal.
    assert_eq!(search(&app, params("q=100%25")).await, vec!["Cleo"]);
    assert!(search(&app, params("q=%25%25%25")).await.is_empty());
}

#[tokio::test]
async fn active_only_hides_parked_profiles() {
    let app = directory();
    let all = search(&app, params("isVip=true")).await;
    let active = search(&app, params("isVip=true&isActiveOnly=true")).await;
    assert_eq!(all, vec!["Eve", "Bea"]);
    assert_eq!(active, vec!["Bea"]);
}

#[tokio::test]
async fn explicit_false_excludes() {
    let app = directory();
    let names = search(&app, params("city=Berlin&isVip=false")).await;
    assert_eq!(names, vec!["Cleo", "Alba"]);
}

#[tokio::test]
async fn malformed_values_are_treated_as_absent() {
    let app = directory();
    let lenient = search(&app, params("minPrice=cheap&isVip=maybe&sortBy=best")).await;
    let unfiltered = search(&app, SearchParams::default()).await;
    assert_eq!(lenient, unfiltered);
}

#[tokio::test]
async fn limit_is_capped() {
    let app = TestApp::new(&numbered_providers(3));
    let page = app
        .state
        .search()
        .search(params("limit=100000"))
        .await
        .unwrap();
    assert_eq!(page.limit, app.state.search().max_limit());
    assert_eq!(page.items.len(), 3);
}

#[tokio::test]
async fn price_bounds_ignore_inactive_and_unpriced() {
    let app = directory();
    let bounds = app.state.search().price_bounds().await.unwrap().unwrap();
    assert_eq!((bounds.min, bounds.max), (150, 300));
}
