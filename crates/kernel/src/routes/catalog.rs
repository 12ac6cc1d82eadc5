//! Location catalog and filter panel endpoints.

use axum::extract::{Path, RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::catalog::City;
use crate::error::{AppError, AppResult};
use crate::filter::{
    ActiveFilter, BodyType, EyeColor, FilterController, FilterSection, HairColor, PriceBounds,
    ProviderFilters, SortKey,
};
use crate::search::SearchParams;
use crate::state::AppState;

/// Create the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/locations", get(locations))
        .route("/api/locations/{city}/districts", get(districts))
        .route("/api/filters/options", get(filter_options))
        .route("/api/filters/summary", get(filter_summary))
}

/// `GET /api/locations`
async fn locations(State(state): State<AppState>) -> Json<Vec<City>> {
    Json(state.catalog().cities().to_vec())
}

/// `GET /api/locations/{city}/districts`
async fn districts(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> AppResult<Json<Vec<String>>> {
    if !state.catalog().has_city(&city) {
        return Err(AppError::NotFound);
    }
    Ok(Json(state.catalog().districts(&city).to_vec()))
}

/// Choices for every fixed-choice control in the filter panel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterOptions {
    hair_colors: &'static [HairColor],
    eye_colors: &'static [EyeColor],
    body_types: &'static [BodyType],
    sort_keys: &'static [SortKey],
    sections: &'static [FilterSection],
    default_limit: u64,
    max_limit: u64,
    /// Absent when no active profile has a rate.
    price_bounds: Option<PriceBounds>,
}

/// `GET /api/filters/options`
async fn filter_options(State(state): State<AppState>) -> AppResult<Json<FilterOptions>> {
    let price_bounds = state.search().price_bounds().await?;
    Ok(Json(FilterOptions {
        hair_colors: HairColor::ALL,
        eye_colors: EyeColor::ALL,
        body_types: BodyType::ALL,
        sort_keys: SortKey::ALL,
        sections: FilterSection::ALL,
        default_limit: crate::search::params::DEFAULT_LIMIT,
        max_limit: state.search().max_limit(),
        price_bounds,
    }))
}

/// Filter state restored from a shared link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterSummary {
    filters: ProviderFilters,
    active_filters_count: usize,
    active_filters: Vec<ActiveFilter>,
    /// Canonical shareable query string.
    query_string: String,
    search_params: SearchParams,
}

/// `GET /api/filters/summary?city=..`
///
/// Districts outside the selected city are dropped and the price range is
/// clamped to the catalog bounds, exactly as the panel would do.
async fn filter_summary(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<FilterSummary>> {
    let price_bounds = state.search().price_bounds().await?;
    let controller = FilterController::from_query_string(
        state.catalog().clone(),
        query.as_deref().unwrap_or_default(),
    )
    .with_price_bounds(price_bounds);

    Ok(Json(FilterSummary {
        filters: controller.filters().clone(),
        active_filters_count: controller.active_filters_count(),
        active_filters: controller.active_filters(),
        query_string: controller.to_query_string(),
        search_params: controller.search_params(),
    }))
}
