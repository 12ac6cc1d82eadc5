//! Provider search route handlers.

use axum::extract::{Path, RawQuery, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::search::SearchParams;
use crate::state::AppState;

/// Clients send a stable per-tab id here to get latest-wins searches.
pub const SEARCH_SESSION_HEADER: &str = "x-search-session";

/// Create the search router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/providers/search",
            get(search_query).post(search_json),
        )
        .route("/api/providers/{id}", get(provider))
}

/// `GET /api/providers/search?city=..&minPrice=..`
async fn search_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> AppResult<Response> {
    let params = SearchParams::from_query_str(query.as_deref().unwrap_or_default());
    run_search(&state, &headers, params).await
}

/// `POST /api/providers/search` with a JSON body.
async fn search_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(params): Json<SearchParams>,
) -> AppResult<Response> {
    run_search(&state, &headers, params).await
}

async fn run_search(
    state: &AppState,
    headers: &HeaderMap,
    params: SearchParams,
) -> AppResult<Response> {
    let page = match session_id(headers) {
        Some(session) => state
            .search()
            .search_in_session(session, params)
            .await?
            .ok_or(AppError::Superseded)?,
        None => state.search().search(params).await?,
    };
    Ok(Json(&*page).into_response())
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SEARCH_SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `GET /api/providers/{id}`
async fn provider(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    let profile = state.search().provider(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(profile).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn blank_session_header_is_ignored() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), None);

        headers.insert(SEARCH_SESSION_HEADER, HeaderValue::from_static("  "));
        assert_eq!(session_id(&headers), None);

        headers.insert(SEARCH_SESSION_HEADER, HeaderValue::from_static("tab-7"));
        assert_eq!(session_id(&headers), Some("tab-7"));
    }
}
