use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::session::MAX_FAVORITES;
use crate::models::taste_profile::MAX_MOOD_INTENSITY;
use crate::models::{
    FeedResponse, InteractionEvent, OnboardingSeedRequest, OnboardingSeedResponse, ProfilePatch,
    RecsInteractionRequest, SessionInfo, Title, UserTasteProfile, WatchPulse, WatchPulseRequest,
};
use crate::services::catalog::Catalog;
use crate::services::{enrichment, feed};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "catalog_titles": state.catalog.len(),
            "enrichment": state.enricher.as_ref().map(|e| e.name()),
        })),
    )
}

/// Start a new anonymous session, discarding the current one
pub async fn start_session(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> (StatusCode, Json<SessionInfo>) {
    let session = state.new_session();
    let info = session.info();

    state.inner.write().await.session = session;

    tracing::info!(
        request_id = %request_id,
        user_id = %info.user_id,
        "Session started"
    );

    (StatusCode::CREATED, Json(info))
}

/// One page of the discovery feed
///
/// The session is copied out of the lock before building, so the build and the
/// enrichment call never hold it.
pub async fn get_feed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<FeedQuery>,
) -> Json<FeedResponse> {
    let offset = feed::parse_cursor(query.cursor.as_deref());
    let limit = state.settings.limit_for(query.limit);

    let session = state.inner.read().await.session.clone();

    let cards = feed::build_recommendation_feed(
        state.catalog.titles(),
        &session.profile,
        &session.interactions,
        &session.watchlist,
        limit,
        offset,
    );

    let outcome = enrichment::enrich_cards(
        state.enricher.as_deref(),
        &cards,
        &state.catalog,
        &session.profile,
        state.settings.enrichment_timeout,
    )
    .await;
    let enriched = !outcome.is_fallback();
    let cards = outcome.into_cards(cards);
    let next_cursor = feed::next_cursor(offset, limit, cards.len());

    tracing::info!(
        request_id = %request_id,
        offset,
        limit,
        returned = cards.len(),
        enriched,
        "Feed page served"
    );

    Json(FeedResponse { cards, next_cursor })
}

/// Record a swipe or watchlist action
pub async fn record_interaction(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecsInteractionRequest>,
) -> AppResult<(StatusCode, Json<InteractionEvent>)> {
    if !state.catalog.contains(&request.title_id) {
        return Err(AppError::NotFound(format!("Title {} not found", request.title_id)));
    }

    let mut inner = state.inner.write().await;
    let event = inner.session.record_interaction(
        &request.title_id,
        request.action,
        request.context,
        Utc::now(),
    );

    tracing::info!(
        request_id = %request_id,
        title_id = %event.title_id,
        action = ?event.action,
        "Interaction recorded"
    );

    Ok((StatusCode::CREATED, Json(event)))
}

/// Record post-watch feedback
pub async fn submit_watch_pulse(
    State(state): State<AppState>,
    Json(request): Json<WatchPulseRequest>,
) -> AppResult<(StatusCode, Json<WatchPulse>)> {
    if !state.catalog.contains(&request.title_id) {
        return Err(AppError::NotFound(format!("Title {} not found", request.title_id)));
    }

    let mut inner = state.inner.write().await;
    let pulse = inner.session.record_watch_pulse(
        &request.title_id,
        request.watched,
        request.reaction,
        Utc::now(),
    );

    tracing::info!(
        title_id = %pulse.title_id,
        watched = pulse.watched,
        reaction = ?pulse.reaction,
        "Watch pulse recorded"
    );

    Ok((StatusCode::CREATED, Json(pulse)))
}

/// Store onboarding favorites, vibes and seed swipes
pub async fn seed_onboarding(
    State(state): State<AppState>,
    Json(request): Json<OnboardingSeedRequest>,
) -> AppResult<Json<OnboardingSeedResponse>> {
    if request.favorite_title_ids.len() > MAX_FAVORITES {
        return Err(AppError::InvalidInput(format!(
            "At most {} favorites can be selected",
            MAX_FAVORITES
        )));
    }

    let unknown = request
        .favorite_title_ids
        .iter()
        .chain(request.seed_swipes.iter().map(|swipe| &swipe.title_id))
        .find(|id| !state.catalog.contains(id));
    if let Some(id) = unknown {
        return Err(AppError::InvalidInput(format!("Unknown title id: {}", id)));
    }

    let favorites = request.favorite_title_ids.len();
    let swipes = request.seed_swipes.len();

    let mut inner = state.inner.write().await;
    inner.session.complete_onboarding(request, Utc::now());

    tracing::info!(favorites, swipes, "Onboarding completed");

    Ok(Json(OnboardingSeedResponse {
        onboarding_complete: true,
    }))
}

/// Titles on the watchlist, in catalog order
pub async fn get_watchlist(State(state): State<AppState>) -> Json<Vec<Title>> {
    let inner = state.inner.read().await;
    let titles = state
        .catalog
        .resolve(&inner.session.watchlist)
        .into_iter()
        .cloned()
        .collect();
    Json(titles)
}

/// Search titles by name
pub async fn search_titles(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<Title>> {
    let titles = state.catalog.search(&params.q).into_iter().cloned().collect();
    Json(titles)
}

/// Get a single title
pub async fn get_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Title>> {
    state
        .catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Title {} not found", id)))
}

/// Get the taste profile
pub async fn get_preferences(State(state): State<AppState>) -> Json<UserTasteProfile> {
    let inner = state.inner.read().await;
    Json(inner.session.profile.clone())
}

/// Partially update the taste profile
pub async fn patch_preferences(
    State(state): State<AppState>,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<UserTasteProfile>> {
    validate_patch(&patch, &state.catalog)?;

    let mut inner = state.inner.write().await;
    inner.session.profile.apply_patch(patch);
    Ok(Json(inner.session.profile.clone()))
}

fn validate_patch(patch: &ProfilePatch, catalog: &Catalog) -> AppResult<()> {
    if let Some(intensity) = patch.mood_intensity {
        if intensity > MAX_MOOD_INTENSITY {
            return Err(AppError::InvalidInput(format!(
                "mood_intensity must be between 0 and {}",
                MAX_MOOD_INTENSITY
            )));
        }
    }

    if let Some(Some(window)) = patch.runtime_pref {
        if window.min > window.max {
            return Err(AppError::InvalidInput(
                "runtime_pref.min must not exceed runtime_pref.max".to_string(),
            ));
        }
    }

    if let Some(favorites) = &patch.favorite_title_ids {
        if favorites.len() > MAX_FAVORITES {
            return Err(AppError::InvalidInput(format!(
                "At most {} favorites can be selected",
                MAX_FAVORITES
            )));
        }
    }

    let referenced = patch
        .favorite_title_ids
        .iter()
        .flatten()
        .chain(patch.more_like_title_id.iter().flatten())
        .chain(patch.less_like_title_id.iter().flatten());
    for id in referenced {
        if !catalog.contains(id) {
            return Err(AppError::InvalidInput(format!("Unknown title id: {}", id)));
        }
    }

    Ok(())
}
