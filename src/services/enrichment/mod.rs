//! Explanation enrichment
//!
//! An optional remote service can rewrite the `why_tags` of a feed page. The
//! feed never depends on it: every call is bounded by a timeout and any failure
//! resolves to the cards the feed builder produced.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{
    error::AppResult,
    models::{RecConfidence, RecommendationCard, UserTasteProfile},
    services::catalog::Catalog,
};

pub mod http;

pub use http::HttpEnricher;

const MAX_TAGS: usize = 3;
const MIN_TAGS: usize = 2;

/// Profile fields shared with the explanation service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhyTagsProfile {
    pub favorite_title_ids: Vec<String>,
    pub vibe_chips: Vec<String>,
    pub blocked_genres: Vec<String>,
    pub language_pref: Vec<String>,
    pub mood_intensity: u8,
}

impl From<&UserTasteProfile> for WhyTagsProfile {
    fn from(profile: &UserTasteProfile) -> Self {
        Self {
            favorite_title_ids: profile.favorite_title_ids.clone(),
            vibe_chips: profile.vibe_chips.clone(),
            blocked_genres: profile.blocked_genres.clone(),
            language_pref: profile.language_pref.clone(),
            mood_intensity: profile.mood_intensity,
        }
    }
}

/// One card as sent to the explanation service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhyTagsCard {
    pub title_id: String,
    pub title_name: String,
    pub year: i32,
    pub genres: Vec<String>,
    pub moods: Vec<String>,
    pub synopsis: String,
    pub match_score: f64,
    pub confidence: RecConfidence,
    pub exploration_pick: bool,
    pub base_why_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhyTagsRequest {
    pub profile: WhyTagsProfile,
    pub cards: Vec<WhyTagsCard>,
}

impl WhyTagsRequest {
    /// Builds the request payload, pulling moods and synopsis from the catalog
    pub fn new(cards: &[RecommendationCard], catalog: &Catalog, profile: &UserTasteProfile) -> Self {
        let cards = cards
            .iter()
            .map(|card| {
                let title = catalog.get(&card.title_id);
                WhyTagsCard {
                    title_id: card.title_id.clone(),
                    title_name: card.title_name.clone(),
                    year: card.year,
                    genres: card.genres.clone(),
                    moods: title.map(|t| t.moods.clone()).unwrap_or_default(),
                    synopsis: title.map(|t| t.synopsis.clone()).unwrap_or_default(),
                    match_score: card.match_score,
                    confidence: card.confidence,
                    exploration_pick: card.exploration_pick,
                    base_why_tags: card.why_tags.clone(),
                }
            })
            .collect();

        Self {
            profile: WhyTagsProfile::from(profile),
            cards,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedTags {
    pub title_id: String,
    pub why_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhyTagsResponse {
    pub cards: Vec<EnrichedTags>,
}

/// A service that rewrites justification tags for feed cards
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExplanationEnricher: Send + Sync {
    /// Requests rewritten tags. A single attempt; callers bound it with a timeout.
    async fn enrich(&self, request: &WhyTagsRequest) -> AppResult<WhyTagsResponse>;

    /// Enricher name for logging
    fn name(&self) -> &'static str;
}

/// Why the original cards are being served
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Disabled,
    NoCards,
    TimedOut,
    Failed(String),
}

/// Result of an enrichment attempt
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    Enriched(Vec<RecommendationCard>),
    Fallback(FallbackReason),
}

impl EnrichmentOutcome {
    /// Cards to serve: the enriched ones, or `original` on the fallback path
    pub fn into_cards(self, original: Vec<RecommendationCard>) -> Vec<RecommendationCard> {
        match self {
            EnrichmentOutcome::Enriched(cards) => cards,
            EnrichmentOutcome::Fallback(_) => original,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, EnrichmentOutcome::Fallback(_))
    }
}

/// Trims, drops blanks, dedupes and caps tags; fewer than two survivors keeps `fallback`
pub fn normalize_tags(incoming: &[String], fallback: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(MAX_TAGS);
    for tag in incoming.iter().map(|tag| tag.trim()) {
        if tags.len() == MAX_TAGS {
            break;
        }
        if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }

    if tags.len() < MIN_TAGS {
        return fallback.to_vec();
    }
    tags
}

/// Applies a service response to the cards
///
/// Cards missing from the response keep their tags.
pub fn merge_tags(cards: &[RecommendationCard], response: WhyTagsResponse) -> Vec<RecommendationCard> {
    let tags_by_title: HashMap<String, Vec<String>> = response
        .cards
        .into_iter()
        .map(|entry| (entry.title_id, entry.why_tags))
        .collect();

    cards
        .iter()
        .map(|card| match tags_by_title.get(&card.title_id) {
            Some(candidate) => RecommendationCard {
                why_tags: normalize_tags(candidate, &card.why_tags),
                ..card.clone()
            },
            None => card.clone(),
        })
        .collect()
}

/// Runs one bounded enrichment attempt
///
/// The enricher future is dropped, and its request aborted, once `timeout`
/// elapses. Never fails: every error path resolves to
/// [`EnrichmentOutcome::Fallback`].
pub async fn enrich_cards(
    enricher: Option<&dyn ExplanationEnricher>,
    cards: &[RecommendationCard],
    catalog: &Catalog,
    profile: &UserTasteProfile,
    timeout: Duration,
) -> EnrichmentOutcome {
    let Some(enricher) = enricher else {
        return EnrichmentOutcome::Fallback(FallbackReason::Disabled);
    };
    if cards.is_empty() {
        return EnrichmentOutcome::Fallback(FallbackReason::NoCards);
    }

    let request = WhyTagsRequest::new(cards, catalog, profile);

    match tokio::time::timeout(timeout, enricher.enrich(&request)).await {
        Ok(Ok(response)) => {
            tracing::debug!(
                enricher = enricher.name(),
                returned = response.cards.len(),
                requested = cards.len(),
                "Why-tags enrichment succeeded"
            );
            EnrichmentOutcome::Enriched(merge_tags(cards, response))
        }
        Ok(Err(e)) => {
            tracing::warn!(
                enricher = enricher.name(),
                error = %e,
                "Why-tags enrichment failed, serving original tags"
            );
            EnrichmentOutcome::Fallback(FallbackReason::Failed(e.to_string()))
        }
        Err(_) => {
            tracing::warn!(
                enricher = enricher.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Why-tags enrichment timed out, serving original tags"
            );
            EnrichmentOutcome::Fallback(FallbackReason::TimedOut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::title::fixtures::title;

    fn card(title_id: &str, tags: &[&str]) -> RecommendationCard {
        RecommendationCard {
            id: format!("{}-0", title_id),
            title_id: title_id.to_string(),
            title_name: format!("Title {}", title_id),
            poster_url: String::new(),
            year: 2020,
            genres: vec!["Drama".to_string()],
            runtime: 90,
            match_score: 0.5,
            why_tags: tags.iter().map(|t| t.to_string()).collect(),
            confidence: RecConfidence::Medium,
            availability_hint: String::new(),
            exploration_pick: false,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn catalog() -> Catalog {
        let mut a = title("a", &["Drama"], 90, "en", 50.0);
        a.moods = strings(&["Cozy"]);
        a.synopsis = "A quiet drama.".to_string();
        Catalog::new(vec![a, title("b", &["Comedy"], 90, "en", 50.0)])
    }

    struct SlowEnricher;

    #[async_trait::async_trait]
    impl ExplanationEnricher for SlowEnricher {
        async fn enrich(&self, _request: &WhyTagsRequest) -> AppResult<WhyTagsResponse> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(WhyTagsResponse { cards: vec![] })
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[test]
    fn test_normalize_tags_trims_and_dedupes() {
        let tags = normalize_tags(
            &strings(&[" Cozy pick ", "Cozy pick", "", "Slow burn", "Great cast", "Extra"]),
            &strings(&["orig 1", "orig 2"]),
        );
        assert_eq!(tags, strings(&["Cozy pick", "Slow burn", "Great cast"]));
    }

    #[test]
    fn test_normalize_tags_falls_back_below_two() {
        let fallback = strings(&["orig 1", "orig 2"]);
        assert_eq!(normalize_tags(&strings(&["Only", "  ", "Only"]), &fallback), fallback);
        assert_eq!(normalize_tags(&[], &fallback), fallback);
    }

    #[test]
    fn test_merge_keeps_cards_missing_from_response() {
        let cards = vec![card("a", &["x", "y"]), card("b", &["p", "q"])];
        let response = WhyTagsResponse {
            cards: vec![EnrichedTags {
                title_id: "b".to_string(),
                why_tags: strings(&["New one", "New two"]),
            }],
        };

        let merged = merge_tags(&cards, response);
        assert_eq!(merged[0].why_tags, strings(&["x", "y"]));
        assert_eq!(merged[1].why_tags, strings(&["New one", "New two"]));
        assert_eq!(merged[1].id, cards[1].id);
    }

    #[test]
    fn test_request_pulls_moods_and_synopsis_from_catalog() {
        let request = WhyTagsRequest::new(
            &[card("a", &["x", "y"]), card("ghost", &["x", "y"])],
            &catalog(),
            &UserTasteProfile::with_language("en"),
        );

        assert_eq!(request.cards[0].moods, strings(&["Cozy"]));
        assert_eq!(request.cards[0].synopsis, "A quiet drama.");
        assert_eq!(request.cards[0].base_why_tags, strings(&["x", "y"]));
        assert!(request.cards[1].moods.is_empty());
        assert_eq!(request.profile.language_pref, strings(&["en"]));
    }

    #[test]
    fn test_disabled_enricher_falls_back() {
        let cards = vec![card("a", &["x", "y"])];
        let outcome = tokio_test::block_on(enrich_cards(
            None,
            &cards,
            &catalog(),
            &UserTasteProfile::default(),
            Duration::from_secs(1),
        ));

        assert_eq!(outcome, EnrichmentOutcome::Fallback(FallbackReason::Disabled));
        assert_eq!(outcome.into_cards(cards.clone()), cards);
    }

    #[tokio::test]
    async fn test_empty_page_skips_call() {
        let mut mock = MockExplanationEnricher::new();
        mock.expect_enrich().never();
        mock.expect_name().return_const("mock");

        let outcome = enrich_cards(
            Some(&mock),
            &[],
            &catalog(),
            &UserTasteProfile::default(),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcome, EnrichmentOutcome::Fallback(FallbackReason::NoCards));
    }

    #[tokio::test]
    async fn test_successful_enrichment_rewrites_tags() {
        let mut mock = MockExplanationEnricher::new();
        mock.expect_enrich().times(1).returning(|request| {
            Ok(WhyTagsResponse {
                cards: request
                    .cards
                    .iter()
                    .map(|card| EnrichedTags {
                        title_id: card.title_id.clone(),
                        why_tags: vec![format!("{} fan pick", card.genres[0]), "Short and sweet".to_string()],
                    })
                    .collect(),
            })
        });
        mock.expect_name().return_const("mock");

        let cards = vec![card("a", &["x", "y"])];
        let outcome = enrich_cards(
            Some(&mock),
            &cards,
            &catalog(),
            &UserTasteProfile::default(),
            Duration::from_secs(1),
        )
        .await;

        let enriched = outcome.into_cards(cards);
        assert_eq!(enriched[0].why_tags, strings(&["Drama fan pick", "Short and sweet"]));
    }

    #[tokio::test]
    async fn test_enricher_error_falls_back() {
        let mut mock = MockExplanationEnricher::new();
        mock.expect_enrich()
            .returning(|_| Err(AppError::ExternalApi("status 503".to_string())));
        mock.expect_name().return_const("mock");

        let cards = vec![card("a", &["x", "y"])];
        let outcome = enrich_cards(
            Some(&mock),
            &cards,
            &catalog(),
            &UserTasteProfile::default(),
            Duration::from_secs(1),
        )
        .await;

        assert!(matches!(outcome, EnrichmentOutcome::Fallback(FallbackReason::Failed(_))));
        assert_eq!(outcome.into_cards(cards.clone()), cards);
    }

    #[tokio::test]
    async fn test_slow_enricher_times_out() {
        let cards = vec![card("a", &["x", "y"])];
        let started = std::time::Instant::now();

        let outcome = enrich_cards(
            Some(&SlowEnricher),
            &cards,
            &catalog(),
            &UserTasteProfile::default(),
            Duration::from_millis(20),
        )
        .await;

        assert_eq!(outcome, EnrichmentOutcome::Fallback(FallbackReason::TimedOut));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
