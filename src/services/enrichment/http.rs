//! HTTP explanation service client
//!
//! Posts a feed page to `{base_url}/v1/recs/why-tags` and expects
//! `{"cards": [{"title_id": ..., "why_tags": [...]}]}` back.
use crate::{
    error::{AppError, AppResult},
    services::enrichment::{ExplanationEnricher, WhyTagsRequest, WhyTagsResponse},
};
use reqwest::Client as HttpClient;
use std::time::Duration;

pub const WHY_TAGS_PATH: &str = "/v1/recs/why-tags";

#[derive(Clone)]
pub struct HttpEnricher {
    http_client: HttpClient,
    endpoint: String,
}

impl HttpEnricher {
    /// Creates a client for the service at `base_url`
    ///
    /// `timeout` is also set on the HTTP client so the connection is torn down
    /// even if the caller's own timeout is longer.
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            endpoint: Self::endpoint_for(base_url),
        })
    }

    fn endpoint_for(base_url: &str) -> String {
        format!("{}{}", base_url.trim().trim_end_matches('/'), WHY_TAGS_PATH)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ExplanationEnricher for HttpEnricher {
    async fn enrich(&self, request: &WhyTagsRequest) -> AppResult<WhyTagsResponse> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Explanation service returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        tracing::debug!(response = %response_text, "Raw explanation service response");

        let parsed: WhyTagsResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize explanation service response"
            );
            AppError::ExternalApi(format!("Failed to parse explanation response: {}", e))
        })?;

        tracing::info!(
            cards = parsed.cards.len(),
            enricher = self.name(),
            "Why-tags fetched"
        );

        Ok(parsed)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserTasteProfile;
    use crate::services::catalog::Catalog;
    use crate::services::enrichment::{enrich_cards, EnrichmentOutcome, FallbackReason};

    #[test]
    fn test_endpoint_joins_path() {
        assert_eq!(
            HttpEnricher::endpoint_for("http://localhost:8787/"),
            "http://localhost:8787/v1/recs/why-tags"
        );
        assert_eq!(
            HttpEnricher::endpoint_for(" https://llm.example.com "),
            "https://llm.example.com/v1/recs/why-tags"
        );
    }

    #[test]
    fn test_response_schema_mismatch_is_rejected() {
        let bad = r#"{"cards": [{"title_id": 7, "why_tags": "nope"}]}"#;
        assert!(serde_json::from_str::<WhyTagsResponse>(bad).is_err());

        let good = r#"{"cards": [{"title_id": "t1", "why_tags": ["a", "b"]}], "meta": {"provider": "fallback"}}"#;
        let parsed: WhyTagsResponse = serde_json::from_str(good).unwrap();
        assert_eq!(parsed.cards[0].why_tags.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        // Port 9 (discard) is closed on test machines; the connect fails fast
        let enricher = HttpEnricher::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let catalog = Catalog::builtin().unwrap();
        let cards = crate::services::feed::build_recommendation_feed(
            catalog.titles(),
            &UserTasteProfile::default(),
            &[],
            &[],
            2,
            0,
        );

        let outcome = enrich_cards(
            Some(&enricher),
            &cards,
            &catalog,
            &UserTasteProfile::default(),
            Duration::from_secs(3),
        )
        .await;

        assert!(matches!(
            outcome,
            EnrichmentOutcome::Fallback(FallbackReason::Failed(_) | FallbackReason::TimedOut)
        ));
        assert_eq!(outcome.into_cards(cards.clone()), cards);
    }
}
