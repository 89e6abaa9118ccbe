use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::models::{UserSession, UserTasteProfile};
use crate::services::catalog::Catalog;
use crate::services::enrichment::ExplanationEnricher;

/// Hard cap on a client-requested page size
pub const MAX_PAGE_SIZE: usize = 50;

/// Feed settings resolved from configuration
#[derive(Debug, Clone, Copy)]
pub struct FeedSettings {
    pub page_size: usize,
    pub enrichment_timeout: Duration,
}

impl FeedSettings {
    /// Page size to use for a request, defaulting and clamping the client's value
    pub fn limit_for(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.page_size)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

impl From<&Config> for FeedSettings {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.page_size(),
            enrichment_timeout: config.enrichment_timeout(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub catalog: Arc<Catalog>,
    pub enricher: Option<Arc<dyn ExplanationEnricher>>,
    pub settings: FeedSettings,
    /// Profile every new session starts from
    pub default_profile: UserTasteProfile,
}

/// Inner state that can be modified
pub struct AppStateInner {
    pub session: UserSession,
}

impl AppState {
    /// Creates state with a fresh anonymous session
    pub fn new(
        catalog: Catalog,
        enricher: Option<Arc<dyn ExplanationEnricher>>,
        config: &Config,
    ) -> Self {
        let profile = UserTasteProfile::with_language(&config.default_language);

        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                session: UserSession::anonymous(profile.clone()),
            })),
            catalog: Arc::new(catalog),
            enricher,
            settings: FeedSettings::from(config),
            default_profile: profile,
        }
    }

    /// A fresh anonymous session with the default profile
    pub fn new_session(&self) -> UserSession {
        UserSession::anonymous(self.default_profile.clone())
    }

    /// State over the built-in catalog with default settings and no enrichment
    pub fn with_builtin_catalog() -> crate::error::AppResult<Self> {
        Ok(Self::new(Catalog::builtin()?, None, &Config::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_for() {
        let settings = FeedSettings {
            page_size: 8,
            enrichment_timeout: Duration::from_secs(1),
        };
        assert_eq!(settings.limit_for(None), 8);
        assert_eq!(settings.limit_for(Some(0)), 1);
        assert_eq!(settings.limit_for(Some(20)), 20);
        assert_eq!(settings.limit_for(Some(500)), MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_new_session_uses_default_language() {
        let config = Config {
            default_language: "fr".to_string(),
            ..Config::default()
        };
        let state = AppState::new(Catalog::default(), None, &config);

        let inner = state.inner.read().await;
        assert_eq!(inner.session.profile.language_pref, vec!["fr".to_string()]);
        assert!(state.enricher.is_none());
    }

    #[tokio::test]
    async fn test_new_session_replaces_history() {
        let state = AppState::with_builtin_catalog().unwrap();
        let first_user = {
            let mut inner = state.inner.write().await;
            inner.session.watchlist.push("t-arrival".to_string());
            inner.session.user_id.clone()
        };

        let fresh = state.new_session();
        assert_ne!(fresh.user_id, first_user);
        assert!(fresh.watchlist.is_empty());
        assert_eq!(fresh.profile, state.default_profile);
    }
}
