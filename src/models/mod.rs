use serde::{Deserialize, Serialize};

pub mod card;
pub mod interaction;
pub mod session;
pub mod taste_profile;
pub mod title;

pub use card::{RecConfidence, RecommendationCard};
pub use interaction::{InteractionContext, InteractionEvent, SwipeAction};
pub use session::{SessionInfo, UserSession, WatchPulse, WatchReaction};
pub use taste_profile::{ProfilePatch, RuntimePreference, UserTasteProfile};
pub use title::Title;

// ============================================================================
// Feed API Types
// ============================================================================

/// One page of the discovery feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub cards: Vec<RecommendationCard>,
    /// Cursor for the next page, `None` once the feed is exhausted
    pub next_cursor: Option<String>,
}

/// Request to record a swipe or watchlist action
#[derive(Debug, Clone, Deserialize)]
pub struct RecsInteractionRequest {
    pub title_id: String,
    pub action: SwipeAction,
    pub context: InteractionContext,
}

/// A swipe made while seeding taste during onboarding
#[derive(Debug, Clone, Deserialize)]
pub struct SeedSwipe {
    pub title_id: String,
    pub action: SwipeAction,
}

/// Onboarding payload: favorites, vibes and seed swipes
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingSeedRequest {
    pub favorite_title_ids: Vec<String>,
    #[serde(default)]
    pub vibe_chips: Vec<String>,
    #[serde(default)]
    pub seed_swipes: Vec<SeedSwipe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingSeedResponse {
    pub onboarding_complete: bool,
}

/// Post-watch feedback for one title
#[derive(Debug, Clone, Deserialize)]
pub struct WatchPulseRequest {
    pub title_id: String,
    pub watched: bool,
    pub reaction: WatchReaction,
}
