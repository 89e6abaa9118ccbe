use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    InteractionContext, InteractionEvent, OnboardingSeedRequest, SwipeAction, UserTasteProfile,
};

/// Screen recorded on interactions seeded during onboarding
pub const ONBOARDING_SCREEN: &str = "TasteSeeder";

/// Upper bound on favorites picked during onboarding
pub const MAX_FAVORITES: usize = 5;

/// Post-watch reaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WatchReaction {
    LovedIt,
    Good,
    Meh,
    NotForMe,
}

/// Feedback recorded after watching (or abandoning) a title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchPulse {
    pub title_id: String,
    pub watched: bool,
    pub reaction: WatchReaction,
    pub timestamp: DateTime<Utc>,
}

/// Public view of a session, returned when one is started
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    pub session_id: String,
    pub user_id: String,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-user state the feed is built from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSession {
    pub session_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub onboarding_complete: bool,
    pub profile: UserTasteProfile,
    /// Append-only interaction history
    pub interactions: Vec<InteractionEvent>,
    /// Saved title ids, unique, in save order
    pub watchlist: Vec<String>,
    /// Append-only post-watch feedback. Not a ranking input.
    pub watch_pulses: Vec<WatchPulse>,
}

impl UserSession {
    /// Creates an anonymous session with the given starting profile
    pub fn anonymous(profile: UserTasteProfile) -> Self {
        Self::started_at(profile, Utc::now())
    }

    pub fn started_at(profile: UserTasteProfile, at: DateTime<Utc>) -> Self {
        Self {
            session_id: format!("sess_{}", Uuid::new_v4().simple()),
            user_id: format!("anon_{}", Uuid::new_v4().simple()),
            created_at: at,
            onboarding_complete: false,
            profile,
            interactions: Vec::new(),
            watchlist: Vec::new(),
            watch_pulses: Vec::new(),
        }
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            user_id: self.user_id.clone(),
            anonymous: true,
            created_at: self.created_at,
        }
    }

    /// Appends an interaction and keeps the watchlist in step with save/unsave
    pub fn record_interaction(
        &mut self,
        title_id: &str,
        action: SwipeAction,
        context: InteractionContext,
        at: DateTime<Utc>,
    ) -> InteractionEvent {
        let event = InteractionEvent {
            user_id: self.user_id.clone(),
            title_id: title_id.to_string(),
            action,
            timestamp: at,
            context,
        };
        self.interactions.push(event.clone());

        match action {
            SwipeAction::Save => self.save(title_id),
            SwipeAction::Unsave => self.unsave(title_id),
            SwipeAction::Like | SwipeAction::Pass | SwipeAction::SuperLike => {}
        }

        event
    }

    /// Stores onboarding picks and records the seed swipes
    pub fn complete_onboarding(&mut self, seed: OnboardingSeedRequest, at: DateTime<Utc>) {
        self.profile.favorite_title_ids = seed.favorite_title_ids;
        self.profile.vibe_chips = seed.vibe_chips;

        for swipe in seed.seed_swipes {
            self.record_interaction(
                &swipe.title_id,
                swipe.action,
                InteractionContext::screen(ONBOARDING_SCREEN),
                at,
            );
        }

        self.onboarding_complete = true;
    }

    /// Appends a post-watch pulse
    pub fn record_watch_pulse(
        &mut self,
        title_id: &str,
        watched: bool,
        reaction: WatchReaction,
        at: DateTime<Utc>,
    ) -> WatchPulse {
        let pulse = WatchPulse {
            title_id: title_id.to_string(),
            watched,
            reaction,
            timestamp: at,
        };
        self.watch_pulses.push(pulse.clone());
        pulse
    }

    pub fn is_saved(&self, title_id: &str) -> bool {
        self.watchlist.iter().any(|id| id == title_id)
    }

    fn save(&mut self, title_id: &str) {
        if !self.is_saved(title_id) {
            self.watchlist.push(title_id.to_string());
        }
    }

    fn unsave(&mut self, title_id: &str) {
        self.watchlist.retain(|id| id != title_id);
    }
}
