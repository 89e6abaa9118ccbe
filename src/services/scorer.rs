use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

use crate::models::{InteractionEvent, Title, UserTasteProfile};

const CONTENT_WEIGHT: f64 = 0.45;
const EXPLICIT_WEIGHT: f64 = 0.35;
const RECENCY_WEIGHT: f64 = 0.20;
const POPULARITY_WEIGHT: f64 = 0.08;

const GENRE_SHARE: f64 = 0.6;
const MOOD_SHARE: f64 = 0.4;
const CROSS_TITLE_FACTOR: f64 = 0.2;

const MORE_LIKE_NUDGE: f64 = 0.07;
const LESS_LIKE_NUDGE: f64 = 0.08;

/// Half-life-like decay period for interaction weight, in days
const RECENCY_DECAY_DAYS: f64 = 7.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

const EXPLICIT_FIT_REASON_THRESHOLD: f64 = 0.7;
const QUICK_WATCH_MAX_RUNTIME: u32 = 50;
const TRENDING_MIN_POPULARITY: f64 = 90.0;

pub(crate) fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Recency-weighted action signal per title id
///
/// Built once per feed. Each interaction contributes
/// `base_weight / (1 + age_days / 7)` to its title and contributions sum.
/// Ordered so that iteration, and therefore float summation, is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffinityMap {
    affinities: BTreeMap<String, f64>,
}

impl AffinityMap {
    pub fn from_interactions(interactions: &[InteractionEvent], now: DateTime<Utc>) -> Self {
        let affinities = interactions
            .iter()
            .fold(BTreeMap::new(), |mut acc, interaction| {
                let age_seconds = (now - interaction.timestamp).num_milliseconds() as f64 / 1000.0;
                let age_days = (age_seconds / SECONDS_PER_DAY).max(0.0);
                let recency = 1.0 / (1.0 + age_days / RECENCY_DECAY_DAYS);

                *acc.entry(interaction.title_id.clone()).or_insert(0.0) +=
                    interaction.action.base_weight() * recency;
                acc
            });

        Self { affinities }
    }

    /// Affinity toward a title, zero when it was never interacted with
    pub fn get(&self, title_id: &str) -> f64 {
        self.affinities.get(title_id).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.affinities.iter().map(|(id, value)| (id.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.affinities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.affinities.is_empty()
    }
}

/// Result of scoring a single candidate
#[derive(Debug, Clone, PartialEq)]
pub struct TitleScore {
    /// Relevance in [0, 1]; 0 when hard-blocked
    pub score: f64,
    pub hard_blocked: bool,
    /// Justifications in priority order
    pub reasons: Vec<String>,
}

impl TitleScore {
    fn blocked(reason: &str) -> Self {
        Self {
            score: 0.0,
            hard_blocked: true,
            reasons: vec![reason.to_string()],
        }
    }
}

/// Returns the reason a title is excluded outright, if any
///
/// Checks run in a fixed order and the first failing rule wins.
fn hard_block_reason(title: &Title, profile: &UserTasteProfile) -> Option<&'static str> {
    if profile
        .blocked_genres
        .iter()
        .any(|genre| title.has_genre(genre))
    {
        return Some("Blocked genre preference");
    }

    if let Some(window) = profile.runtime_pref {
        if !window.contains(title.runtime) {
            return Some("Outside runtime preference");
        }
    }

    if !profile.language_pref.is_empty() && !profile.language_pref.contains(&title.language) {
        return Some("Outside language preference");
    }

    None
}

/// True if `anchor_id` names a favorite sharing at least one genre with `title`
fn anchor_shares_genre(anchor_id: Option<&str>, title: &Title, favorite_titles: &[&Title]) -> bool {
    let Some(anchor_id) = anchor_id else {
        return false;
    };

    favorite_titles
        .iter()
        .find(|favorite| favorite.id == anchor_id)
        .is_some_and(|favorite| favorite.shared_genre_count(title) > 0)
}

/// Scores one candidate title against a profile and interaction history
pub fn score_title(
    title: &Title,
    profile: &UserTasteProfile,
    affinity: &AffinityMap,
    favorite_titles: &[&Title],
) -> TitleScore {
    if let Some(reason) = hard_block_reason(title, profile) {
        return TitleScore::blocked(reason);
    }

    let favorite_genres: HashSet<&str> = favorite_titles
        .iter()
        .flat_map(|favorite| favorite.genres.iter().map(String::as_str))
        .collect();
    let vibes: HashSet<&str> = profile.vibe_chips.iter().map(String::as_str).collect();

    let overlapping_genres: Vec<&str> = title
        .genres
        .iter()
        .map(String::as_str)
        .filter(|genre| favorite_genres.contains(genre))
        .collect();
    let overlapping_moods: Vec<&str> = title
        .moods
        .iter()
        .map(String::as_str)
        .filter(|mood| vibes.contains(mood))
        .collect();

    let genre_ratio = overlapping_genres.len() as f64 / title.genres.len().max(1) as f64;
    let mood_ratio = overlapping_moods.len() as f64 / profile.vibe_chips.len().max(1) as f64;
    let content_similarity = clamp(GENRE_SHARE * genre_ratio + MOOD_SHARE * mood_ratio, 0.0, 1.0);

    let direct_affinity = affinity.get(&title.id);
    let explicit_fit = clamp((direct_affinity + 1.0) / 2.0, 0.0, 1.0);

    let cross_title: f64 = affinity
        .iter()
        .filter(|(id, _)| *id != title.id)
        .filter_map(|(id, value)| {
            favorite_titles
                .iter()
                .find(|favorite| favorite.id == id)
                .map(|favorite| favorite.shared_genre_count(title) as f64 * value * CROSS_TITLE_FACTOR)
        })
        .sum();
    let recency_signal = clamp(direct_affinity + cross_title, -1.0, 1.0);
    let recency_fit = (recency_signal + 1.0) / 2.0;

    let popularity_nudge = clamp(title.popularity / 100.0, 0.0, 1.0) * POPULARITY_WEIGHT;

    let mut score = content_similarity * CONTENT_WEIGHT
        + explicit_fit * EXPLICIT_WEIGHT
        + recency_fit * RECENCY_WEIGHT
        + popularity_nudge;

    // Both nudges overlap with the cross-title signal on shared genres; kept as-is.
    if anchor_shares_genre(profile.more_like_title_id.as_deref(), title, favorite_titles) {
        score += MORE_LIKE_NUDGE;
    }
    if anchor_shares_genre(profile.less_like_title_id.as_deref(), title, favorite_titles) {
        score -= LESS_LIKE_NUDGE;
    }

    let mut reasons = Vec::new();
    if let Some(genre) = overlapping_genres.first() {
        reasons.push(format!("{} match", genre));
    }
    if let Some(mood) = overlapping_moods.first() {
        reasons.push(format!("{} vibe", mood));
    }
    if explicit_fit > EXPLICIT_FIT_REASON_THRESHOLD {
        reasons.push("Fits your recent likes".to_string());
    }
    if title.runtime <= QUICK_WATCH_MAX_RUNTIME {
        reasons.push("Quick watch runtime".to_string());
    }
    if title.popularity >= TRENDING_MIN_POPULARITY {
        reasons.push("Trending in catalog".to_string());
    }

    TitleScore {
        score: clamp(score, 0.0, 1.0),
        hard_blocked: false,
        reasons,
    }
}
