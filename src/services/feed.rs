use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::{
    models::{InteractionEvent, RecConfidence, RecommendationCard, Title, UserTasteProfile},
    services::scorer::{clamp, score_title, AffinityMap},
};

/// Flat penalty for an item sharing its predecessor's primary genre
const DIVERSITY_PENALTY: f64 = 0.12;

const MAX_WHY_TAGS: usize = 3;
const MIN_WHY_TAGS: usize = 2;

const EXPLORATION_FALLBACK_TAGS: [&str; 2] = ["Exploration pick", "Broadening your feed"];
const GENERIC_FALLBACK_TAGS: [&str; 2] = ["Aligned with your selected vibes", "Balanced genre coverage"];

/// Inputs for one feed page
///
/// Everything is borrowed as an immutable snapshot; building a feed has no
/// side effects.
#[derive(Debug, Clone, Copy)]
pub struct FeedRequest<'a> {
    pub titles: &'a [Title],
    pub profile: &'a UserTasteProfile,
    pub interactions: &'a [InteractionEvent],
    pub watchlist: &'a [String],
    pub limit: usize,
    pub offset: usize,
    /// Reference time for interaction recency
    pub now: DateTime<Utc>,
}

/// A ranked candidate after the diversification pass
#[derive(Debug, Clone)]
struct RankedTitle<'a> {
    title: &'a Title,
    score: f64,
    reasons: Vec<String>,
}

/// Builds one page of recommendation cards, using the current time for recency
pub fn build_recommendation_feed(
    titles: &[Title],
    profile: &UserTasteProfile,
    interactions: &[InteractionEvent],
    watchlist: &[String],
    limit: usize,
    offset: usize,
) -> Vec<RecommendationCard> {
    build_feed(FeedRequest {
        titles,
        profile,
        interactions,
        watchlist,
        limit,
        offset,
        now: Utc::now(),
    })
}

/// Builds one page of recommendation cards
///
/// The whole catalog is scored, filtered, ranked and diversified on every
/// call, and only then sliced to `[offset, offset + limit)`. Consecutive pages
/// therefore concatenate to exactly the larger page.
pub fn build_feed(request: FeedRequest<'_>) -> Vec<RecommendationCard> {
    let favorite_titles: Vec<&Title> = request
        .titles
        .iter()
        .filter(|title| request.profile.is_favorite(&title.id))
        .collect();
    let affinity = AffinityMap::from_interactions(request.interactions, request.now);
    let saved: HashSet<&str> = request.watchlist.iter().map(String::as_str).collect();

    let mut ranked: Vec<RankedTitle<'_>> = request
        .titles
        .iter()
        .filter(|title| !saved.contains(title.id.as_str()))
        .filter_map(|title| {
            let scored = score_title(title, request.profile, &affinity, &favorite_titles);
            (!scored.hard_blocked).then_some(RankedTitle {
                title,
                score: scored.score,
                reasons: scored.reasons,
            })
        })
        .collect();

    // Stable sort: equal scores keep catalog order so pages do not shift
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let diversified = diversify(ranked);

    tracing::debug!(
        catalog = request.titles.len(),
        eligible = diversified.len(),
        favorites = favorite_titles.len(),
        affinities = affinity.len(),
        offset = request.offset,
        limit = request.limit,
        "Ranked recommendation feed"
    );

    diversified
        .into_iter()
        .skip(request.offset)
        .take(request.limit)
        .enumerate()
        .map(|(index, ranked)| make_card(ranked, request.offset + index))
        .collect()
}

/// Demotes consecutive items sharing a primary genre without reordering
fn diversify(ranked: Vec<RankedTitle<'_>>) -> Vec<RankedTitle<'_>> {
    let (diversified, _) = ranked.into_iter().fold(
        (Vec::new(), String::new()),
        |(mut acc, previous_genre), mut entry| {
            let primary_genre = entry.title.primary_genre().to_string();
            if primary_genre == previous_genre {
                entry.score = clamp(entry.score - DIVERSITY_PENALTY, 0.0, 1.0);
            }
            acc.push(entry);
            (acc, primary_genre)
        },
    );
    diversified
}

fn make_card(ranked: RankedTitle<'_>, position: usize) -> RecommendationCard {
    let confidence = RecConfidence::from_score(ranked.score);
    let exploration_pick = confidence == RecConfidence::Low;
    let title = ranked.title;

    RecommendationCard {
        id: format!("{}-{}", title.id, position),
        title_id: title.id.clone(),
        title_name: title.title_name.clone(),
        poster_url: title.poster_url.clone(),
        year: title.year,
        genres: title.genres.clone(),
        runtime: title.runtime,
        match_score: round_score(ranked.score),
        why_tags: finalize_why_tags(&ranked.reasons, exploration_pick),
        confidence,
        availability_hint: title.availability_hint.clone(),
        exploration_pick,
    }
}

fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// Turns raw scorer reasons into 2-3 distinct, non-empty tags
pub fn finalize_why_tags(reasons: &[String], exploration_pick: bool) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(MAX_WHY_TAGS);
    for reason in reasons {
        if tags.len() == MAX_WHY_TAGS {
            break;
        }
        if !reason.trim().is_empty() && !tags.contains(reason) {
            tags.push(reason.clone());
        }
    }

    if tags.len() >= MIN_WHY_TAGS {
        return tags;
    }

    let fallback = if exploration_pick {
        EXPLORATION_FALLBACK_TAGS
    } else {
        GENERIC_FALLBACK_TAGS
    };
    for tag in fallback {
        if tags.len() == MAX_WHY_TAGS {
            break;
        }
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }

    tags
}

/// Parses a feed cursor into an offset; missing or malformed cursors start at 0
pub fn parse_cursor(cursor: Option<&str>) -> usize {
    cursor
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

/// Cursor for the page after `offset`, or `None` when this page was the last
pub fn next_cursor(offset: usize, limit: usize, returned: usize) -> Option<String> {
    if returned < limit {
        None
    } else {
        Some(offset.saturating_add(limit).to_string())
    }
}
