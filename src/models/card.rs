use serde::{Deserialize, Serialize};

/// Coarse confidence bucket derived from the match score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecConfidence {
    High,
    Medium,
    Low,
}

impl RecConfidence {
    pub const HIGH_THRESHOLD: f64 = 0.72;
    pub const MEDIUM_THRESHOLD: f64 = 0.48;

    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            RecConfidence::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            RecConfidence::Medium
        } else {
            RecConfidence::Low
        }
    }
}

/// One recommendation in a feed page
///
/// `exploration_pick` is always `confidence == Low`; build cards through the
/// feed builder rather than by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationCard {
    /// `<title_id>-<absolute position>`, unique within a feed
    pub id: String,
    pub title_id: String,
    pub title_name: String,
    pub poster_url: String,
    pub year: i32,
    pub genres: Vec<String>,
    pub runtime: u32,
    /// 0-1, rounded to 3 decimals
    pub match_score: f64,
    pub why_tags: Vec<String>,
    pub confidence: RecConfidence,
    pub availability_hint: String,
    pub exploration_pick: bool,
}
