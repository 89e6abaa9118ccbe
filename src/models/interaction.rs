use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User action on a feed card
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SwipeAction {
    Like,
    Pass,
    SuperLike,
    Save,
    Unsave,
}

impl SwipeAction {
    /// Signed base weight of the action before recency decay
    pub fn base_weight(self) -> f64 {
        match self {
            SwipeAction::Like => 1.0,
            SwipeAction::Pass => -0.7,
            SwipeAction::SuperLike => 1.4,
            SwipeAction::Save => 1.2,
            SwipeAction::Unsave => -0.5,
        }
    }
}

/// Where an interaction happened
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionContext {
    pub screen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_rank: Option<u32>,
}

impl InteractionContext {
    pub fn screen(screen: &str) -> Self {
        Self {
            screen: screen.to_string(),
            card_rank: None,
        }
    }
}

/// A recorded user action on a title. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionEvent {
    pub user_id: String,
    pub title_id: String,
    pub action: SwipeAction,
    pub timestamp: DateTime<Utc>,
    pub context: InteractionContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&SwipeAction::SuperLike).unwrap();
        assert_eq!(json, "\"super_like\"");

        let action: SwipeAction = serde_json::from_str("\"unsave\"").unwrap();
        assert_eq!(action, SwipeAction::Unsave);
    }

    #[test]
    fn test_base_weights() {
        assert_eq!(SwipeAction::Like.base_weight(), 1.0);
        assert_eq!(SwipeAction::Pass.base_weight(), -0.7);
        assert_eq!(SwipeAction::SuperLike.base_weight(), 1.4);
        assert_eq!(SwipeAction::Save.base_weight(), 1.2);
        assert_eq!(SwipeAction::Unsave.base_weight(), -0.5);
    }

    #[test]
    fn test_event_deserializes_iso_timestamp() {
        let json = r#"{
            "user_id": "anon_1",
            "title_id": "t1",
            "action": "like",
            "timestamp": "2026-01-02T03:04:05.000Z",
            "context": { "screen": "SwipeFeed", "card_rank": 2 }
        }"#;

        let event: InteractionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.action, SwipeAction::Like);
        assert_eq!(event.context.card_rank, Some(2));
        assert_eq!(event.timestamp.to_rfc3339(), "2026-01-02T03:04:05+00:00");
    }
}
