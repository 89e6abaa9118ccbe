use serde::{Deserialize, Deserializer, Serialize};

/// Inclusive runtime window in minutes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimePreference {
    pub min: u32,
    pub max: u32,
}

impl RuntimePreference {
    pub fn contains(&self, runtime: u32) -> bool {
        runtime >= self.min && runtime <= self.max
    }
}

/// A user's taste profile
///
/// Collected during onboarding and edited from the preferences screen. The
/// feed engine treats it as a read-only snapshot per build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserTasteProfile {
    #[serde(default)]
    pub favorite_title_ids: Vec<String>,
    #[serde(default)]
    pub vibe_chips: Vec<String>,
    #[serde(default)]
    pub blocked_genres: Vec<String>,
    /// `None` means any runtime
    #[serde(default)]
    pub runtime_pref: Option<RuntimePreference>,
    /// Empty means any language
    #[serde(default)]
    pub language_pref: Vec<String>,
    /// 0-100. Not consumed by scoring yet.
    #[serde(default = "default_mood_intensity")]
    pub mood_intensity: u8,
    #[serde(default)]
    pub more_like_title_id: Option<String>,
    #[serde(default)]
    pub less_like_title_id: Option<String>,
}

/// Upper bound of `mood_intensity`
pub const MAX_MOOD_INTENSITY: u32 = 100;

fn default_mood_intensity() -> u8 {
    50
}

impl Default for UserTasteProfile {
    fn default() -> Self {
        Self {
            favorite_title_ids: Vec::new(),
            vibe_chips: Vec::new(),
            blocked_genres: Vec::new(),
            runtime_pref: None,
            language_pref: Vec::new(),
            mood_intensity: default_mood_intensity(),
            more_like_title_id: None,
            less_like_title_id: None,
        }
    }
}

impl UserTasteProfile {
    /// Profile for a fresh session, restricted to a single language
    pub fn with_language(language: &str) -> Self {
        Self {
            language_pref: vec![language.to_string()],
            ..Self::default()
        }
    }

    pub fn is_favorite(&self, title_id: &str) -> bool {
        self.favorite_title_ids.iter().any(|id| id == title_id)
    }

    /// Applies a partial update; fields absent from the patch are left as-is
    pub fn apply_patch(&mut self, patch: ProfilePatch) {
        if let Some(favorite_title_ids) = patch.favorite_title_ids {
            self.favorite_title_ids = favorite_title_ids;
        }
        if let Some(vibe_chips) = patch.vibe_chips {
            self.vibe_chips = vibe_chips;
        }
        if let Some(blocked_genres) = patch.blocked_genres {
            self.blocked_genres = blocked_genres;
        }
        if let Some(runtime_pref) = patch.runtime_pref {
            self.runtime_pref = runtime_pref;
        }
        if let Some(language_pref) = patch.language_pref {
            self.language_pref = language_pref;
        }
        if let Some(mood_intensity) = patch.mood_intensity {
            self.mood_intensity = u8::try_from(mood_intensity.min(MAX_MOOD_INTENSITY)).unwrap_or(u8::MAX);
        }
        if let Some(more_like_title_id) = patch.more_like_title_id {
            self.more_like_title_id = more_like_title_id;
        }
        if let Some(less_like_title_id) = patch.less_like_title_id {
            self.less_like_title_id = less_like_title_id;
        }
    }
}

/// Partial profile update
///
/// Nullable profile fields use `Option<Option<T>>` so that an explicit `null`
/// clears the value while an absent key leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProfilePatch {
    #[serde(default)]
    pub favorite_title_ids: Option<Vec<String>>,
    #[serde(default)]
    pub vibe_chips: Option<Vec<String>>,
    #[serde(default)]
    pub blocked_genres: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub runtime_pref: Option<Option<RuntimePreference>>,
    #[serde(default)]
    pub language_pref: Option<Vec<String>>,
    /// Wider than the profile field so out-of-range input can be rejected with a message
    #[serde(default)]
    pub mood_intensity: Option<u32>,
    #[serde(default, deserialize_with = "double_option")]
    pub more_like_title_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub less_like_title_id: Option<Option<String>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
