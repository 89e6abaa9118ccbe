use serde::{Deserialize, Serialize};

/// A movie or series in the static catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Title {
    /// Stable catalog identifier (e.g. "t-dune-2021")
    pub id: String,
    pub title_name: String,
    pub year: i32,
    /// Ordered genres; the first entry is the primary genre
    pub genres: Vec<String>,
    /// Runtime in minutes
    pub runtime: u32,
    /// Language code (e.g. "en")
    pub language: String,
    #[serde(default)]
    pub moods: Vec<String>,
    /// Catalog popularity, 0-100
    pub popularity: f64,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub availability_hint: String,
}

impl Title {
    /// Returns the primary genre, or an empty string for untagged titles
    pub fn primary_genre(&self) -> &str {
        self.genres.first().map(String::as_str).unwrap_or("")
    }

    /// Counts the genres this title shares with another
    pub fn shared_genre_count(&self, other: &Title) -> usize {
        self.genres
            .iter()
            .filter(|genre| other.genres.contains(genre))
            .count()
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Title;

    /// Builds a minimal title for tests
    pub fn title(id: &str, genres: &[&str], runtime: u32, language: &str, popularity: f64) -> Title {
        Title {
            id: id.to_string(),
            title_name: format!("Title {}", id),
            year: 2020,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            runtime,
            language: language.to_string(),
            moods: Vec::new(),
            popularity,
            synopsis: String::new(),
            cast: Vec::new(),
            poster_url: format!("https://img.example/{}.jpg", id),
            availability_hint: "Streaming".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::title;
    use super::*;

    #[test]
    fn test_primary_genre() {
        let t = title("a", &["Drama", "Crime"], 90, "en", 50.0);
        assert_eq!(t.primary_genre(), "Drama");
    }

    #[test]
    fn test_primary_genre_empty() {
        let t = title("a", &[], 90, "en", 50.0);
        assert_eq!(t.primary_genre(), "");
    }

    #[test]
    fn test_shared_genre_count() {
        let a = title("a", &["Drama", "Crime", "Thriller"], 90, "en", 50.0);
        let b = title("b", &["Thriller", "Drama"], 100, "en", 50.0);
        assert_eq!(a.shared_genre_count(&b), 2);
        assert!(a.has_genre("Crime"));
        assert!(!b.has_genre("Crime"));
    }

    #[test]
    fn test_title_deserialization_with_defaults() {
        let json = r#"{
            "id": "t1",
            "title_name": "Arrival",
            "year": 2016,
            "genres": ["Sci-Fi", "Drama"],
            "runtime": 116,
            "language": "en",
            "popularity": 84
        }"#;

        let t: Title = serde_json::from_str(json).unwrap();
        assert_eq!(t.title_name, "Arrival");
        assert_eq!(t.popularity, 84.0);
        assert!(t.moods.is_empty());
        assert!(t.availability_hint.is_empty());
    }
}
