//! Curated highlight catalog entries.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highlight catalog category.
///
/// Category codes (11-16) are the legacy video-category table ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum HighlightCategory {
    /// KBO league games
    #[default]
    Kbo,
    KBaseballSeries,
    AsianGames,
    Olympics,
    Premier12,
    Wbc,
}

impl HighlightCategory {
    /// Legacy category code.
    pub fn code(&self) -> u16 {
        match self {
            HighlightCategory::Kbo => 11,
            HighlightCategory::KBaseballSeries => 12,
            HighlightCategory::AsianGames => 13,
            HighlightCategory::Olympics => 14,
            HighlightCategory::Premier12 => 15,
            HighlightCategory::Wbc => 16,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            11 => Some(HighlightCategory::Kbo),
            12 => Some(HighlightCategory::KBaseballSeries),
            13 => Some(HighlightCategory::AsianGames),
            14 => Some(HighlightCategory::Olympics),
            15 => Some(HighlightCategory::Premier12),
            16 => Some(HighlightCategory::Wbc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightCategory::Kbo => "kbo",
            HighlightCategory::KBaseballSeries => "k_baseball_series",
            HighlightCategory::AsianGames => "asian_games",
            HighlightCategory::Olympics => "olympics",
            HighlightCategory::Premier12 => "premier12",
            HighlightCategory::Wbc => "wbc",
        }
    }

    /// Parse a category name as used in query strings.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kbo" => Some(HighlightCategory::Kbo),
            "k_baseball_series" => Some(HighlightCategory::KBaseballSeries),
            "asian_games" => Some(HighlightCategory::AsianGames),
            "olympics" => Some(HighlightCategory::Olympics),
            "premier12" => Some(HighlightCategory::Premier12),
            "wbc" => Some(HighlightCategory::Wbc),
            _ => None,
        }
    }
}

/// A curated highlight video users can browse and play.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HighlightRecord {
    pub highlight_id: String,
    pub title: String,
    pub category: HighlightCategory,
    /// Object storage key of the video asset
    pub file_key: String,
    pub match_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl HighlightRecord {
    pub fn new(
        title: impl Into<String>,
        category: HighlightCategory,
        file_key: impl Into<String>,
        match_date: DateTime<Utc>,
    ) -> Self {
        Self {
            highlight_id: Uuid::new_v4().to_string(),
            title: title.into(),
            category,
            file_key: file_key.into(),
            match_date,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes() {
        for cat in [
            HighlightCategory::Kbo,
            HighlightCategory::KBaseballSeries,
            HighlightCategory::AsianGames,
            HighlightCategory::Olympics,
            HighlightCategory::Premier12,
            HighlightCategory::Wbc,
        ] {
            assert_eq!(HighlightCategory::from_code(cat.code()), Some(cat));
        }
        assert_eq!(HighlightCategory::from_code(10), None);
    }
}
