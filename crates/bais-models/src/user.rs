//! User accounts and team preferences.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// KBO league team, selectable as a user's favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Team {
    Lg,
    Hanwha,
    Ssg,
    Samsung,
    Nc,
    Kt,
    Lotte,
    Kia,
    Doosan,
    Kiwoom,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Lg => "LG",
            Team::Hanwha => "HANWHA",
            Team::Ssg => "SSG",
            Team::Samsung => "SAMSUNG",
            Team::Nc => "NC",
            Team::Kt => "KT",
            Team::Lotte => "LOTTE",
            Team::Kia => "KIA",
            Team::Doosan => "DOOSAN",
            Team::Kiwoom => "KIWOOM",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LG" => Some(Team::Lg),
            "HANWHA" => Some(Team::Hanwha),
            "SSG" => Some(Team::Ssg),
            "SAMSUNG" => Some(Team::Samsung),
            "NC" => Some(Team::Nc),
            "KT" => Some(Team::Kt),
            "LOTTE" => Some(Team::Lotte),
            "KIA" => Some(Team::Kia),
            "DOOSAN" => Some(Team::Doosan),
            "KIWOOM" => Some(Team::Kiwoom),
            _ => None,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserRecord {
    pub user_id: String,
    pub email: String,
    /// Salted SHA-256 hex digest
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_team: Option<Team>,
    /// Whether the single free highlight play has been consumed
    #[serde(default)]
    pub free_play_used: bool,
    /// Storage consumed by active uploads, in bytes
    #[serde(default)]
    pub storage_used_bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        favorite_team: Option<Team>,
    ) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            email: email.into(),
            password_hash: password_hash.into(),
            favorite_team,
            free_play_used: false,
            storage_used_bytes: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_parsing() {
        assert_eq!(Team::from_str("lotte"), Some(Team::Lotte));
        assert_eq!(Team::from_str(" KIA "), Some(Team::Kia));
        assert_eq!(Team::from_str("MLB"), None);
    }
}
