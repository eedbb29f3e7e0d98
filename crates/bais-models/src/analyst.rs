//! Commentary analyst personas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A commentary persona selectable for generated narration.
///
/// Persona codes (17-19) are the local identifiers shared with the
/// legacy commentator-code table; the analysis service uses its own
/// selector ids, see [`Analyst::remote_select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Analyst {
    /// Veteran play-by-play persona (default)
    #[default]
    ParkChanO,
    LeeSunChil,
    KimSeonO,
}

impl Analyst {
    /// Local persona code (legacy COMMENTATOR group).
    pub fn code(&self) -> u16 {
        match self {
            Analyst::ParkChanO => 17,
            Analyst::LeeSunChil => 18,
            Analyst::KimSeonO => 19,
        }
    }

    /// Selector id expected by the analysis service.
    pub fn remote_select(&self) -> u8 {
        match self {
            Analyst::ParkChanO => 3,
            Analyst::LeeSunChil => 2,
            Analyst::KimSeonO => 1,
        }
    }

    /// Parse a local persona code, falling back to the default persona.
    pub fn from_code(code: u16) -> Self {
        match code {
            18 => Analyst::LeeSunChil,
            19 => Analyst::KimSeonO,
            _ => Analyst::ParkChanO,
        }
    }

    /// Parse a display name as submitted by the upload form.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Lee Sun-chil" => Analyst::LeeSunChil,
            "Kim Seon-o" => Analyst::KimSeonO,
            _ => Analyst::ParkChanO,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Analyst::ParkChanO => "Park Chan-o",
            Analyst::LeeSunChil => "Lee Sun-chil",
            Analyst::KimSeonO => "Kim Seon-o",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Analyst::ParkChanO => "park_chan_o",
            Analyst::LeeSunChil => "lee_sun_chil",
            Analyst::KimSeonO => "kim_seon_o",
        }
    }
}

impl fmt::Display for Analyst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_selector_mapping() {
        assert_eq!(Analyst::ParkChanO.remote_select(), 3);
        assert_eq!(Analyst::LeeSunChil.remote_select(), 2);
        assert_eq!(Analyst::KimSeonO.remote_select(), 1);
    }

    #[test]
    fn test_code_round_trip() {
        for analyst in [Analyst::ParkChanO, Analyst::LeeSunChil, Analyst::KimSeonO] {
            assert_eq!(Analyst::from_code(analyst.code()), analyst);
        }
        // Unknown codes fall back to the default persona
        assert_eq!(Analyst::from_code(99), Analyst::ParkChanO);
    }

    #[test]
    fn test_from_name_fallback() {
        assert_eq!(Analyst::from_name("Kim Seon-o"), Analyst::KimSeonO);
        assert_eq!(Analyst::from_name("unknown"), Analyst::ParkChanO);
    }
}
