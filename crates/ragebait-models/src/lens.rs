//! Narrative lenses applied to generated commentary.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in comedy lenses offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Lens {
    /// David Attenborough style narration
    #[default]
    NatureDocumentary,
    /// Heist movie thriller
    HeistMovie,
    /// Confused alien anthropologist
    AlienAnthropologist,
    /// Enthusiastic cooking show host
    CookingShow,
    /// Shakespearean tragedy
    Shakespearean,
    /// Corporate meeting business speak
    CorporateMeeting,
    /// True crime podcast host
    TrueCrime,
}

impl Lens {
    pub const ALL: &'static [Lens] = &[
        Lens::NatureDocumentary,
        Lens::HeistMovie,
        Lens::AlienAnthropologist,
        Lens::CookingShow,
        Lens::Shakespearean,
        Lens::CorporateMeeting,
        Lens::TrueCrime,
    ];

    /// Identifier sent to the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lens::NatureDocumentary => "nature_documentary",
            Lens::HeistMovie => "heist_movie",
            Lens::AlienAnthropologist => "alien_anthropologist",
            Lens::CookingShow => "cooking_show",
            Lens::Shakespearean => "shakespearean",
            Lens::CorporateMeeting => "corporate_meeting",
            Lens::TrueCrime => "true_crime",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Lens::NatureDocumentary => "Nature Documentary",
            Lens::HeistMovie => "Heist Movie",
            Lens::AlienAnthropologist => "Alien Anthropologist",
            Lens::CookingShow => "Cooking Show",
            Lens::Shakespearean => "Shakespearean Tragedy",
            Lens::CorporateMeeting => "Corporate Meeting",
            Lens::TrueCrime => "True Crime",
        }
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Lens {
    type Err = LensParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Lens::ALL
            .iter()
            .copied()
            .find(|lens| lens.as_str() == normalized)
            .ok_or_else(|| LensParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown lens: {0}")]
pub struct LensParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_loose_spelling() {
        assert_eq!("nature_documentary".parse::<Lens>().unwrap(), Lens::NatureDocumentary);
        assert_eq!("Heist-Movie".parse::<Lens>().unwrap(), Lens::HeistMovie);
        assert_eq!(" true crime ".parse::<Lens>().unwrap(), Lens::TrueCrime);
        assert!("sitcom".parse::<Lens>().is_err());
    }

    #[test]
    fn test_display_matches_serde() {
        for lens in Lens::ALL {
            let json = serde_json::to_string(lens).unwrap();
            assert_eq!(json, format!("\"{}\"", lens));
        }
    }
}
