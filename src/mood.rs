//! Maps a free-text vibe to the target valence used when asking Spotify for recommendations.
//!
//! A [MoodTable] is an ordered list of keyword rules with a baseline. The first rule whose keyword appears in the vibe
//! decides the valence; if none match, the baseline is used.

use std::{fmt, str::FromStr};

use thiserror::Error;

pub const DEFAULT_VALENCE: f32 = 0.5;
pub const HAPPY_VALENCE: f32 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct MoodRule {
    pub keyword: String,
    pub target_valence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodTable {
    rules: Vec<MoodRule>,
    default_valence: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoodRuleError {
    #[error("mood rule '{0}' is not in the form keyword=valence")]
    Malformed(String),
    #[error("mood rule '{0}' has an empty keyword")]
    EmptyKeyword(String),
    #[error("valence '{0}' is not a number between 0 and 1")]
    InvalidValence(String),
}

impl MoodTable {
    pub fn new(rules: Vec<MoodRule>, default_valence: f32) -> Self {
        Self { rules, default_valence }
    }

    pub fn with_default_valence(self, default_valence: f32) -> Self {
        Self {
            default_valence,
            ..self
        }
    }

    /// The target valence for a vibe. Keywords match case-sensitively anywhere in the vibe.
    pub fn target_valence(&self, vibe: &str) -> f32 {
        self.rules
            .iter()
            .find(|rule| vibe.contains(rule.keyword.as_str()))
            .map(|rule| rule.target_valence)
            .unwrap_or(self.default_valence)
    }

    pub fn rules(&self) -> &[MoodRule] {
        &self.rules
    }

    pub fn default_valence(&self) -> f32 {
        self.default_valence
    }
}

impl Default for MoodTable {
    fn default() -> Self {
        Self::new(
            vec![MoodRule {
                keyword: String::from("happy"),
                target_valence: HAPPY_VALENCE,
            }],
            DEFAULT_VALENCE,
        )
    }
}

/// Parses a comma-separated list of `keyword=valence` rules, such as `happy=0.8,sad=0.2`. The order of the list is the
/// order the rules are evaluated in. The default valence is [DEFAULT_VALENCE].
impl FromStr for MoodTable {
    type Err = MoodRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rules = s
            .split(',')
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<MoodRule>, _>>()?;

        Ok(Self::new(rules, DEFAULT_VALENCE))
    }
}

impl FromStr for MoodRule {
    type Err = MoodRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (keyword, valence) = s
            .split_once('=')
            .ok_or_else(|| MoodRuleError::Malformed(s.to_owned()))?;

        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(MoodRuleError::EmptyKeyword(s.to_owned()));
        }

        Ok(Self {
            keyword: keyword.to_owned(),
            target_valence: parse_valence(valence)?,
        })
    }
}

/// Parses a valence, which has to be a number in `[0, 1]`.
pub fn parse_valence(s: &str) -> Result<f32, MoodRuleError> {
    match s.trim().parse::<f32>() {
        Ok(valence) if (0.0..=1.0).contains(&valence) => Ok(valence),
        _ => Err(MoodRuleError::InvalidValence(s.trim().to_owned())),
    }
}

impl fmt::Display for MoodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }

            write!(f, "{}={}", rule.keyword, rule.target_valence)?;
        }

        write!(f, " (default {})", self.default_valence)
    }
}
