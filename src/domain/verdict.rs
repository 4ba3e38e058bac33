use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MODEL_PREFIX: &str = "llm:";

/// Classification outcome for a submitted link.
///
/// Stored in the submission document as a plain string: `blacklisted`,
/// `whitelisted`, `llm:<text>`, `invalid` or `unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Verdict {
    Blacklisted,
    Whitelisted,
    /// Free-text answer from the remote model, trimmed but otherwise untouched.
    Model(String),
    Invalid,
    /// Remote classification failed.
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Blacklisted => f.write_str("blacklisted"),
            Verdict::Whitelisted => f.write_str("whitelisted"),
            Verdict::Model(text) => write!(f, "{MODEL_PREFIX}{text}"),
            Verdict::Invalid => f.write_str("invalid"),
            Verdict::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unrecognised verdict annotation: {0:?}")]
pub struct ParseVerdictError(String);

impl FromStr for Verdict {
    type Err = ParseVerdictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blacklisted" => Ok(Verdict::Blacklisted),
            "whitelisted" => Ok(Verdict::Whitelisted),
            "invalid" => Ok(Verdict::Invalid),
            "unknown" => Ok(Verdict::Unknown),
            other => other
                .strip_prefix(MODEL_PREFIX)
                .map(|text| Verdict::Model(text.to_string()))
                .ok_or_else(|| ParseVerdictError(other.to_string())),
        }
    }
}

impl From<Verdict> for String {
    fn from(verdict: Verdict) -> Self {
        verdict.to_string()
    }
}

impl TryFrom<String> for Verdict {
    type Error = ParseVerdictError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
