use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Verdict;

/// One intake request as persisted in the submission store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub link: String,
    #[serde(alias = "telefon")]
    pub phone: String,
    pub timestamp: DateTime<Utc>,
    /// Records written by older intake code carry no flag at all.
    #[serde(default)]
    pub processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

impl Submission {
    pub fn new(link: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            phone: phone.into(),
            timestamp: Utc::now(),
            processed: false,
            verdict: None,
        }
    }

    pub fn mark_processed(&mut self, verdict: Verdict) {
        self.processed = true;
        self.verdict = Some(verdict);
    }
}
