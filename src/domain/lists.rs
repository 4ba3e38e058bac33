use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Immutable set of canonical host names.
///
/// Entries are trimmed and lower-cased on construction so membership checks
/// line up with the extractor's output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainList {
    domains: HashSet<String>,
}

impl DomainList {
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    pub fn contains(&self, host: &str) -> bool {
        self.domains.contains(host)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// On-disk shape of a list document: `{"domains": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DomainListDocument {
    #[serde(default)]
    pub domains: Vec<String>,
}

impl From<DomainListDocument> for DomainList {
    fn from(doc: DomainListDocument) -> Self {
        DomainList::from_domains(doc.domains)
    }
}

/// Both lookup sets, built once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct DomainLists {
    pub allowlist: DomainList,
    pub blocklist: DomainList,
}

impl DomainLists {
    pub fn new(allowlist: DomainList, blocklist: DomainList) -> Self {
        Self {
            allowlist,
            blocklist,
        }
    }
}
