use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

const DEFAULT_SCHEME: &str = "https://";

static SCHEME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid scheme regex"));

/// Lower-cased host component of a normalised link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalHost(String);

impl CanonicalHost {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalHost {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A submitted link after scheme normalisation, together with its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLink {
    /// The link as it is shown to the model and in the notification.
    pub link: String,
    pub host: CanonicalHost,
}

#[derive(Debug, Error)]
pub enum InvalidLinkError {
    #[error("link is empty")]
    Empty,
    #[error("link {link:?} could not be parsed: {source}")]
    Unparseable {
        link: String,
        #[source]
        source: url::ParseError,
    },
    #[error("link {link:?} has no host")]
    MissingHost { link: String },
}

/// Prepends `https://` when the raw link carries no `scheme://` prefix.
pub fn normalize(raw_link: &str) -> String {
    let trimmed = raw_link.trim();
    if SCHEME_PREFIX.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    }
}

pub fn parse_link(raw_link: &str) -> Result<NormalizedLink, InvalidLinkError> {
    if raw_link.trim().is_empty() {
        return Err(InvalidLinkError::Empty);
    }

    let link = normalize(raw_link);
    let url = match Url::parse(&link) {
        Ok(url) => url,
        Err(source) => return Err(InvalidLinkError::Unparseable { link, source }),
    };

    let host = match url.host_str() {
        // A fully-qualified `evil.test.` names the same host as `evil.test`.
        Some(host) if !host.trim_end_matches('.').is_empty() => {
            host.strip_suffix('.').unwrap_or(host).to_lowercase()
        }
        _ => return Err(InvalidLinkError::MissingHost { link }),
    };

    Ok(NormalizedLink {
        link,
        host: CanonicalHost(host),
    })
}

pub fn extract(raw_link: &str) -> Result<CanonicalHost, InvalidLinkError> {
    parse_link(raw_link).map(|parsed| parsed.host)
}
