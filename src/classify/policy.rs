use crate::domain::{DomainList, Verdict};

use super::CanonicalHost;

/// Decides a verdict from the local lists alone.
///
/// The blocklist is consulted first, so a host present in both lists is
/// blacklisted. `None` means neither list knows the host.
pub fn classify(
    host: &CanonicalHost,
    blocklist: &DomainList,
    allowlist: &DomainList,
) -> Option<Verdict> {
    if blocklist.contains(host.as_str()) {
        Some(Verdict::Blacklisted)
    } else if allowlist.contains(host.as_str()) {
        Some(Verdict::Whitelisted)
    } else {
        None
    }
}
