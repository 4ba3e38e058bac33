//! Local link classification: host extraction plus the allow/block policy.

pub mod extract;
pub mod policy;

pub use extract::{extract, normalize, parse_link, CanonicalHost, InvalidLinkError, NormalizedLink};
pub use policy::classify;
