pub mod lists;
pub mod submission;
pub mod verdict;

pub use lists::{DomainList, DomainLists};
pub use submission::Submission;
pub use verdict::Verdict;
