//! Freed/locked decisions.
//!
//! Two layers: [`matches_filter`] tests one candidate against one user
//! pattern, and [`classify`] applies the list rules in their fixed order.
//!
//! # Rule order
//!
//! 1. sender in `black_from`
//! 2. subject in `black_subject`
//! 3. sender in `white_from`
//! 4. subject in `white_subject`
//! 5. sender matches a `white_from` pattern
//! 6. subject matches a `white_subject` pattern
//! 7. default: locked
//!
//! Deny lists are only ever compared exactly.

mod engine;
mod pattern;

pub use engine::{Decision, Reason, Verdict, classify, folder_override, sender_key};
pub use pattern::matches_filter;
