//! Sample validation.
//!
//! A fixed, ordered rule set decides whether a pushed sample is physically
//! plausible. Only the first failing rule is reported.
//!
//! Components:
//! - `types`: `ValidationOutcome` and the `Rejection` it carries.
//! - `validator`: the rule set and the published expected ranges.

pub mod types;
pub mod validator;

pub use types::{Rejection, ValidationOutcome};
pub use validator::validate;
