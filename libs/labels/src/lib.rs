//! # frontdoor-labels
//!
//! Label keys and label values for the selectors frontdoor writes onto
//! front-end Deployments.
//!
//! ## Design Principles
//!
//! - Values that end up in a label selector are parsed once, at the edge
//! - A parsed value is always accepted by the API server's label validation
//! - Workload names and generation hashes are distinct types so one cannot be
//!   passed where the other is expected
//!
//! ## Format
//!
//! Label values are at most 63 characters, start and end with an
//! alphanumeric character, and contain only alphanumerics, `-`, `_` and `.`
//! in between. Label keys are `[prefix/]name` where the optional prefix is a
//! lowercase DNS subdomain.

mod error;
mod macros;
mod types;

pub use error::LabelError;
pub use types::*;
