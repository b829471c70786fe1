//! Remote data acquisition.
//!
//! - HTTP source abstraction + `reqwest` client (`fetch`)
//! - per-dataset freshness check and staging (`fetch`)

pub mod fetch;

pub use fetch::*;
