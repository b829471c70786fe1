//! Local filesystem helpers.
//!
//! - staged CSV ingest + filtering (`ingest`)
//! - output directory creation (`dirs`)

pub mod dirs;
pub mod ingest;

pub use dirs::*;
pub use ingest::*;
