//! Domain types shared by every stage.
//!
//! This module defines:
//!
//! - the published datasets and their column conventions (`Dataset`)
//! - the filtered, date-sorted rows handed to the renderer (`Series`)

pub mod types;

pub use types::*;
