//! `covid-tracker` library crate.
//!
//! The binary (`covidtracker`) is a thin wrapper around this library so that
//! each stage (fetch, load, render) is testable without the network or a
//! terminal.

pub mod app;
pub mod chart;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod term;
