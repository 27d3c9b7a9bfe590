//! Humanity DAO governance status checker
//!
//! Resolves a proposal identifier or applicant address into a normalized view
//! of the proposal, its votes, removed votes and applications.

pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod modules;
