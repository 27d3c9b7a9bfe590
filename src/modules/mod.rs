//! Presentation modules shared by the TUI and one-shot mode
//!
//! - export: JSON and CSV export of a search report
//! - render: links, time and unit formatting, plain-text report

pub mod export;
pub mod render;
