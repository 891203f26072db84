//! Terminal UI layer for the deskboard dashboard.
//!
//! Provides themes, the shared header, the roster, chart and insight views,
//! and the main application event loop built on top of [`ratatui`] for
//! rendering service-desk activity in the terminal.

pub mod app;
pub mod chart_view;
pub mod header;
pub mod insight_view;
pub mod roster_view;
pub mod themes;

pub use desk_core as core;
