//! Core domain layer for the deskboard dashboard.
//!
//! Holds the activity data model and the handled-by identity parser, plus the
//! ambient concerns shared by every crate: CLI settings with last-used
//! persistence, the error taxonomy, and display formatting helpers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
