//! Insight layer for the desk activity dashboard.
//!
//! Talks to an OpenAI-compatible completion endpoint: builds prompts from
//! aggregated activity data, runs one-shot insight generation and keeps
//! the chat history for the current run.

pub mod client;
pub mod prompt;
pub mod session;

pub use desk_core as core;
pub use desk_data as data;
