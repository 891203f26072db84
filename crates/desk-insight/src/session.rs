//! Chat state for the insight view.

// ── ChatTurn ──────────────────────────────────────────────────────────────────

/// One question / answer exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

// ── ChatSession ───────────────────────────────────────────────────────────────

/// Conversation history for the current dashboard run.
///
/// The history is display state only: every question goes to the endpoint
/// with the current data context, never with earlier turns. The owner runs
/// the round trip through [`crate::client::CompletionClient`] and records
/// the exchange here once the answer lands.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    /// Completed exchanges, oldest first.
    pub turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one completed exchange.
    ///
    /// Only successful round trips belong in the history; failed calls are
    /// surfaced by the caller and never recorded.
    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(ChatTurn {
            question: question.into(),
            answer: answer.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
