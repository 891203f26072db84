//! Prompt construction for insight generation and data chat.
//!
//! Both features send the roster as JSON together with a column guide, so
//! the model reasons over the same numbers the user is looking at.

use desk_data::aggregator::{ActivityTotals, RosterEntry};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Sampling temperature for the one-shot insight generation.
pub const INSIGHT_TEMPERATURE: f64 = 0.7;

/// Sampling temperature for chat answers.
pub const CHAT_TEMPERATURE: f64 = 0.5;

/// Role instruction sent as the system prompt for insight generation and
/// embedded at the top of the chat system prompt.
pub const ANALYST_SYSTEM_PROMPT: &str = "You are an analyst embedded in a \
service-desk activity dashboard. Answer in plain text with no markdown, and \
ground every statement in the data you are given.";

/// Meaning of the roster columns, repeated in every prompt.
const COLUMN_GUIDE: &str = "Column guide: ss_count counts requested services \
handled, wa_count counts completed messaging interactions, total is their \
sum, client_count is distinct clients served, and pct_ss is ss_count divided \
by the configured denominator (distinct clients or total activity).";

// ── Builders ──────────────────────────────────────────────────────────────────

/// User prompt asking for exactly three insights over the full roster.
pub fn build_insight_prompt(roster: &[RosterEntry], totals: &ActivityTotals) -> String {
    format!(
        "Operator activity roster, one JSON object per operator:\n{}\n\n\
         Dataset totals: {} requested services and {} messaging interactions \
         across {} active days.\n\n{}\n\n\
         Write exactly three short insights about this team: the strongest \
         contributors, any imbalance between service and messaging work, and \
         one thing a coordinator should follow up on. One insight per line.",
        roster_json(roster),
        totals.ss_total,
        totals.wa_total,
        totals.distinct_days,
        COLUMN_GUIDE,
    )
}

/// System prompt carrying the data context for a chat question.
///
/// Rebuilt per question from the current snapshot, so answers always
/// reflect the freshest data rather than a stale conversation context.
pub fn build_chat_system_prompt(roster: &[RosterEntry], selected_units: &[String]) -> String {
    let filter_line = if selected_units.is_empty() {
        "none selected".to_string()
    } else {
        selected_units.join(", ")
    };

    format!(
        "{}\n\n{}\n\nActive unit filter: {}.\n\n\
         Operator activity roster, one JSON object per operator:\n{}\n\n\
         Answer questions about this roster only. When the data cannot \
         answer a question, say so instead of guessing.",
        ANALYST_SYSTEM_PROMPT,
        COLUMN_GUIDE,
        filter_line,
        roster_json(roster),
    )
}

fn roster_json(roster: &[RosterEntry]) -> String {
    serde_json::to_string_pretty(roster).unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
