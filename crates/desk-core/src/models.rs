use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status value a messaging row must carry to count as activity.
pub const QUALIFYING_STATUS: &str = "completed";

/// Denominator used when deriving the per-operator SS percentage.
///
/// Source dashboards disagreed on this formula, so it is an explicit
/// configuration choice rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PctFormula {
    /// `ss_count / client_count` (distinct clients served).
    PerClient,
    /// `ss_count / total` (all SS and WA activity).
    PerTotal,
}

/// Activity category assigned to every normalized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Requested-service ticket, counted by its explicit quantity.
    Ss,
    /// Messaging interaction, counted 1 per qualifying row.
    Wa,
}

impl Category {
    /// Short display label ("SS" / "WA").
    pub fn label(&self) -> &'static str {
        match self {
            Category::Ss => "SS",
            Category::Wa => "WA",
        }
    }
}

/// Structured identity parsed from a free-text handled-by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Operator name. Never empty for non-degenerate input.
    pub person: String,
    /// Department, when the identity carried a `|` separator.
    pub department: Option<String>,
    /// Unit within the department, when the remainder carried a `-`.
    pub unit: Option<String>,
}

/// One row of the requested-service source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRow {
    /// Free-text identity of the operator who handled the ticket.
    pub handled_by: String,
    /// Explicit count of requested services on this row.
    pub quantity: u64,
    /// Calendar date of the activity, when parseable.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Client served, when recorded.
    #[serde(default)]
    pub client_id: Option<String>,
}

/// One row of the messaging-interaction source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingRow {
    /// Free-text identity of the operator who handled the conversation.
    pub handled_by: String,
    /// Raw status cell. Only [`QUALIFYING_STATUS`] rows count as activity.
    pub status: String,
    /// Calendar date of the activity, when parseable.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Client served, when recorded.
    #[serde(default)]
    pub client_id: Option<String>,
}

impl MessagingRow {
    /// Whether this row counts toward WA activity.
    pub fn qualifies(&self) -> bool {
        self.status.trim() == QUALIFYING_STATUS
    }
}

/// The raw source snapshot: both tables as read, before any filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceTables {
    /// Requested-service rows.
    pub service: Vec<ServiceRow>,
    /// Messaging rows, qualifying or not.
    pub messaging: Vec<MessagingRow>,
}

impl SourceTables {
    /// Total raw rows across both tables.
    pub fn total_rows(&self) -> usize {
        self.service.len() + self.messaging.len()
    }

    /// True when both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.service.is_empty() && self.messaging.is_empty()
    }
}

/// A unified activity record produced by normalization.
///
/// Service rows carry their explicit quantity; messaging rows only become
/// records when their status qualifies, each contributing exactly 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Original handled-by string, the roster grouping key.
    pub handled_by: String,
    /// SS or WA.
    pub category: Category,
    /// Count contributed by this record.
    pub quantity: u64,
    /// Calendar date, when the source row carried a parseable one.
    pub date: Option<NaiveDate>,
    /// Client served, when recorded.
    pub client_id: Option<String>,
    /// Identity parsed from `handled_by`.
    pub identity: Identity,
}

/// Parse a free-text handled-by field into its structured parts.
///
/// The convention is `person | department-unit`:
///
/// * No `|` present → the whole trimmed string is the person, department
///   and unit are absent.
/// * With `|`, the remainder is split on the first `-` into department and
///   unit; without a `-` the whole remainder is the department.
/// * Every part is trimmed; parts that trim to nothing collapse to `None`.
/// * An empty or all-whitespace input yields an empty person (tolerated
///   degenerate case, treated downstream as an unknown operator).
///
/// # Examples
///
/// ```
/// use desk_core::models::parse_identity;
///
/// let id = parse_identity("Ana Souza | Suporte-Norte");
/// assert_eq!(id.person, "Ana Souza");
/// assert_eq!(id.department.as_deref(), Some("Suporte"));
/// assert_eq!(id.unit.as_deref(), Some("Norte"));
///
/// let plain = parse_identity("Jane Doe");
/// assert_eq!(plain.person, "Jane Doe");
/// assert!(plain.department.is_none());
/// assert!(plain.unit.is_none());
/// ```
pub fn parse_identity(raw: &str) -> Identity {
    let Some((person_part, rest)) = raw.split_once('|') else {
        return Identity {
            person: raw.trim().to_string(),
            department: None,
            unit: None,
        };
    };

    let (department, unit) = match rest.split_once('-') {
        Some((dept_part, unit_part)) => (non_empty(dept_part), non_empty(unit_part)),
        None => (non_empty(rest), None),
    };

    Identity {
        person: person_part.trim().to_string(),
        department,
        unit,
    }
}

/// Trim a part, collapsing whitespace-only content to `None`.
fn non_empty(part: &str) -> Option<String> {
    let trimmed = part.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_identity ─────────────────────────────────────────────────────

    #[test]
    fn test_parse_identity_full_shape() {
        let id = parse_identity("Ana | Suporte-Norte");
        assert_eq!(id.person, "Ana");
        assert_eq!(id.department.as_deref(), Some("Suporte"));
        assert_eq!(id.unit.as_deref(), Some("Norte"));
    }

    #[test]
    fn test_parse_identity_round_trip() {
        // Rebuilding the conventional shape from parts reconstructs them.
        let (person, department, unit) = ("Carla Dias", "Atendimento", "Leste");
        let id = parse_identity(&format!("{person} | {department}-{unit}"));
        assert_eq!(id.person, person);
        assert_eq!(id.department.as_deref(), Some(department));
        assert_eq!(id.unit.as_deref(), Some(unit));
    }

    #[test]
    fn test_parse_identity_no_separator() {
        let id = parse_identity("Jane Doe");
        assert_eq!(id.person, "Jane Doe");
        assert_eq!(id.department, None);
        assert_eq!(id.unit, None);
    }

    #[test]
    fn test_parse_identity_no_separator_trims() {
        let id = parse_identity("  Jane Doe  ");
        assert_eq!(id.person, "Jane Doe");
    }

    #[test]
    fn test_parse_identity_pipe_without_dash() {
        let id = parse_identity("Bruno | Vendas");
        assert_eq!(id.person, "Bruno");
        assert_eq!(id.department.as_deref(), Some("Vendas"));
        assert_eq!(id.unit, None);
    }

    #[test]
    fn test_parse_identity_splits_on_first_dash_only() {
        // Further dashes stay inside the unit.
        let id = parse_identity("Noa | Suporte-Norte-Extra");
        assert_eq!(id.department.as_deref(), Some("Suporte"));
        assert_eq!(id.unit.as_deref(), Some("Norte-Extra"));
    }

    #[test]
    fn test_parse_identity_trailing_pipe_collapses_to_none() {
        let id = parse_identity("Ana |");
        assert_eq!(id.person, "Ana");
        assert_eq!(id.department, None);
        assert_eq!(id.unit, None);
    }

    #[test]
    fn test_parse_identity_trailing_dash_collapses_to_none() {
        let id = parse_identity("Ana | Suporte-");
        assert_eq!(id.person, "Ana");
        assert_eq!(id.department.as_deref(), Some("Suporte"));
        assert_eq!(id.unit, None);
    }

    #[test]
    fn test_parse_identity_whitespace_heavy() {
        let id = parse_identity("  Ana Souza  |  Suporte  -  Norte  ");
        assert_eq!(id.person, "Ana Souza");
        assert_eq!(id.department.as_deref(), Some("Suporte"));
        assert_eq!(id.unit.as_deref(), Some("Norte"));
    }

    #[test]
    fn test_parse_identity_empty_input_is_degenerate() {
        // Tolerated: an unknown operator, not an error.
        let id = parse_identity("");
        assert_eq!(id.person, "");
        assert_eq!(id.department, None);
        assert_eq!(id.unit, None);
    }

    #[test]
    fn test_parse_identity_whitespace_only_input() {
        let id = parse_identity("   ");
        assert_eq!(id.person, "");
        assert_eq!(id.department, None);
    }

    #[test]
    fn test_parse_identity_unicode_names() {
        let id = parse_identity("José Álvares | Atendimento-São Paulo");
        assert_eq!(id.person, "José Álvares");
        assert_eq!(id.department.as_deref(), Some("Atendimento"));
        assert_eq!(id.unit.as_deref(), Some("São Paulo"));
    }

    // ── MessagingRow::qualifies ────────────────────────────────────────────

    fn messaging_row(status: &str) -> MessagingRow {
        MessagingRow {
            handled_by: "Ana | Suporte-Norte".to_string(),
            status: status.to_string(),
            date: None,
            client_id: None,
        }
    }

    #[test]
    fn test_messaging_row_completed_qualifies() {
        assert!(messaging_row("completed").qualifies());
    }

    #[test]
    fn test_messaging_row_completed_with_padding_qualifies() {
        assert!(messaging_row("  completed ").qualifies());
    }

    #[test]
    fn test_messaging_row_other_status_does_not_qualify() {
        assert!(!messaging_row("pendente").qualifies());
        assert!(!messaging_row("open").qualifies());
        assert!(!messaging_row("").qualifies());
    }

    #[test]
    fn test_messaging_row_status_is_case_sensitive() {
        assert!(!messaging_row("Completed").qualifies());
        assert!(!messaging_row("COMPLETED").qualifies());
    }

    // ── SourceTables ───────────────────────────────────────────────────────

    #[test]
    fn test_source_tables_counts() {
        let tables = SourceTables {
            service: vec![ServiceRow {
                handled_by: "Ana | Suporte-Norte".to_string(),
                quantity: 3,
                date: None,
                client_id: None,
            }],
            messaging: vec![messaging_row("completed"), messaging_row("pendente")],
        };
        assert_eq!(tables.total_rows(), 3);
        assert!(!tables.is_empty());
    }

    #[test]
    fn test_source_tables_empty() {
        let tables = SourceTables::default();
        assert_eq!(tables.total_rows(), 0);
        assert!(tables.is_empty());
    }

    // ── Category / PctFormula serde ────────────────────────────────────────

    #[test]
    fn test_category_serde() {
        assert_eq!(serde_json::to_string(&Category::Ss).unwrap(), r#""ss""#);
        assert_eq!(serde_json::to_string(&Category::Wa).unwrap(), r#""wa""#);
        let back: Category = serde_json::from_str(r#""wa""#).unwrap();
        assert_eq!(back, Category::Wa);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::Ss.label(), "SS");
        assert_eq!(Category::Wa.label(), "WA");
    }

    #[test]
    fn test_pct_formula_serde() {
        assert_eq!(
            serde_json::to_string(&PctFormula::PerClient).unwrap(),
            r#""per-client""#
        );
        let back: PctFormula = serde_json::from_str(r#""per-total""#).unwrap();
        assert_eq!(back, PctFormula::PerTotal);
    }
}
