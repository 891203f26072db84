//! Roster, pivot and KPI aggregation over normalized activity records.
//!
//! Everything here is pure: slices of [`ActivityRecord`] in, owned result
//! vectors out. Callers decide where the records come from and how often
//! to recompute.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use desk_core::models::{parse_identity, ActivityRecord, Category, Identity, PctFormula};

// ── RosterEntry ───────────────────────────────────────────────────────────────

/// Per-operator totals for the roster table, one row per raw `handled_by`
/// value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    /// Raw identity string, the grouping key.
    pub handled_by: String,
    /// Operator name parsed out of `handled_by`.
    pub person: String,
    /// Department parsed out of `handled_by`, when present.
    pub department: Option<String>,
    /// Unit parsed out of `handled_by`, when present.
    pub unit: Option<String>,
    /// Requested-service count (explicit quantities summed).
    pub ss_count: u64,
    /// Messaging-interaction count (one per qualifying row).
    pub wa_count: u64,
    /// `ss_count + wa_count`.
    pub total: u64,
    /// Distinct clients served across both categories.
    pub client_count: u64,
    /// SS share as a raw ratio, per the configured formula. May exceed 1.0
    /// under the per-client formula; 0.0 whenever the denominator is zero.
    pub pct_ss: f64,
}

// ── PivotEntry ────────────────────────────────────────────────────────────────

/// One row of the department / unit / person pivot, sorted by total
/// descending.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotEntry {
    pub department: Option<String>,
    pub unit: Option<String>,
    pub person: String,
    pub ss_count: u64,
    pub wa_count: u64,
    pub total: u64,
}

impl PivotEntry {
    fn zeroed(identity: &Identity) -> Self {
        Self {
            department: identity.department.clone(),
            unit: identity.unit.clone(),
            person: identity.person.clone(),
            ss_count: 0,
            wa_count: 0,
            total: 0,
        }
    }
}

// ── ActivityTotals ────────────────────────────────────────────────────────────

/// Whole-dataset totals backing the KPI strip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityTotals {
    pub ss_total: u64,
    pub wa_total: u64,
    /// Distinct parseable dates across both source tables. May be zero.
    pub distinct_days: u64,
}

impl ActivityTotals {
    /// Sum of both activity categories.
    pub fn total(&self) -> u64 {
        self.ss_total + self.wa_total
    }

    /// Requested services per day. Divides by one when no row carried a
    /// parseable date.
    pub fn ss_per_day(&self) -> f64 {
        self.ss_total as f64 / self.distinct_days.max(1) as f64
    }

    /// Messaging interactions per day, with the same divide-by-one guard.
    pub fn wa_per_day(&self) -> f64 {
        self.wa_total as f64 / self.distinct_days.max(1) as f64
    }

    /// All activity per day, with the same divide-by-one guard.
    pub fn total_per_day(&self) -> f64 {
        self.total() as f64 / self.distinct_days.max(1) as f64
    }
}

// ── Roster ────────────────────────────────────────────────────────────────────

/// Running per-operator counts while the roster is being built.
#[derive(Debug, Default)]
struct OperatorAccumulator {
    ss_count: u64,
    wa_count: u64,
    clients: HashSet<String>,
}

impl OperatorAccumulator {
    fn add_record(&mut self, record: &ActivityRecord) {
        match record.category {
            Category::Ss => self.ss_count += record.quantity,
            Category::Wa => self.wa_count += record.quantity,
        }
        if let Some(client) = &record.client_id {
            self.clients.insert(client.clone());
        }
    }

    fn total(&self) -> u64 {
        self.ss_count + self.wa_count
    }
}

/// Build the roster: one entry per operator, sorted by `handled_by`.
///
/// Every identity in `known_identities` gets a row even when no record in
/// `records` mentions it, so operators whose activity was filtered out
/// still show up with zeros.
pub fn build_roster(
    records: &[ActivityRecord],
    known_identities: &BTreeSet<String>,
    formula: PctFormula,
) -> Vec<RosterEntry> {
    // BTreeMap keeps the roster sorted by raw identity.
    let mut map: BTreeMap<String, OperatorAccumulator> = BTreeMap::new();

    for raw in known_identities {
        map.entry(raw.clone()).or_default();
    }
    for record in records {
        map.entry(record.handled_by.clone())
            .or_default()
            .add_record(record);
    }

    map.into_iter()
        .map(|(handled_by, acc)| {
            let identity = parse_identity(&handled_by);
            let total = acc.total();
            let client_count = acc.clients.len() as u64;
            RosterEntry {
                handled_by,
                person: identity.person,
                department: identity.department,
                unit: identity.unit,
                ss_count: acc.ss_count,
                wa_count: acc.wa_count,
                total,
                client_count,
                pct_ss: ss_share(acc.ss_count, client_count, total, formula),
            }
        })
        .collect()
}

/// SS share under the configured formula, 0.0 when the denominator is zero.
fn ss_share(ss_count: u64, client_count: u64, total: u64, formula: PctFormula) -> f64 {
    let denominator = match formula {
        PctFormula::PerClient => client_count,
        PctFormula::PerTotal => total,
    };
    if denominator == 0 {
        0.0
    } else {
        ss_count as f64 / denominator as f64
    }
}

// ── Pivot ─────────────────────────────────────────────────────────────────────

type PivotKey = (Option<String>, Option<String>, String);

fn pivot_key(identity: &Identity) -> PivotKey {
    (
        identity.department.clone(),
        identity.unit.clone(),
        identity.person.clone(),
    )
}

/// Build the department / unit / person pivot, sorted by total descending.
///
/// Ties keep the order in which each group was first encountered in
/// `records`. Identities from `known_identities` with no activity are
/// appended as zero rows before sorting, so they end up at the bottom.
pub fn build_pivot(
    records: &[ActivityRecord],
    known_identities: &BTreeSet<String>,
) -> Vec<PivotEntry> {
    let mut entries: Vec<PivotEntry> = Vec::new();
    let mut index: HashMap<PivotKey, usize> = HashMap::new();

    for record in records {
        let key = pivot_key(&record.identity);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                entries.push(PivotEntry::zeroed(&record.identity));
                index.insert(key, entries.len() - 1);
                entries.len() - 1
            }
        };
        let entry = &mut entries[slot];
        match record.category {
            Category::Ss => entry.ss_count += record.quantity,
            Category::Wa => entry.wa_count += record.quantity,
        }
        entry.total += record.quantity;
    }

    for raw in known_identities {
        let identity = parse_identity(raw);
        let key = pivot_key(&identity);
        if !index.contains_key(&key) {
            index.insert(key, entries.len());
            entries.push(PivotEntry::zeroed(&identity));
        }
    }

    // Stable sort: equal totals stay in first-encounter order.
    entries.sort_by(|a, b| b.total.cmp(&a.total));
    entries
}

// ── Totals ────────────────────────────────────────────────────────────────────

/// Sum both categories and count distinct parseable dates across `records`.
pub fn build_totals(records: &[ActivityRecord]) -> ActivityTotals {
    let mut totals = ActivityTotals::default();
    let mut days: HashSet<chrono::NaiveDate> = HashSet::new();

    for record in records {
        match record.category {
            Category::Ss => totals.ss_total += record.quantity,
            Category::Wa => totals.wa_total += record.quantity,
        }
        if let Some(date) = record.date {
            days.insert(date);
        }
    }

    totals.distinct_days = days.len() as u64;
    totals
}

// ── Unit filtering ────────────────────────────────────────────────────────────

/// Distinct unit names across the roster, sorted, for the chart filter.
pub fn unit_values(roster: &[RosterEntry]) -> Vec<String> {
    let mut units: BTreeSet<String> = BTreeSet::new();
    for entry in roster {
        if let Some(unit) = &entry.unit {
            units.insert(unit.clone());
        }
    }
    units.into_iter().collect()
}

/// Keep roster entries whose unit is one of `selected`.
///
/// An empty selection yields an empty roster. Entries without a parsed
/// unit never match a unit filter.
pub fn filter_roster(roster: &[RosterEntry], selected: &[String]) -> Vec<RosterEntry> {
    roster
        .iter()
        .filter(|entry| matches_unit(entry.unit.as_deref(), selected))
        .cloned()
        .collect()
}

/// Keep pivot rows whose unit is one of `selected`, preserving order.
pub fn filter_pivot(pivot: &[PivotEntry], selected: &[String]) -> Vec<PivotEntry> {
    pivot
        .iter()
        .filter(|entry| matches_unit(entry.unit.as_deref(), selected))
        .cloned()
        .collect()
}

fn matches_unit(unit: Option<&str>, selected: &[String]) -> bool {
    match unit {
        Some(unit) => selected.iter().any(|s| s == unit),
        None => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(
        handled_by: &str,
        category: Category,
        quantity: u64,
        date: Option<&str>,
        client: Option<&str>,
    ) -> ActivityRecord {
        ActivityRecord {
            handled_by: handled_by.to_string(),
            category,
            quantity,
            date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            client_id: client.map(str::to_string),
            identity: parse_identity(handled_by),
        }
    }

    fn known(raw: &[&str]) -> BTreeSet<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    /// Ana has 3 SS across two clients plus 1 WA; Carla has 1 SS and 2 WA;
    /// Bruno appears in no record.
    fn sample_records() -> Vec<ActivityRecord> {
        vec![
            record(
                "Ana | Suporte-Norte",
                Category::Ss,
                2,
                Some("2024-03-01"),
                Some("c-001"),
            ),
            record(
                "Ana | Suporte-Norte",
                Category::Ss,
                1,
                Some("2024-03-02"),
                Some("c-002"),
            ),
            record(
                "Ana | Suporte-Norte",
                Category::Wa,
                1,
                Some("2024-03-02"),
                Some("c-001"),
            ),
            record(
                "Carla | Vendas-Sul",
                Category::Ss,
                1,
                Some("2024-03-01"),
                Some("c-003"),
            ),
            record("Carla | Vendas-Sul", Category::Wa, 1, None, Some("c-003")),
            record("Carla | Vendas-Sul", Category::Wa, 1, None, None),
        ]
    }

    fn sample_known() -> BTreeSet<String> {
        known(&[
            "Ana | Suporte-Norte",
            "Bruno | Vendas-Sul",
            "Carla | Vendas-Sul",
        ])
    }

    // ── build_roster ──────────────────────────────────────────────────────────

    #[test]
    fn test_roster_counts_per_operator() {
        let roster = build_roster(&sample_records(), &sample_known(), PctFormula::PerClient);

        assert_eq!(roster.len(), 3);
        let ana = &roster[0];
        assert_eq!(ana.handled_by, "Ana | Suporte-Norte");
        assert_eq!(ana.person, "Ana");
        assert_eq!(ana.department.as_deref(), Some("Suporte"));
        assert_eq!(ana.unit.as_deref(), Some("Norte"));
        assert_eq!(ana.ss_count, 3);
        assert_eq!(ana.wa_count, 1);
        assert_eq!(ana.total, 4);
    }

    #[test]
    fn test_roster_sorted_by_handled_by() {
        let roster = build_roster(&sample_records(), &sample_known(), PctFormula::PerClient);
        let keys: Vec<&str> = roster.iter().map(|e| e.handled_by.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "Ana | Suporte-Norte",
                "Bruno | Vendas-Sul",
                "Carla | Vendas-Sul"
            ]
        );
    }

    #[test]
    fn test_roster_includes_zero_activity_operator() {
        let roster = build_roster(&sample_records(), &sample_known(), PctFormula::PerClient);
        let bruno = roster
            .iter()
            .find(|e| e.handled_by == "Bruno | Vendas-Sul")
            .unwrap();

        assert_eq!(bruno.person, "Bruno");
        assert_eq!(bruno.ss_count, 0);
        assert_eq!(bruno.wa_count, 0);
        assert_eq!(bruno.total, 0);
        assert_eq!(bruno.client_count, 0);
        assert_eq!(bruno.pct_ss, 0.0);
    }

    #[test]
    fn test_roster_distinct_clients() {
        let roster = build_roster(&sample_records(), &sample_known(), PctFormula::PerClient);

        // Ana served c-001 twice and c-002 once.
        assert_eq!(roster[0].client_count, 2);
        // Carla's one client plus a record with no client at all.
        let carla = &roster[2];
        assert_eq!(carla.client_count, 1);
    }

    #[test]
    fn test_roster_empty_records_zero_rows_only() {
        let roster = build_roster(&[], &sample_known(), PctFormula::PerClient);
        assert_eq!(roster.len(), 3);
        assert!(roster.iter().all(|e| e.total == 0));
    }

    #[test]
    fn test_roster_operator_missing_from_known_still_counted() {
        let records = vec![record(
            "Dora | Suporte-Leste",
            Category::Ss,
            5,
            None,
            Some("c-009"),
        )];
        let roster = build_roster(&records, &BTreeSet::new(), PctFormula::PerClient);

        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].ss_count, 5);
    }

    // ── pct formulas ──────────────────────────────────────────────────────────

    #[test]
    fn test_pct_per_client_can_exceed_one() {
        // 3 services across 2 distinct clients.
        let roster = build_roster(&sample_records(), &sample_known(), PctFormula::PerClient);
        assert!((roster[0].pct_ss - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_pct_per_total_is_a_fraction() {
        let roster = build_roster(&sample_records(), &sample_known(), PctFormula::PerTotal);
        // Ana: 3 SS out of 4 activities.
        assert!((roster[0].pct_ss - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_pct_zero_denominator_is_zero_not_nan() {
        let records = vec![record("Eva | Suporte-Norte", Category::Wa, 1, None, None)];
        let roster = build_roster(&records, &BTreeSet::new(), PctFormula::PerClient);

        assert_eq!(roster[0].client_count, 0);
        assert_eq!(roster[0].pct_ss, 0.0);
        assert!(!roster[0].pct_ss.is_nan());
    }

    // ── build_pivot ───────────────────────────────────────────────────────────

    #[test]
    fn test_pivot_groups_and_sorts_descending() {
        let pivot = build_pivot(&sample_records(), &sample_known());

        assert_eq!(pivot.len(), 3);
        assert_eq!(pivot[0].person, "Ana");
        assert_eq!(pivot[0].department.as_deref(), Some("Suporte"));
        assert_eq!(pivot[0].unit.as_deref(), Some("Norte"));
        assert_eq!(pivot[0].total, 4);
        assert_eq!(pivot[1].person, "Carla");
        assert_eq!(pivot[1].total, 3);
        assert_eq!(pivot[2].person, "Bruno");
        assert_eq!(pivot[2].total, 0);
    }

    #[test]
    fn test_pivot_ties_keep_first_encounter_order() {
        let records = vec![
            record("Zeca | Suporte-Norte", Category::Ss, 2, None, None),
            record("Alice | Vendas-Sul", Category::Ss, 2, None, None),
        ];
        let pivot = build_pivot(&records, &BTreeSet::new());

        // Equal totals: Zeca appeared first in the input, so he stays first
        // even though Alice sorts before him alphabetically.
        assert_eq!(pivot[0].person, "Zeca");
        assert_eq!(pivot[1].person, "Alice");
    }

    #[test]
    fn test_pivot_zero_rows_appended_for_known_identities() {
        let pivot = build_pivot(&[], &sample_known());

        assert_eq!(pivot.len(), 3);
        assert!(pivot.iter().all(|e| e.total == 0));
        // With nothing else ranking them, known identities come out sorted.
        assert_eq!(pivot[0].person, "Ana");
        assert_eq!(pivot[1].person, "Bruno");
        assert_eq!(pivot[2].person, "Carla");
    }

    #[test]
    fn test_pivot_merges_same_identity_across_categories() {
        let records = vec![
            record("Ana | Suporte-Norte", Category::Ss, 2, None, None),
            record("Ana | Suporte-Norte", Category::Wa, 1, None, None),
        ];
        let pivot = build_pivot(&records, &BTreeSet::new());

        assert_eq!(pivot.len(), 1);
        assert_eq!(pivot[0].ss_count, 2);
        assert_eq!(pivot[0].wa_count, 1);
        assert_eq!(pivot[0].total, 3);
    }

    #[test]
    fn test_pivot_distinguishes_units_with_same_person() {
        let records = vec![
            record("Ana | Suporte-Norte", Category::Ss, 2, None, None),
            record("Ana | Suporte-Sul", Category::Ss, 1, None, None),
        ];
        let pivot = build_pivot(&records, &BTreeSet::new());

        assert_eq!(pivot.len(), 2);
        assert_eq!(pivot[0].unit.as_deref(), Some("Norte"));
        assert_eq!(pivot[1].unit.as_deref(), Some("Sul"));
    }

    // ── conservation ──────────────────────────────────────────────────────────

    #[test]
    fn test_roster_pivot_and_totals_agree() {
        let records = sample_records();
        let known = sample_known();

        let roster_sum: u64 = build_roster(&records, &known, PctFormula::PerClient)
            .iter()
            .map(|e| e.total)
            .sum();
        let pivot_sum: u64 = build_pivot(&records, &known).iter().map(|e| e.total).sum();
        let totals = build_totals(&records);

        assert_eq!(roster_sum, totals.total());
        assert_eq!(pivot_sum, totals.total());
        assert_eq!(totals.total(), 7);
    }

    // ── build_totals ──────────────────────────────────────────────────────────

    #[test]
    fn test_totals_split_by_category() {
        let totals = build_totals(&sample_records());
        assert_eq!(totals.ss_total, 4);
        assert_eq!(totals.wa_total, 3);
        assert_eq!(totals.total(), 7);
    }

    #[test]
    fn test_totals_distinct_days() {
        let totals = build_totals(&sample_records());
        // 2024-03-01 and 2024-03-02; dateless records contribute nothing.
        assert_eq!(totals.distinct_days, 2);
        assert!((totals.total_per_day() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_totals_per_day_without_dates_divides_by_one() {
        let records = vec![record("Ana | Suporte-Norte", Category::Ss, 5, None, None)];
        let totals = build_totals(&records);

        assert_eq!(totals.distinct_days, 0);
        assert!((totals.total_per_day() - 5.0).abs() < 1e-9);
        assert!((totals.ss_per_day() - 5.0).abs() < 1e-9);
        assert_eq!(totals.wa_per_day(), 0.0);
    }

    #[test]
    fn test_totals_empty_records() {
        let totals = build_totals(&[]);
        assert_eq!(totals.total(), 0);
        assert_eq!(totals.total_per_day(), 0.0);
    }

    // ── unit filtering ────────────────────────────────────────────────────────

    #[test]
    fn test_unit_values_sorted_and_distinct() {
        let roster = build_roster(&sample_records(), &sample_known(), PctFormula::PerClient);
        assert_eq!(unit_values(&roster), vec!["Norte", "Sul"]);
    }

    #[test]
    fn test_unit_values_skip_missing_units() {
        let records = vec![record("Jane Doe", Category::Ss, 1, None, None)];
        let roster = build_roster(&records, &BTreeSet::new(), PctFormula::PerClient);
        assert!(unit_values(&roster).is_empty());
    }

    #[test]
    fn test_filter_roster_keeps_selected_units() {
        let roster = build_roster(&sample_records(), &sample_known(), PctFormula::PerClient);
        let filtered = filter_roster(&roster, &["Sul".to_string()]);

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|e| e.unit.as_deref() == Some("Sul")));
    }

    #[test]
    fn test_filter_roster_empty_selection_is_empty() {
        let roster = build_roster(&sample_records(), &sample_known(), PctFormula::PerClient);
        assert!(filter_roster(&roster, &[]).is_empty());
    }

    #[test]
    fn test_filter_roster_drops_rows_without_unit() {
        let records = vec![
            record("Jane Doe", Category::Ss, 1, None, None),
            record("Ana | Suporte-Norte", Category::Ss, 1, None, None),
        ];
        let roster = build_roster(&records, &BTreeSet::new(), PctFormula::PerClient);
        let filtered = filter_roster(&roster, &["Norte".to_string()]);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].person, "Ana");
    }

    #[test]
    fn test_filter_pivot_preserves_order() {
        let pivot = build_pivot(&sample_records(), &sample_known());
        let filtered = filter_pivot(&pivot, &["Sul".to_string()]);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].person, "Carla");
        assert_eq!(filtered[1].person, "Bruno");
    }
}
