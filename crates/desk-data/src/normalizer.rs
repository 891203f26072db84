//! Table unification for the deskboard pipeline.
//!
//! Turns the two raw source tables into one stream of [`ActivityRecord`]s
//! with a category tag per record, and computes the pre-filter identity set
//! that keeps zero-activity operators visible in the roster.

use std::collections::BTreeSet;

use desk_core::models::{parse_identity, ActivityRecord, Category, SourceTables};
use tracing::{debug, warn};

/// Unify both source tables into activity records.
///
/// Service rows carry their explicit quantity. Messaging rows are filtered
/// to qualifying status first and contribute exactly 1 each; dropped rows
/// are counted nowhere. Output order is service rows then messaging rows;
/// downstream aggregation does not depend on it.
pub fn normalize(tables: &SourceTables) -> Vec<ActivityRecord> {
    let mut records = Vec::with_capacity(tables.total_rows());
    let mut blank_identities = 0usize;
    let mut dropped_messaging = 0usize;

    for row in &tables.service {
        if row.handled_by.trim().is_empty() {
            blank_identities += 1;
        }
        records.push(ActivityRecord {
            handled_by: row.handled_by.clone(),
            category: Category::Ss,
            quantity: row.quantity,
            date: row.date,
            client_id: row.client_id.clone(),
            identity: parse_identity(&row.handled_by),
        });
    }

    for row in &tables.messaging {
        if !row.qualifies() {
            dropped_messaging += 1;
            continue;
        }
        if row.handled_by.trim().is_empty() {
            blank_identities += 1;
        }
        records.push(ActivityRecord {
            handled_by: row.handled_by.clone(),
            category: Category::Wa,
            quantity: 1,
            date: row.date,
            client_id: row.client_id.clone(),
            identity: parse_identity(&row.handled_by),
        });
    }

    if blank_identities > 0 {
        warn!(
            "{} rows carry a blank handled_by; kept as unknown operator",
            blank_identities
        );
    }
    debug!(
        records = records.len(),
        dropped_messaging, "normalized source tables"
    );

    records
}

/// Union of distinct identity strings across both tables.
///
/// Computed over the raw tables, before the status filter, so an operator
/// whose every messaging row was non-qualifying still joins the roster with
/// zero counts. Sorted set, so zero-fill joins stay deterministic.
pub fn known_identities(tables: &SourceTables) -> BTreeSet<String> {
    let mut identities = BTreeSet::new();
    for row in &tables.service {
        identities.insert(row.handled_by.clone());
    }
    for row in &tables.messaging {
        identities.insert(row.handled_by.clone());
    }
    identities
}

// ── Tests ─────────────────────────────────────────────────────────────────────
