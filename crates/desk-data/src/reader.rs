//! CSV source loading for the deskboard pipeline.
//!
//! Reads the two source tables (requested services and the messaging log)
//! from a data directory and converts them into typed rows for
//! normalization. Structural problems fail loudly; bad date cells degrade
//! to missing values.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use desk_core::error::{DeskError, Result};
use desk_core::models::{MessagingRow, ServiceRow, SourceTables};
use serde::Deserialize;
use tracing::{debug, warn};

/// File name of the requested-service table inside the data directory.
pub const SERVICE_FILE: &str = "service_requests.csv";
/// File name of the messaging table inside the data directory.
pub const MESSAGING_FILE: &str = "messaging_log.csv";

// ── Raw CSV rows ──────────────────────────────────────────────────────────────
//
// Dates arrive as free-form strings and are parsed tolerantly afterwards;
// everything else deserializes strictly so structural errors surface.

#[derive(Debug, Deserialize)]
struct RawServiceRow {
    handled_by: String,
    quantity: u64,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessagingRow {
    handled_by: String,
    status: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load both source tables from `data_dir`.
///
/// Expects `service_requests.csv` and `messaging_log.csv` inside the
/// directory. A missing directory, missing file, missing required column, or
/// malformed quantity is a fatal error; unparseable dates and empty client
/// cells degrade to `None`.
pub fn load_source_tables(data_dir: &Path) -> Result<SourceTables> {
    if !data_dir.is_dir() {
        return Err(DeskError::DataPathNotFound(data_dir.to_path_buf()));
    }

    let service = load_service_table(&data_dir.join(SERVICE_FILE))?;
    let messaging = load_messaging_table(&data_dir.join(MESSAGING_FILE))?;

    debug!(
        service_rows = service.len(),
        messaging_rows = messaging.len(),
        "loaded source tables from {}",
        data_dir.display()
    );

    Ok(SourceTables { service, messaging })
}

/// Parse a date cell into a calendar date, tolerating the formats seen in
/// exported workbooks.
///
/// Tries date-only patterns first, then datetime patterns (keeping the date
/// part). Returns `None` and logs a warning when nothing matches; the caller
/// keeps the row and degrades only day-count metrics.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    warn!("could not parse date cell \"{}\"", trimmed);
    None
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn load_service_table(path: &Path) -> Result<Vec<ServiceRow>> {
    let mut reader = open_csv(path)?;
    require_columns(&mut reader, "service_requests", &["handled_by", "quantity"])?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<RawServiceRow>() {
        let raw = result?;
        rows.push(ServiceRow {
            handled_by: raw.handled_by,
            quantity: raw.quantity,
            date: raw.date.as_deref().and_then(parse_date),
            client_id: clean_client_id(raw.client_id),
        });
    }

    debug!(rows = rows.len(), "read {}", path.display());
    Ok(rows)
}

fn load_messaging_table(path: &Path) -> Result<Vec<MessagingRow>> {
    let mut reader = open_csv(path)?;
    require_columns(&mut reader, "messaging_log", &["handled_by", "status"])?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<RawMessagingRow>() {
        let raw = result?;
        rows.push(MessagingRow {
            handled_by: raw.handled_by,
            status: raw.status,
            date: raw.date.as_deref().and_then(parse_date),
            client_id: clean_client_id(raw.client_id),
        });
    }

    debug!(rows = rows.len(), "read {}", path.display());
    Ok(rows)
}

/// Open a CSV file, mapping the open failure to an error that names the path.
fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path).map_err(|source| DeskError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

/// Verify the header row carries every required column.
fn require_columns(
    reader: &mut csv::Reader<std::fs::File>,
    table: &str,
    required: &[&str],
) -> Result<()> {
    let headers = reader.headers()?.clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(DeskError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Drop client cells that are empty after trimming; keep the trimmed value.
fn clean_client_id(raw: Option<String>) -> Option<String> {
    let value = raw?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
