//! Memoized access to the analysis pipeline.
//!
//! Wraps [`analyze_activity`] behind a source fingerprint: the snapshot is
//! recomputed only when one of the CSV files actually changed on disk.
//! There is no time-to-live; an unchanged directory keeps serving the same
//! snapshot until [`SnapshotCache::invalidate`] is called.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use desk_core::error::Result;
use desk_core::models::PctFormula;

use crate::analysis::{analyze_activity, DashboardSnapshot};
use crate::reader::{MESSAGING_FILE, SERVICE_FILE};

// ── SourceFingerprint ─────────────────────────────────────────────────────────

/// Size and modification time of each source file at one point in time.
///
/// A missing file records `None`, so a file appearing or disappearing also
/// changes the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    entries: Vec<(PathBuf, Option<(u64, SystemTime)>)>,
}

fn fingerprint(data_dir: &Path) -> SourceFingerprint {
    let entries = [SERVICE_FILE, MESSAGING_FILE]
        .iter()
        .map(|name| {
            let path = data_dir.join(name);
            let stat = fs::metadata(&path)
                .ok()
                .and_then(|meta| meta.modified().ok().map(|mtime| (meta.len(), mtime)));
            (path, stat)
        })
        .collect();
    SourceFingerprint { entries }
}

// ── SnapshotCache ─────────────────────────────────────────────────────────────

/// Fingerprint-keyed wrapper around the full analysis pipeline.
///
/// # Example
/// ```no_run
/// use desk_core::models::PctFormula;
/// use desk_data::cache::SnapshotCache;
///
/// let mut cache = SnapshotCache::new("data", PctFormula::PerClient);
/// let snapshot = cache.refresh().expect("sources readable");
/// println!("operators: {}", snapshot.roster.len());
/// ```
pub struct SnapshotCache {
    /// Directory holding the two source CSV files.
    data_dir: PathBuf,
    /// Percentage formula baked into every computed roster.
    formula: PctFormula,
    /// When set, every refresh recomputes regardless of the fingerprint.
    bypass: bool,
    /// Most recently computed snapshot.
    cache: Option<DashboardSnapshot>,
    /// Fingerprint the cached snapshot was computed from.
    fingerprint: Option<SourceFingerprint>,
}

impl SnapshotCache {
    pub fn new(data_dir: impl Into<PathBuf>, formula: PctFormula) -> Self {
        Self {
            data_dir: data_dir.into(),
            formula,
            bypass: false,
            cache: None,
            fingerprint: None,
        }
    }

    /// Disable memoization so every refresh recomputes the snapshot.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return a snapshot, recomputing only when the source files changed.
    ///
    /// A failed recompute leaves the previous cache untouched, so a caller
    /// may still fall back to [`cached`](Self::cached) afterwards.
    pub fn refresh(&mut self) -> Result<&DashboardSnapshot> {
        let current = fingerprint(&self.data_dir);

        if !self.bypass && self.fingerprint.as_ref() == Some(&current) {
            if let Some(ref snapshot) = self.cache {
                tracing::debug!("source files unchanged; reusing cached snapshot");
                return Ok(snapshot);
            }
        }

        let snapshot = analyze_activity(&self.data_dir, self.formula)?;
        tracing::debug!(
            records = snapshot.metadata.records_normalized,
            identities = snapshot.metadata.identities_known,
            "snapshot recomputed"
        );
        self.fingerprint = Some(current);
        Ok(self.cache.insert(snapshot))
    }

    /// Discard the snapshot, forcing the next [`refresh`](Self::refresh)
    /// to recompute.
    pub fn invalidate(&mut self) {
        self.cache = None;
        self.fingerprint = None;
        tracing::debug!("snapshot cache invalidated");
    }

    /// The current snapshot, if any refresh has succeeded.
    pub fn cached(&self) -> Option<&DashboardSnapshot> {
        self.cache.as_ref()
    }

    /// Fingerprint the cached snapshot was computed from.
    pub fn last_fingerprint(&self) -> Option<&SourceFingerprint> {
        self.fingerprint.as_ref()
    }

    /// Directory this cache reads from.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
