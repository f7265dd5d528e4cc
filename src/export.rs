use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::domain::entry::{today_ymd, JournalEntry};
use crate::domain::profile::UserProfile;

/// Full backup of the journal in the interchange shape: a metadata block
/// with counts, the profile if one exists, and every entry newest first.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub user_profile: Option<UserProfile>,
    pub entries: Vec<JournalEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_date: String,
    pub app_version: String,
    pub total_entries: u64,
    pub active_entries: u64,
    pub archived_entries: u64,
    pub favorite_entries: u64,
}

pub fn build_document(
    profile: Option<UserProfile>,
    entries: Vec<JournalEntry>,
    app_version: &str,
) -> ExportDocument {
    let total = entries.len() as u64;
    let archived = entries.iter().filter(|entry| entry.is_archived).count() as u64;
    let favorites = entries.iter().filter(|entry| entry.is_favorite).count() as u64;

    ExportDocument {
        metadata: ExportMetadata {
            export_date: now_utc_rfc3339(),
            app_version: app_version.to_string(),
            total_entries: total,
            active_entries: total - archived,
            archived_entries: archived,
            favorite_entries: favorites,
        },
        user_profile: profile,
        entries,
    }
}

/// Writes the document to `dir` as `journal-backup-YYYY-MM-DD.json`,
/// pretty-printed, and returns the path. Overwrites a same-day export.
pub fn write_export(dir: &Path, document: &ExportDocument) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("journal-backup-{}.json", today_ymd()));
    let payload = serde_json::to_string_pretty(document)?;
    std::fs::write(&path, payload)?;
    debug!(path = %path.display(), entries = document.metadata.total_entries, "wrote export");
    Ok(path)
}

/// Removes an export file once the caller is done sharing it. Failure to
/// clean up is logged but never surfaced.
pub fn cleanup_export(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %err, "could not remove export file");
    }
}

pub fn now_utc_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("RFC3339 formatting for UTC timestamp should never fail")
}

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "I/O error: {}", err),
            ExportError::Json(err) => write!(f, "serialization error: {}", err),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        ExportError::Io(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        ExportError::Json(value)
    }
}
