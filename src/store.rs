use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, ErrorCode};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db;
use crate::domain::entry::{today_ymd, EntryPatch, JournalEntry, NewEntry};
use crate::domain::profile::{
    generate_display_name, ProfilePatch, UserProfile, DEFAULT_BIO,
};
use crate::export::{self, ExportDocument, ExportError};
use crate::legacy::LegacyStore;
use crate::listing::{apply_filters, EntryFilter};
use crate::migration;

/// How many times a single store call will try before giving up.
const MAX_ATTEMPTS: u32 = 3;
/// Base delay between attempts; attempt n waits n times this.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

enum ConnState {
    Closed,
    Open(Connection),
    /// The last call exhausted its attempts. The next call starts over
    /// from a fresh connection.
    Failed,
}

/// Facade over the SQLite layer. Owns the connection lifecycle: opens
/// lazily, runs the legacy migration once on first open, and retries
/// transient failures with a fresh connection before surfacing them.
pub struct Store {
    path: PathBuf,
    state: ConnState,
    legacy: Option<Box<dyn LegacyStore>>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: ConnState::Closed,
            legacy: None,
        }
    }

    /// A store that will drain the given legacy key-value layer on first
    /// open.
    pub fn with_legacy(path: impl Into<PathBuf>, legacy: Box<dyn LegacyStore>) -> Self {
        Self {
            path: path.into(),
            state: ConnState::Closed,
            legacy: Some(legacy),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the connection and runs schema setup plus the one-time
    /// migration. Calling this again is a no-op; it exists so startup can
    /// surface connection problems eagerly instead of on first use.
    pub fn initialize(&mut self) -> Result<(), StoreError> {
        self.with_conn(|_conn| Ok(()))
    }

    fn with_conn<T>(
        &mut self,
        op: impl Fn(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let mut last_err: Option<rusqlite::Error> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                std::thread::sleep(RETRY_BASE_DELAY * (attempt - 1));
            }

            if !matches!(self.state, ConnState::Open(_)) {
                let path = self.path.to_string_lossy();
                match db::open_connection(&path) {
                    Ok(conn) => {
                        match migration::run(&conn, self.legacy.as_deref()) {
                            Ok(outcome) => debug!(?outcome, "store opened"),
                            Err(err) => {
                                warn!(error = %err, "startup migration failed; store opened without it");
                            }
                        }
                        self.state = ConnState::Open(conn);
                    }
                    Err(err) if is_transient(&err) => {
                        warn!(attempt, error = %err, "could not open database; will retry");
                        last_err = Some(err);
                        continue;
                    }
                    Err(err) => {
                        self.state = ConnState::Failed;
                        return Err(StoreError::Db(err));
                    }
                }
            }

            let conn = match &self.state {
                ConnState::Open(conn) => conn,
                _ => continue,
            };

            match op(conn) {
                Ok(value) => return Ok(value),
                Err(err) if is_transient(&err) => {
                    warn!(attempt, error = %err, "store call failed; reopening connection");
                    self.state = ConnState::Closed;
                    last_err = Some(err);
                }
                Err(err) => return Err(StoreError::Db(err)),
            }
        }

        self.state = ConnState::Failed;
        Err(StoreError::Db(
            last_err.unwrap_or(rusqlite::Error::InvalidQuery),
        ))
    }

    /// Creates a fresh entry dated today with a store-assigned id, then
    /// reads it back so the caller sees the real timestamps.
    pub fn create_entry(&mut self, new: NewEntry) -> Result<JournalEntry, StoreError> {
        let entry = JournalEntry {
            id: format!("J-{}", Uuid::now_v7()),
            title: new.title,
            content: new.content,
            date: today_ymd(),
            mood: new.mood.glyph().to_string(),
            mood_label: new.mood.label().to_string(),
            is_archived: false,
            is_favorite: false,
            created_at: 0,
            updated_at: 0,
        };
        self.insert_entry(&entry)?;
        self.get_entry(&entry.id)?
            .ok_or(StoreError::NotFound(entry.id))
    }

    /// Inserts an entry with a caller-chosen id, e.g. when restoring a
    /// backup. Fails with [`StoreError::DuplicateId`] when the id is taken.
    pub fn insert_entry(&mut self, entry: &JournalEntry) -> Result<(), StoreError> {
        self.with_conn(|conn| db::insert_entry(conn, entry))
            .map_err(|err| match err {
                StoreError::Db(db_err) if is_constraint(&db_err) => {
                    StoreError::DuplicateId(entry.id.clone())
                }
                other => other,
            })
    }

    pub fn get_entry(&mut self, id: &str) -> Result<Option<JournalEntry>, StoreError> {
        self.with_conn(|conn| db::get_entry(conn, id))
    }

    /// All entries, newest first: by date, then by creation time within a
    /// day.
    pub fn list_entries(&mut self) -> Result<Vec<JournalEntry>, StoreError> {
        self.with_conn(db::list_entries)
    }

    pub fn list_entries_with(
        &mut self,
        filter: &EntryFilter,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        let entries = self.list_entries()?;
        Ok(apply_filters(&entries, filter))
    }

    /// Applies the patch to the entry. An empty patch succeeds without
    /// touching the database; a missing id is logged and otherwise ignored.
    pub fn update_entry(&mut self, id: &str, patch: &EntryPatch) -> Result<(), StoreError> {
        if !patch.has_changes() {
            return Ok(());
        }
        let changed = self.with_conn(|conn| db::update_entry(conn, id, patch))?;
        if changed == 0 {
            warn!(id, "update targeted a missing entry; nothing written");
        }
        Ok(())
    }

    /// Deletes the entry if present. Deleting a missing id is not an
    /// error.
    pub fn delete_entry(&mut self, id: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| db::delete_entry(conn, id))
    }

    /// Moves the entry in or out of the archive and returns the stored
    /// result.
    pub fn set_archived(&mut self, id: &str, archived: bool) -> Result<JournalEntry, StoreError> {
        let patch = EntryPatch {
            is_archived: Some(archived),
            ..EntryPatch::default()
        };
        self.patch_existing(id, &patch)
    }

    /// Flips the favorite star and returns the stored result.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<JournalEntry, StoreError> {
        let current = self
            .get_entry(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let patch = EntryPatch {
            is_favorite: Some(!current.is_favorite),
            ..EntryPatch::default()
        };
        self.patch_existing(id, &patch)
    }

    fn patch_existing(&mut self, id: &str, patch: &EntryPatch) -> Result<JournalEntry, StoreError> {
        let changed = self.with_conn(|conn| db::update_entry(conn, id, patch))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.get_entry(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// The stored profile, if any, with the placeholder bio substituted
    /// for an empty one.
    pub fn get_profile(&mut self) -> Result<Option<UserProfile>, StoreError> {
        let record = self.with_conn(db::get_profile)?;
        Ok(record.map(profile_from_record))
    }

    /// Returns the profile, creating one with a generated display name on
    /// first use.
    pub fn ensure_profile(&mut self) -> Result<UserProfile, StoreError> {
        if let Some(profile) = self.get_profile()? {
            return Ok(profile);
        }
        let name = generate_display_name();
        debug!(name = %name, "creating first-run profile");
        self.insert_profile(&UserProfile {
            name: name.clone(),
            bio: String::new(),
            profile_picture: None,
        })?;
        Ok(UserProfile {
            name,
            bio: DEFAULT_BIO.to_string(),
            profile_picture: None,
        })
    }

    /// Creates the singleton profile row. Fails with
    /// [`StoreError::ProfileExists`] when one is already stored.
    pub fn insert_profile(&mut self, profile: &UserProfile) -> Result<(), StoreError> {
        let bio = if profile.bio.is_empty() {
            None
        } else {
            Some(profile.bio.as_str())
        };
        self.with_conn(|conn| {
            db::insert_profile(conn, &profile.name, bio, profile.profile_picture.as_deref())
        })
        .map_err(|err| match err {
            StoreError::Db(db_err) if is_constraint(&db_err) => StoreError::ProfileExists,
            other => other,
        })
    }

    /// Applies the patch to the profile. As with entries, an empty patch
    /// succeeds and a missing row is logged and ignored.
    pub fn update_profile(&mut self, patch: &ProfilePatch) -> Result<(), StoreError> {
        if !patch.has_changes() {
            return Ok(());
        }
        let changed = self.with_conn(|conn| db::update_profile(conn, patch))?;
        if changed == 0 {
            warn!("profile update before any profile exists; nothing written");
        }
        Ok(())
    }

    /// Wipes all entries and the profile. Schema and legacy blobs are left
    /// alone.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.with_conn(db::clear_all)
    }

    /// Builds the full backup document from the current contents.
    pub fn export_document(&mut self, app_version: &str) -> Result<ExportDocument, StoreError> {
        let profile = self.get_profile()?;
        let entries = self.list_entries()?;
        Ok(export::build_document(profile, entries, app_version))
    }

    /// Builds the backup document and writes it to `dir` as a dated,
    /// pretty-printed JSON file.
    pub fn export_to_dir(
        &mut self,
        dir: &Path,
        app_version: &str,
    ) -> Result<PathBuf, StoreError> {
        let document = self.export_document(app_version)?;
        Ok(export::write_export(dir, &document)?)
    }
}

fn profile_from_record(record: db::ProfileRecord) -> UserProfile {
    let bio = match record.bio {
        Some(bio) if !bio.is_empty() => bio,
        _ => DEFAULT_BIO.to_string(),
    };
    UserProfile {
        name: record.name,
        bio,
        profile_picture: record.profile_picture,
    }
}

/// Errors worth retrying against a fresh connection. Constraint and shape
/// errors are deterministic and surface immediately.
fn is_transient(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(
            ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::DiskFull
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
        )
    )
}

fn is_constraint(err: &rusqlite::Error) -> bool {
    err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}

#[derive(Debug)]
pub enum StoreError {
    Db(rusqlite::Error),
    Export(ExportError),
    DuplicateId(String),
    ProfileExists,
    NotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Db(err) => write!(f, "database error: {}", err),
            StoreError::Export(err) => write!(f, "export error: {}", err),
            StoreError::DuplicateId(id) => write!(f, "entry id '{}' already exists", id),
            StoreError::ProfileExists => write!(f, "a profile already exists"),
            StoreError::NotFound(id) => write!(f, "no entry with id '{}'", id),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Db(err) => Some(err),
            StoreError::Export(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Db(value)
    }
}

impl From<ExportError> for StoreError {
    fn from(value: ExportError) -> Self {
        StoreError::Export(value)
    }
}

#[cfg(test)]
mod tests;
