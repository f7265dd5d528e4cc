use std::error::Error;
use std::fmt;

use rusqlite::Connection;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::db;
use crate::domain::entry::{days_ago_ymd, today_ymd, JournalEntry};
use crate::domain::mood::Mood;
use crate::legacy::{LegacyStore, ENTRIES_KEY, PROFILE_KEY};

/// One-time transfer of the legacy key-value blobs into the relational
/// store, plus first-run seeding. Runs inside facade initialization and is
/// guarded by an emptiness check, so invoking it on every startup cannot
/// duplicate data.
pub fn run(
    conn: &Connection,
    legacy: Option<&dyn LegacyStore>,
) -> Result<MigrationOutcome, MigrationError> {
    let mut outcome = MigrationOutcome::default();

    if db::count_entries(conn)? != 0 || db::profile_exists(conn)? {
        return Ok(outcome);
    }

    if let Some(legacy) = legacy {
        let entries = match migrate_entries(conn, legacy) {
            Ok(count) => Some(count),
            Err(err) => {
                warn!(error = %err, "legacy entry migration failed; continuing without it");
                None
            }
        };
        let profile = match migrate_profile(conn, legacy) {
            Ok(migrated) => Some(migrated),
            Err(err) => {
                warn!(error = %err, "legacy profile migration failed; continuing without it");
                None
            }
        };

        // Legacy blobs are only discarded once both halves landed.
        if let (Some(count), Some(migrated)) = (entries, profile) {
            outcome.migrated_entries = count;
            outcome.migrated_profile = migrated;
            for key in [ENTRIES_KEY, PROFILE_KEY] {
                if let Err(err) = legacy.remove(key) {
                    warn!(key, error = %err, "failed to clean up legacy key after migration");
                }
            }
            debug!(
                entries = count,
                profile = migrated,
                "legacy migration finished"
            );
        }
    }

    if db::count_entries(conn)? == 0 {
        seed_sample_entries(conn)?;
        outcome.seeded = true;
    }

    Ok(outcome)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub migrated_entries: u64,
    pub migrated_profile: bool,
    pub seeded: bool,
}

/// Entry shape as the legacy layer serialized it; the flag fields were
/// optional there.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEntry {
    id: String,
    title: String,
    content: String,
    date: String,
    mood: String,
    mood_label: String,
    #[serde(default)]
    is_archived: bool,
    #[serde(default)]
    is_favorite: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyProfile {
    name: String,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    profile_picture: Option<String>,
}

fn migrate_entries(conn: &Connection, legacy: &dyn LegacyStore) -> Result<u64, MigrationError> {
    let Some(payload) = legacy.read(ENTRIES_KEY)? else {
        return Ok(0);
    };
    let entries: Vec<LegacyEntry> = serde_json::from_str(&payload)?;
    let count = entries.len() as u64;

    // The legacy list was stored newest-first; insert oldest-first so
    // creation order survives the move.
    for legacy_entry in entries.into_iter().rev() {
        db::insert_entry(conn, &JournalEntry::from(legacy_entry))?;
    }
    Ok(count)
}

fn migrate_profile(conn: &Connection, legacy: &dyn LegacyStore) -> Result<bool, MigrationError> {
    let Some(payload) = legacy.read(PROFILE_KEY)? else {
        return Ok(false);
    };
    let profile: LegacyProfile = serde_json::from_str(&payload)?;
    db::insert_profile(
        conn,
        &profile.name,
        profile.bio.as_deref(),
        profile.profile_picture.as_deref(),
    )?;
    Ok(true)
}

fn seed_sample_entries(conn: &Connection) -> Result<(), MigrationError> {
    let samples = [
        JournalEntry {
            id: "welcome-entry".to_string(),
            title: "Welcome to Your Journal! 🎉".to_string(),
            content: "This is your first journal entry! You can write about anything here - \
                      your thoughts, feelings, daily experiences, or dreams for the future. \
                      Feel free to delete this entry once you've created your own. \
                      Happy journaling! ✨"
                .to_string(),
            date: today_ymd(),
            mood: Mood::Happy.glyph().to_string(),
            mood_label: Mood::Happy.label().to_string(),
            is_archived: false,
            is_favorite: true,
            created_at: 0,
            updated_at: 0,
        },
        JournalEntry {
            id: "sample-thoughtful".to_string(),
            title: "A Moment of Reflection".to_string(),
            content: "Taking time to reflect on my goals and what I'm grateful for. Writing \
                      helps me organize my thoughts and gain clarity about what truly matters \
                      in my life."
                .to_string(),
            date: days_ago_ymd(1),
            mood: Mood::Thoughtful.glyph().to_string(),
            mood_label: Mood::Thoughtful.label().to_string(),
            is_archived: false,
            is_favorite: false,
            created_at: 0,
            updated_at: 0,
        },
    ];

    for sample in &samples {
        db::insert_entry(conn, sample)?;
    }
    debug!(count = samples.len(), "seeded welcome entries");
    Ok(())
}

impl From<LegacyEntry> for JournalEntry {
    fn from(value: LegacyEntry) -> Self {
        Self {
            id: value.id,
            title: value.title,
            content: value.content,
            date: value.date,
            mood: value.mood,
            mood_label: value.mood_label,
            is_archived: value.is_archived,
            is_favorite: value.is_favorite,
            created_at: 0,
            updated_at: 0,
        }
    }
}

#[derive(Debug)]
pub enum MigrationError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    Json(serde_json::Error),
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationError::Io(err) => write!(f, "I/O error: {}", err),
            MigrationError::Db(err) => write!(f, "database error: {}", err),
            MigrationError::Json(err) => write!(f, "legacy payload parse error: {}", err),
        }
    }
}

impl Error for MigrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MigrationError::Io(err) => Some(err),
            MigrationError::Db(err) => Some(err),
            MigrationError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for MigrationError {
    fn from(value: std::io::Error) -> Self {
        MigrationError::Io(value)
    }
}

impl From<rusqlite::Error> for MigrationError {
    fn from(value: rusqlite::Error) -> Self {
        MigrationError::Db(value)
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(value: serde_json::Error) -> Self {
        MigrationError::Json(value)
    }
}
