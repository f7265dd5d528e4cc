use std::time::Duration;

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::entry::{EntryPatch, JournalEntry};
use crate::domain::profile::ProfilePatch;

pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Fixed key of the singleton profile row.
const PROFILE_ROW_ID: i64 = 1;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 1] = [Migration {
    version: 1,
    name: "baseline_journal_schema_v1",
    sql: r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS journal_entries (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    date TEXT NOT NULL,
    mood TEXT NOT NULL,
    mood_label TEXT NOT NULL,
    is_archived INTEGER NOT NULL DEFAULT 0,
    is_favorite INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);

CREATE TABLE IF NOT EXISTS user_profile (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    name TEXT NOT NULL,
    bio TEXT,
    profile_picture TEXT,
    created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_entries_date ON journal_entries(date);
CREATE INDEX IF NOT EXISTS idx_entries_archived ON journal_entries(is_archived);
CREATE INDEX IF NOT EXISTS idx_entries_favorite ON journal_entries(is_favorite);
"#,
}];

pub fn open_connection(path: &str) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    configure_for_speed(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn configure_for_speed(conn: &Connection) -> Result<()> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "foreign_keys", "ON")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.pragma_update(None::<DatabaseName>, "busy_timeout", 5000i64)?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
"#,
    )?;

    for migration in MIGRATIONS {
        let already_applied: Option<i64> = tx
            .query_row(
                "SELECT version FROM schema_migrations WHERE version = ?1",
                params![migration.version],
                |row| row.get(0),
            )
            .optional()?;

        if already_applied.is_some() {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![migration.version, migration.name, now_utc_rfc3339()],
        )?;
    }

    tx.execute(
        r#"
INSERT INTO meta (key, value)
VALUES ('schema_version', ?1)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;

    tx.commit()
}

fn now_utc_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("RFC3339 formatting for UTC timestamp should never fail")
}

/// Profile row as stored; `bio` stays nullable here and gets its placeholder
/// default applied at the facade boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub name: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub fn insert_entry(conn: &Connection, entry: &JournalEntry) -> Result<()> {
    conn.execute(
        r#"
INSERT INTO journal_entries (id, title, content, date, mood, mood_label, is_archived, is_favorite)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#,
        params![
            entry.id,
            entry.title,
            entry.content,
            entry.date,
            entry.mood,
            entry.mood_label,
            entry.is_archived as i64,
            entry.is_favorite as i64,
        ],
    )?;
    Ok(())
}

pub fn get_entry(conn: &Connection, id: &str) -> Result<Option<JournalEntry>> {
    conn.query_row(
        r#"
SELECT id, title, content, date, mood, mood_label, is_archived, is_favorite,
       created_at, updated_at
FROM journal_entries
WHERE id = ?1
"#,
        params![id],
        entry_from_row,
    )
    .optional()
}

pub fn list_entries(conn: &Connection) -> Result<Vec<JournalEntry>> {
    let mut stmt = conn.prepare(
        r#"
SELECT id, title, content, date, mood, mood_label, is_archived, is_favorite,
       created_at, updated_at
FROM journal_entries
ORDER BY date DESC, created_at DESC, rowid DESC
"#,
    )?;

    let mut rows = stmt.query([])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(entry_from_row(row)?);
    }
    Ok(result)
}

/// Applies only the fields present in the patch and bumps `updated_at`.
/// Returns the number of rows changed (0 when the id does not exist).
pub fn update_entry(conn: &Connection, id: &str, patch: &EntryPatch) -> Result<usize> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<&dyn ToSql> = Vec::new();

    if let Some(title) = patch.title.as_ref() {
        sets.push("title = ?");
        values.push(title);
    }
    if let Some(content) = patch.content.as_ref() {
        sets.push("content = ?");
        values.push(content);
    }
    if let Some(mood) = patch.mood.as_ref() {
        sets.push("mood = ?");
        values.push(mood);
    }
    if let Some(mood_label) = patch.mood_label.as_ref() {
        sets.push("mood_label = ?");
        values.push(mood_label);
    }
    let archived_flag = patch.is_archived.map(i64::from);
    if let Some(flag) = archived_flag.as_ref() {
        sets.push("is_archived = ?");
        values.push(flag);
    }
    let favorite_flag = patch.is_favorite.map(i64::from);
    if let Some(flag) = favorite_flag.as_ref() {
        sets.push("is_favorite = ?");
        values.push(flag);
    }

    if sets.is_empty() {
        return Ok(0);
    }

    sets.push("updated_at = strftime('%s', 'now')");
    values.push(&id);
    let sql = format!(
        "UPDATE journal_entries SET {} WHERE id = ?",
        sets.join(", ")
    );
    conn.execute(&sql, values.as_slice())
}

pub fn delete_entry(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM journal_entries WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn count_entries(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM journal_entries", [], |row| row.get(0))
}

pub fn get_profile(conn: &Connection) -> Result<Option<ProfileRecord>> {
    conn.query_row(
        r#"
SELECT name, bio, profile_picture, created_at, updated_at
FROM user_profile
WHERE id = ?1
"#,
        params![PROFILE_ROW_ID],
        |row| {
            Ok(ProfileRecord {
                name: row.get(0)?,
                bio: row.get(1)?,
                profile_picture: row.get(2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        },
    )
    .optional()
}

pub fn profile_exists(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM user_profile", [], |row| row.get(0))?;
    Ok(count > 0)
}

pub fn insert_profile(
    conn: &Connection,
    name: &str,
    bio: Option<&str>,
    profile_picture: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO user_profile (id, name, bio, profile_picture) VALUES (?1, ?2, ?3, ?4)",
        params![PROFILE_ROW_ID, name, bio, profile_picture],
    )?;
    Ok(())
}

/// Same partial-update shape as entries. Returns the changed-row count.
pub fn update_profile(conn: &Connection, patch: &ProfilePatch) -> Result<usize> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<&dyn ToSql> = Vec::new();

    if let Some(name) = patch.name.as_ref() {
        sets.push("name = ?");
        values.push(name);
    }
    if let Some(bio) = patch.bio.as_ref() {
        sets.push("bio = ?");
        values.push(bio);
    }
    if let Some(picture) = patch.profile_picture.as_ref() {
        sets.push("profile_picture = ?");
        values.push(picture);
    }

    if sets.is_empty() {
        return Ok(0);
    }

    sets.push("updated_at = strftime('%s', 'now')");
    values.push(&PROFILE_ROW_ID);
    let sql = format!("UPDATE user_profile SET {} WHERE id = ?", sets.join(", "));
    conn.execute(&sql, values.as_slice())
}

pub fn clear_all(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
DELETE FROM journal_entries;
DELETE FROM user_profile;
"#,
    )
}

fn entry_from_row(row: &rusqlite::Row<'_>) -> Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        date: row.get(3)?,
        mood: row.get(4)?,
        mood_label: row.get(5)?,
        is_archived: row.get::<_, i64>(6)? != 0,
        is_favorite: row.get::<_, i64>(7)? != 0,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
