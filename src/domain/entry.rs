use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use crate::domain::mood::Mood;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Today's calendar date in the stored `YYYY-MM-DD` form.
pub fn today_ymd() -> String {
    format_ymd(OffsetDateTime::now_utc())
}

/// The date `days` days before today in the same stored form.
pub fn days_ago_ymd(days: i64) -> String {
    format_ymd(OffsetDateTime::now_utc() - Duration::days(days))
}

fn format_ymd(moment: OffsetDateTime) -> String {
    moment
        .date()
        .format(DATE_FORMAT)
        .expect("YYYY-MM-DD formatting should never fail")
}

/// A journal entry as read from the store. `id` and `date` are immutable
/// after creation; `created_at` and `updated_at` are unix seconds maintained
/// by the store, never by the caller.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub mood: String,
    pub mood_label: String,
    pub is_archived: bool,
    pub is_favorite: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a fresh entry. The store assigns the id, today's
/// date, and the timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub title: String,
    pub content: String,
    pub mood: Mood,
}

/// Partial update applied to an existing entry; only present fields are
/// written. An empty patch is a successful no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub mood_label: Option<String>,
    pub is_archived: Option<bool>,
    pub is_favorite: Option<bool>,
}

impl EntryPatch {
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.mood.is_some()
            || self.mood_label.is_some()
            || self.is_archived.is_some()
            || self.is_favorite.is_some()
    }

    /// Sets both the glyph and the label from the palette, so the pair can
    /// never drift apart through a partial update.
    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood.glyph().to_string());
        self.mood_label = Some(mood.label().to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::EntryPatch;
    use crate::domain::mood::Mood;

    #[test]
    fn empty_patch_has_no_changes() {
        assert!(!EntryPatch::default().has_changes());
    }

    #[test]
    fn with_mood_sets_glyph_and_label_together() {
        let patch = EntryPatch::default().with_mood(Mood::Tired);
        assert_eq!(patch.mood.as_deref(), Some("😴"));
        assert_eq!(patch.mood_label.as_deref(), Some("Tired"));
        assert!(patch.has_changes());
    }
}
