use crate::domain::entry::JournalEntry;

/// Which slice of the journal a listing shows. `All` is the everyday view
/// and hides archived entries; `Favorites` shows starred entries whether or
/// not they are archived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterKind {
    #[default]
    All,
    Archived,
    Favorites,
}

/// Client-side filter applied after the store returns the full ordered
/// list. Fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub kind: FilterKind,
    /// Exact match on the mood glyph.
    pub mood: Option<String>,
    /// Case-insensitive substring match on title and content.
    pub query: Option<String>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        let kind_ok = match self.kind {
            FilterKind::All => !entry.is_archived,
            FilterKind::Archived => entry.is_archived,
            FilterKind::Favorites => entry.is_favorite,
        };
        if !kind_ok {
            return false;
        }

        if let Some(mood) = self.mood.as_deref() {
            if entry.mood != mood {
                return false;
            }
        }

        if let Some(query) = self.query.as_deref() {
            let needle = query.to_lowercase();
            if !entry.title.to_lowercase().contains(&needle)
                && !entry.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }
}

/// Filters an already-ordered list, preserving its order.
pub fn apply_filters(entries: &[JournalEntry], filter: &EntryFilter) -> Vec<JournalEntry> {
    entries
        .iter()
        .filter(|entry| filter.matches(entry))
        .cloned()
        .collect()
}
