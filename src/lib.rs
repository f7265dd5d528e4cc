//! Storage core for a personal journaling app: a SQLite-backed entry and
//! profile store, a one-time migration from the legacy key-value layer,
//! JSON export, and the undo/redo + autosave editing session that wraps an
//! open entry.

pub mod db;
pub mod domain;
pub mod export;
pub mod legacy;
pub mod listing;
pub mod migration;
pub mod session;
pub mod store;

pub use domain::entry::{EntryPatch, JournalEntry, NewEntry};
pub use domain::mood::Mood;
pub use domain::profile::{ProfilePatch, UserProfile};
pub use session::EditingSession;
pub use store::{Store, StoreError};
