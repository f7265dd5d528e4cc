use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::domain::entry::{EntryPatch, JournalEntry};
use crate::store::{Store, StoreError};

/// Most snapshots a session keeps; the oldest falls off beyond this.
pub const HISTORY_LIMIT: usize = 100;
/// Quiet period after a keystroke before the draft becomes an undo step.
pub const HISTORY_DEBOUNCE: Duration = Duration::from_millis(300);
/// Quiet period after a keystroke before the draft is written to the store.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(2);

/// Time source for the debounce timers. Injected so tests can drive the
/// clock by hand instead of sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// The editable pair of fields at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub title: String,
    pub content: String,
}

impl Snapshot {
    fn of(entry: &JournalEntry) -> Self {
        Self {
            title: entry.title.clone(),
            content: entry.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    /// An undo or redo is being applied; replayed text must not spawn a
    /// new history step of its own.
    Replaying,
}

/// What a [`EditingSession::poll`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub committed_history: bool,
    pub autosaved: bool,
}

/// Wraps one open entry with undo/redo history and debounced autosave.
///
/// Edits update the live draft immediately and re-arm two timers. When the
/// short one expires the draft becomes an undo step; when the long one
/// expires the draft is written to the store. The session never writes on
/// the edit path itself, so typing stays cheap. Call [`poll`] from the
/// host's tick to let timers fire, and [`finish`] before dropping the
/// session so nothing typed is lost.
///
/// [`poll`]: EditingSession::poll
/// [`finish`]: EditingSession::finish
pub struct EditingSession<C: Clock = SystemClock> {
    entry_id: String,
    history: VecDeque<Snapshot>,
    cursor: usize,
    live: Snapshot,
    persisted: Snapshot,
    state: SessionState,
    history_due: Option<Instant>,
    autosave_due: Option<Instant>,
    clock: C,
}

impl EditingSession<SystemClock> {
    pub fn new(entry: &JournalEntry) -> Self {
        Self::with_clock(entry, SystemClock)
    }
}

impl<C: Clock> EditingSession<C> {
    pub fn with_clock(entry: &JournalEntry, clock: C) -> Self {
        let initial = Snapshot::of(entry);
        let mut history = VecDeque::new();
        history.push_back(initial.clone());
        Self {
            entry_id: entry.id.clone(),
            history,
            cursor: 0,
            live: initial.clone(),
            persisted: initial,
            state: SessionState::Editing,
            history_due: None,
            autosave_due: None,
            clock,
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn title(&self) -> &str {
        &self.live.title
    }

    pub fn content(&self) -> &str {
        &self.live.content
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the live draft differs from what the store last saw.
    pub fn is_dirty(&self) -> bool {
        self.live != self.persisted
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0 || self.pending_history_step()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    pub fn edit_title(&mut self, title: impl Into<String>) {
        self.live.title = title.into();
        self.arm_timers();
    }

    pub fn edit_content(&mut self, content: impl Into<String>) {
        self.live.content = content.into();
        self.arm_timers();
    }

    /// Re-arms the debounce timers after the live draft changed. History
    /// is only scheduled while `Editing`; replayed drafts must not record
    /// themselves as new steps. Autosave is only scheduled while the
    /// draft actually differs from what the store holds.
    fn arm_timers(&mut self) {
        let now = self.clock.now();
        if self.state == SessionState::Editing {
            self.history_due = Some(now + HISTORY_DEBOUNCE);
        }
        self.autosave_due = if self.is_dirty() {
            Some(now + AUTOSAVE_DEBOUNCE)
        } else {
            None
        };
    }

    /// Steps back one snapshot. Text still waiting on the history timer is
    /// committed first, so undo right after typing reverts that typing.
    /// Returns false at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        self.commit_pending_history();
        if self.cursor == 0 {
            return false;
        }
        self.replay(self.cursor - 1);
        true
    }

    /// Steps forward one snapshot. Returns false when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        self.commit_pending_history();
        if !self.can_redo() {
            return false;
        }
        self.replay(self.cursor + 1);
        true
    }

    /// Fires whichever debounce timers have expired: commits the draft to
    /// history and/or writes it to the store. Autosave failures are logged
    /// and retried on a later poll; the session stays dirty.
    pub fn poll(&mut self, store: &mut Store) -> PollOutcome {
        let now = self.clock.now();
        let mut outcome = PollOutcome::default();

        if self.history_due.is_some_and(|due| now >= due) {
            self.history_due = None;
            outcome.committed_history = self.commit_history();
        }

        if self.autosave_due.is_some_and(|due| now >= due) {
            // Nothing to write when the draft already matches the store,
            // e.g. after undoing back to the last-saved text.
            if !self.is_dirty() {
                self.autosave_due = None;
                return outcome;
            }
            match self.write_back(store) {
                Ok(()) => {
                    self.autosave_due = None;
                    outcome.autosaved = true;
                }
                Err(err) => {
                    warn!(entry_id = %self.entry_id, error = %err, "autosave failed; will retry");
                    self.autosave_due = Some(now + AUTOSAVE_DEBOUNCE);
                }
            }
        }

        outcome
    }

    /// Writes the draft to the store now if it is dirty, cancelling the
    /// autosave timer. Unlike autosave, failures surface to the caller.
    /// Returns whether anything was written.
    pub fn flush(&mut self, store: &mut Store) -> Result<bool, StoreError> {
        self.autosave_due = None;
        if !self.is_dirty() {
            return Ok(false);
        }
        self.write_back(store)?;
        Ok(true)
    }

    /// Closes out the session: commits any pending history step and
    /// flushes the draft.
    pub fn finish(&mut self, store: &mut Store) -> Result<bool, StoreError> {
        self.commit_pending_history();
        self.flush(store)
    }

    fn pending_history_step(&self) -> bool {
        self.history_due.is_some() && self.live != self.history[self.cursor]
    }

    fn commit_pending_history(&mut self) {
        if self.history_due.take().is_some() {
            self.commit_history();
        }
    }

    /// Pushes the live draft as a new snapshot after the cursor, dropping
    /// any redo tail and the oldest step once the cap is hit. Returns
    /// whether a step was actually added.
    fn commit_history(&mut self) -> bool {
        if self.live == self.history[self.cursor] {
            return false;
        }
        self.history.truncate(self.cursor + 1);
        self.history.push_back(self.live.clone());
        self.cursor += 1;
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
            self.cursor -= 1;
        }
        true
    }

    fn replay(&mut self, cursor: usize) {
        self.state = SessionState::Replaying;
        self.cursor = cursor;
        self.live = self.history[cursor].clone();
        // Same timer path as an edit; the Replaying state keeps the
        // replayed draft out of history and an undo back to the saved
        // text arms no autosave at all.
        self.arm_timers();
        self.state = SessionState::Editing;
        debug!(entry_id = %self.entry_id, cursor, "replayed history snapshot");
    }

    fn write_back(&mut self, store: &mut Store) -> Result<(), StoreError> {
        let patch = EntryPatch {
            title: Some(self.live.title.clone()),
            content: Some(self.live.content.clone()),
            ..EntryPatch::default()
        };
        store.update_entry(&self.entry_id, &patch)?;
        self.persisted = self.live.clone();
        Ok(())
    }
}
