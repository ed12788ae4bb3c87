//! Clip history engine
//!
//! The ordered, mutable collection of clip entries. Owns insertion,
//! deduplication, pin-aware reordering, count/age eviction, and selection
//! tracking. Display order is the source of truth: pinned entries form a
//! contiguous prefix, unpinned entries follow newest-first.
//!
//! All mutations happen under one lock (the monitor, the sweep, and UI
//! callers all funnel through `Mutex<ClipHistory>`), so the engine itself
//! carries no synchronization.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bridge::ClipboardBridge;
use crate::error::{ApplyError, HistoryError};
use crate::payload::ClipPayload;
use crate::settings::Settings;

/// One entry on the board: a captured payload plus session state.
#[derive(Debug, Clone)]
pub struct ClipEntry {
    pub id: String,
    pub payload: ClipPayload,
    pub pinned: bool,
    pub selected: bool,
}

impl ClipEntry {
    fn new(payload: ClipPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload,
            pinned: false,
            selected: false,
        }
    }

    /// Entries that are pinned or selected survive eviction and clear.
    fn is_protected(&self) -> bool {
        self.pinned || self.selected
    }
}

/// Notifications delivered to observers, at most one `HistoryChanged` per
/// mutating call plus a `SelectionChanged` when the selection transitions.
#[derive(Debug, Clone)]
pub enum HistoryEvent {
    /// The entry list changed; carries a display-order snapshot.
    HistoryChanged(Vec<ClipEntry>),
    /// The selected entry changed (None = nothing selected).
    SelectionChanged(Option<String>),
}

type Observer = Box<dyn Fn(&HistoryEvent) + Send>;

/// The clip history engine.
pub struct ClipHistory {
    entries: Vec<ClipEntry>,
    observers: Vec<Observer>,
    /// Set while an `apply` write is in flight so the resulting clipboard
    /// change notification is not re-captured.
    suppress_capture: bool,
    /// Set when a manual reorder crossed the pinned/unpinned boundary. The
    /// partition check is relaxed until a later operation restores it.
    partition_relaxed: bool,
}

impl Default for ClipHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            observers: Vec::new(),
            suppress_capture: false,
            partition_relaxed: false,
        }
    }

    /// Register an observer for history/selection notifications.
    pub fn subscribe(&mut self, observer: impl Fn(&HistoryEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn entries(&self) -> &[ClipEntry] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<ClipEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ClipEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.selected)
            .map(|e| e.id.as_str())
    }

    /// Handle a freshly classified clipboard capture.
    ///
    /// Ignored entirely while an `apply` write is in flight. Otherwise:
    /// format gate, dedup scan, evict-before-insert, insert at the start of
    /// the unpinned suffix, select the new entry.
    pub fn on_clip_captured(&mut self, payload: ClipPayload, settings: &Settings) {
        if self.suppress_capture {
            debug!("Ignoring self-inflicted clipboard change during apply");
            return;
        }

        // Format gate: captured but discarded, and the most recent attempted
        // clip is not the current selection.
        if !settings.is_format_enabled(payload.format()) {
            debug!(format = %payload.format(), "Capture format disabled, clearing selection");
            if self.set_selection_flags(None) {
                self.emit(HistoryEvent::SelectionChanged(None));
            }
            return;
        }

        // Dedup: full scan against every live entry. A match re-selects the
        // existing entry; no new entry, no reordering.
        if let Some(idx) = self.entries.iter().position(|e| e.payload == payload) {
            debug_assert_eq!(
                self.entries[idx].payload.format(),
                payload.format(),
                "dedup matched across formats"
            );
            let id = self.entries[idx].id.clone();
            debug!(id = %id, "Duplicate capture, re-selecting existing entry");
            if self.set_selection_flags(Some(id.as_str())) {
                self.emit(HistoryEvent::SelectionChanged(Some(id)));
            }
            return;
        }

        // Evict-before-insert: drop the oldest unpinned, unselected entry
        // when over the cap. Pinned and selected entries are never evicted;
        // when nothing qualifies the list transiently exceeds the cap.
        if settings.item_number_limit > 0 && self.entries.len() > settings.item_number_limit {
            match self.entries.iter().rposition(|e| !e.is_protected()) {
                Some(victim) => {
                    let evicted = self.entries.remove(victim);
                    debug!(id = %evicted.id, "Evicted oldest unpinned entry over item limit");
                }
                None => {
                    debug!("Item limit exceeded but every entry is pinned or selected");
                }
            }
        }

        // Insert at the start of the unpinned suffix, directly after the
        // pinned prefix.
        let insert_at = self.first_unpinned_index();
        let entry = ClipEntry::new(payload);
        let id = entry.id.clone();
        debug!(id = %id, index = insert_at, format = %entry.payload.format(), "Captured new clip");
        self.entries.insert(insert_at, entry);

        let selection_changed = self.set_selection_flags(Some(id.as_str()));
        self.assert_invariants();

        self.emit(HistoryEvent::HistoryChanged(self.snapshot()));
        if selection_changed {
            self.emit(HistoryEvent::SelectionChanged(Some(id)));
        }
    }

    /// Periodic age sweep: remove every unprotected entry older than the
    /// configured time limit. No-op when the limit is zero or the board is
    /// empty.
    pub fn evict_expired(&mut self, now: chrono::DateTime<chrono::Utc>, settings: &Settings) {
        if settings.time_limit_minutes == 0 {
            return;
        }

        let limit = i64::from(settings.time_limit_minutes);
        let before = self.entries.len();
        self.entries
            .retain(|e| e.is_protected() || e.payload.age_minutes(now) <= limit);
        let removed = before - self.entries.len();

        if removed > 0 {
            info!(removed, limit_minutes = limit, "Swept expired clip entries");
            self.assert_invariants();
            self.emit(HistoryEvent::HistoryChanged(self.snapshot()));
        }
    }

    /// Toggle pin state and move the entry to the pinned/unpinned boundary:
    /// newly pinned entries become the last of the pinned prefix, newly
    /// unpinned entries become the newest of the unpinned suffix. An entry
    /// already sitting at the boundary is not moved, and a toggle to the
    /// state it already has emits nothing.
    pub fn set_pinned(&mut self, id: &str, pinned: bool) -> Result<(), HistoryError> {
        let idx = self.index_of(id)?;
        if self.entries[idx].pinned == pinned {
            return Ok(());
        }

        self.entries[idx].pinned = pinned;

        // Both directions target the same slot: the boundary between the
        // remaining pinned entries and everything else.
        let target = self
            .entries
            .iter()
            .enumerate()
            .filter(|(i, e)| *i != idx && e.pinned)
            .count();

        if idx != target {
            let entry = self.entries.remove(idx);
            self.entries.insert(target, entry);
            debug!(id = %id, pinned, from = idx, to = target, "Repositioned entry at pin boundary");
        } else {
            debug!(id = %id, pinned, index = idx, "Pin toggled at boundary, no move");
        }

        self.assert_invariants();
        self.emit(HistoryEvent::HistoryChanged(self.snapshot()));
        Ok(())
    }

    /// User-driven drag reorder: detach `moved_id` and re-insert it directly
    /// before `target_id` at the target's post-removal position.
    ///
    /// This is the one operation allowed to cross the pinned/unpinned
    /// boundary; callers are expected to restrict drag targets to the same
    /// partition, and the engine does not re-validate membership afterwards.
    pub fn reorder(&mut self, moved_id: &str, target_id: &str) -> Result<(), HistoryError> {
        if moved_id == target_id {
            return Ok(());
        }

        let moved_idx = self.index_of(moved_id)?;
        self.index_of(target_id)?;

        let entry = self.entries.remove(moved_idx);
        let target_idx = self
            .entries
            .iter()
            .position(|e| e.id == target_id)
            .expect("target checked before removal");
        self.entries.insert(target_idx, entry);
        self.partition_relaxed = !self.partition_intact();

        if target_idx == moved_idx {
            return Ok(());
        }

        debug!(id = %moved_id, from = moved_idx, to = target_idx, "Reordered entry");
        self.emit(HistoryEvent::HistoryChanged(self.snapshot()));
        Ok(())
    }

    /// Select an entry (or clear the selection with `None`).
    pub fn select(&mut self, id: Option<&str>) -> Result<(), HistoryError> {
        if let Some(id) = id {
            self.index_of(id)?;
        }
        if self.set_selection_flags(id) {
            self.emit(HistoryEvent::SelectionChanged(id.map(str::to_string)));
        }
        Ok(())
    }

    /// Mark the entry as the sole selection and hand its payload to the
    /// bridge for writing to the system clipboard. Capture is suppressed for
    /// the duration of the write so the echo is not re-captured. On write
    /// failure the entry stays selected and the error is surfaced; nothing
    /// is retried.
    pub fn apply(
        &mut self,
        id: &str,
        bridge: &mut dyn ClipboardBridge,
    ) -> Result<(), ApplyError> {
        let idx = self.index_of(id)?;

        if self.set_selection_flags(Some(id)) {
            self.emit(HistoryEvent::SelectionChanged(Some(id.to_string())));
        }

        let payload = self.entries[idx].payload.clone();
        self.suppress_capture = true;
        let result = bridge.write(&payload);
        self.suppress_capture = false;

        match result {
            Ok(()) => {
                info!(id = %id, format = %payload.format(), "Applied entry to system clipboard");
                Ok(())
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to apply entry to system clipboard");
                Err(ApplyError::Write(e))
            }
        }
    }

    /// Remove every entry that is neither pinned nor selected.
    pub fn clear(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|e| e.is_protected());
        let removed = before - self.entries.len();

        if removed > 0 {
            info!(removed, kept = self.entries.len(), "Cleared unprotected clip entries");
            self.assert_invariants();
            self.emit(HistoryEvent::HistoryChanged(self.snapshot()));
        }
    }

    /// Index of the first unpinned entry; equals `len()` when every entry is
    /// pinned.
    fn first_unpinned_index(&self) -> usize {
        self.entries
            .iter()
            .position(|e| !e.pinned)
            .unwrap_or(self.entries.len())
    }

    /// Whether pinned entries currently form a contiguous prefix.
    fn partition_intact(&self) -> bool {
        let boundary = self.first_unpinned_index();
        self.entries[boundary..].iter().all(|e| !e.pinned)
    }

    fn index_of(&self, id: &str) -> Result<usize, HistoryError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| HistoryError::EntryNotFound { id: id.to_string() })
    }

    /// Set selection flags so that at most `target` is selected. Returns
    /// whether the selected id actually changed. Emits nothing.
    fn set_selection_flags(&mut self, target: Option<&str>) -> bool {
        let current = self.selected_id().map(str::to_string);
        if current.as_deref() == target {
            return false;
        }
        for entry in &mut self.entries {
            entry.selected = Some(entry.id.as_str()) == target;
        }
        true
    }

    fn emit(&self, event: HistoryEvent) {
        for observer in &self.observers {
            observer(&event);
        }
    }

    /// Debug-build invariant checks. A manual reorder may legitimately cross
    /// the pinned/unpinned boundary, so the partition check stays relaxed
    /// from that point until some operation restores the partition; the
    /// selection and uniqueness checks always apply.
    fn assert_invariants(&mut self) {
        if cfg!(debug_assertions) {
            if self.partition_relaxed {
                self.partition_relaxed = !self.partition_intact();
            }
            debug_assert!(
                self.partition_relaxed || self.partition_intact(),
                "pinned entries must form a contiguous prefix"
            );
            debug_assert!(
                self.entries.iter().filter(|e| e.selected).count() <= 1,
                "at most one entry may be selected"
            );
            for (i, a) in self.entries.iter().enumerate() {
                for b in &self.entries[i + 1..] {
                    debug_assert!(a.payload != b.payload, "duplicate payloads in history");
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn force_suppress(&mut self, on: bool) {
        self.suppress_capture = on;
    }
}
