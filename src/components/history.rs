use image::RgbaImage;
use std::collections::VecDeque;

use crate::canvas::Surface;
use crate::log_info;

/// Default number of undoable steps kept before the oldest snapshot is evicted.
pub const DEFAULT_MAX_UNDO_STEPS: usize = 50;

/// Default memory cap across all snapshots.
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 256 * 1024 * 1024;

// ============================================================================
// SNAPSHOT — one frozen copy of the canvas
// ============================================================================

/// A full copy of the surface buffer, tagged with a unique id so callers can
/// tell whether the entry they remember is still the current one.
#[derive(Clone)]
pub struct Snapshot {
    id: u64,
    pixels: RgbaImage,
}

impl Snapshot {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    fn memory_size(&self) -> usize {
        self.pixels.as_raw().len()
    }
}

// ============================================================================
// HISTORY MANAGER — linear undo/redo over full snapshots
// ============================================================================

/// Linear undo/redo history. `entries[index]` always matches the visible
/// canvas after a committed operation; pushing after an undo drops every
/// entry past `index`.
pub struct HistoryManager {
    entries: VecDeque<Snapshot>,
    index: usize,
    /// Undoable steps to keep (entries = steps + 1). 0 = unlimited.
    max_undo_steps: usize,
    /// Optional memory cap in bytes.
    max_memory_bytes: Option<usize>,
    /// Running memory total across all entries.
    total_memory: usize,
    next_id: u64,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_STEPS)
    }
}

impl HistoryManager {
    pub fn new(max_undo_steps: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: 0,
            max_undo_steps,
            max_memory_bytes: Some(DEFAULT_MAX_MEMORY_BYTES),
            total_memory: 0,
            next_id: 0,
        }
    }

    pub fn with_memory_limit(mut self, max_memory_bytes: Option<usize>) -> Self {
        self.max_memory_bytes = max_memory_bytes;
        self
    }

    /// Drop everything and seed the history with the surface's current state.
    pub fn reset(&mut self, surface: &Surface) -> u64 {
        self.entries.clear();
        self.total_memory = 0;
        self.index = 0;
        self.push(surface)
    }

    /// Record the surface as a new entry after the current one, discarding
    /// any redo entries. Returns the new entry's id.
    pub fn push(&mut self, surface: &Surface) -> u64 {
        self.truncate_after_index();

        let snapshot = self.make_snapshot(surface);
        let id = snapshot.id;
        self.total_memory += snapshot.memory_size();
        self.entries.push_back(snapshot);
        self.index = self.entries.len() - 1;

        self.prune();
        id
    }

    /// Overwrite the current entry with the surface, discarding redo entries.
    /// Falls back to `push` on an empty history.
    pub fn replace_current(&mut self, surface: &Surface) -> u64 {
        if self.entries.is_empty() {
            return self.push(surface);
        }
        self.truncate_after_index();

        let snapshot = self.make_snapshot(surface);
        let id = snapshot.id;
        let old = std::mem::replace(&mut self.entries[self.index], snapshot);
        self.total_memory = self.total_memory.saturating_sub(old.memory_size());
        self.total_memory += self.entries[self.index].memory_size();
        id
    }

    /// Step back one entry and restore it. Returns false at the oldest entry.
    pub fn undo(&mut self, surface: &mut Surface) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        surface.restore(&self.entries[self.index].pixels);
        true
    }

    /// Step forward one entry and restore it. Returns false at the newest entry.
    pub fn redo(&mut self, surface: &mut Surface) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        surface.restore(&self.entries[self.index].pixels);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.index)
    }

    pub fn current_id(&self) -> Option<u64> {
        self.current().map(Snapshot::id)
    }

    /// Entry immediately before the current one.
    pub fn previous(&self) -> Option<&Snapshot> {
        self.index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Current memory usage of all snapshots (O(1) via cached total)
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    fn make_snapshot(&mut self, surface: &Surface) -> Snapshot {
        let id = self.next_id;
        self.next_id += 1;
        Snapshot {
            id,
            pixels: surface.snapshot(),
        }
    }

    fn truncate_after_index(&mut self) {
        while self.entries.len() > self.index + 1 {
            if let Some(removed) = self.entries.pop_back() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }
    }

    /// Evict the oldest entries to stay within limits. The current entry is never evicted.
    fn prune(&mut self) {
        let mut evicted = 0usize;

        if self.max_undo_steps > 0 {
            while self.entries.len() > self.max_undo_steps + 1 && self.index > 0 {
                self.evict_oldest();
                evicted += 1;
            }
        }

        if let Some(max_bytes) = self.max_memory_bytes {
            while self.total_memory > max_bytes && self.index > 0 {
                self.evict_oldest();
                evicted += 1;
            }
        }

        if evicted > 0 {
            log_info!(
                "History: evicted {} snapshot(s), {} kept ({} bytes)",
                evicted,
                self.entries.len(),
                self.total_memory
            );
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(removed) = self.entries.pop_front() {
            self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            self.index = self.index.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn surface() -> Surface {
        Surface::new(32, 32, 1.0)
    }

    fn paint(surface: &mut Surface, y: f32) {
        surface.stroke_segment(pos2(2.0, y), pos2(30.0, y), 2.0, RED);
    }

    #[test]
    fn reset_seeds_a_single_entry() {
        let s = surface();
        let mut history = HistoryManager::default();
        assert!(history.is_empty());
        history.reset(&s);
        assert!(!history.is_empty());
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_and_redo_walk_the_stack() {
        let mut s = surface();
        let mut history = HistoryManager::default();
        history.reset(&s);
        paint(&mut s, 5.0);
        history.push(&s);
        let painted = s.snapshot();

        assert!(history.undo(&mut s));
        assert!(s.is_blank());
        assert!(!history.undo(&mut s));

        assert!(history.redo(&mut s));
        assert_eq!(s.pixels(), &painted);
        assert!(!history.redo(&mut s));
    }

    #[test]
    fn push_after_undo_truncates_redo_entries() {
        let mut s = surface();
        let mut history = HistoryManager::default();
        history.reset(&s);
        paint(&mut s, 5.0);
        history.push(&s);
        paint(&mut s, 10.0);
        history.push(&s);
        assert_eq!(history.len(), 3);

        history.undo(&mut s);
        paint(&mut s, 20.0);
        history.push(&s);

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn replace_current_keeps_length_and_changes_id() {
        let mut s = surface();
        let mut history = HistoryManager::default();
        history.reset(&s);
        paint(&mut s, 5.0);
        let first = history.push(&s);
        paint(&mut s, 10.0);
        let second = history.replace_current(&s);

        assert_ne!(first, second);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_id(), Some(second));
        assert_eq!(history.current().map(|c| c.pixels()), Some(s.pixels()));
    }

    #[test]
    fn step_cap_evicts_oldest_and_shifts_index() {
        let mut s = surface();
        let mut history = HistoryManager::new(2);
        history.reset(&s);
        for y in [4.0, 8.0, 12.0, 16.0] {
            paint(&mut s, y);
            history.push(&s);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert!(history.undo(&mut s));
        assert!(history.undo(&mut s));
        assert!(!history.undo(&mut s));
    }

    #[test]
    fn memory_cap_keeps_current_entry() {
        let mut s = surface();
        let one = 32 * 32 * 4;
        let mut history = HistoryManager::new(0).with_memory_limit(Some(one));
        history.reset(&s);
        paint(&mut s, 4.0);
        history.push(&s);
        assert_eq!(history.len(), 1);
        assert_eq!(history.memory_usage(), one);
        assert_eq!(history.current().map(|c| c.pixels()), Some(s.pixels()));
    }
}
