//! Shared keystroke history
//!
//! A single `History` instance sits behind a mutex shared by every
//! device task. All mutation happens under that lock in bounded,
//! allocation-light steps; no I/O ever runs while it is held.

use std::time::Instant;

use crate::keystroke::Keystroke;

/// History length is softly bounded by this multiple of the last-known
/// display width.
pub const TRIM_FACTOR: usize = 10;

/// The ordered keystroke log, oldest first.
#[derive(Debug)]
pub struct History {
    entries: Vec<Keystroke>,
    display_width: usize,
    last_event: Option<Instant>,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            display_width: 80,
            last_event: None,
        }
    }

    /// Merge a keystroke into the most recent same-class entry, or
    /// append it.
    ///
    /// The merge candidate is found by scanning backward to the most
    /// recent entry of the same class; if it matches under the merge
    /// identity its count is bumped and it is relocated to the end, so
    /// repeats always surface at the "now" edge of the display.
    pub fn record(&mut self, key: Keystroke) {
        self.last_event = Some(Instant::now());

        if let Some(index) = self.entries.iter().rposition(|k| k.class == key.class) {
            if self.entries[index].merges_with(&key) {
                let mut entry = self.entries.remove(index);
                entry.count += 1;
                tracing::trace!(code = entry.code, count = entry.count, "merged repeat");
                self.entries.push(entry);
                self.trim();
                return;
            }
        }

        self.entries.push(key);
        self.trim();
    }

    fn trim(&mut self) {
        let bound = TRIM_FACTOR * self.display_width;
        if bound > 0 && self.entries.len() > bound {
            let excess = self.entries.len() - bound;
            self.entries.drain(..excess);
        }
    }

    /// Drop everything. Only the idle monitor calls this.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_event = None;
    }

    pub fn entries(&self) -> &[Keystroke] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the last keystroke was recorded, if any.
    pub fn last_event(&self) -> Option<Instant> {
        self.last_event
    }

    /// Remember the width the display currently has; the soft bound
    /// follows it.
    pub fn set_display_width(&mut self, width: usize) {
        if width > 0 {
            self.display_width = width;
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
