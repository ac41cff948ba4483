//! Held-modifier tracking
//!
//! Modifier state is never integrated from press/release edges; it is
//! snapshotted from the device's authoritative key state every time a
//! keystroke is built, so missed events cannot make the display drift.

use evdev::{AttributeSet, Key};

/// One of the four logical modifier keys.
///
/// The left and right physical variants collapse into the same logical
/// modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Shift,
    Ctrl,
    Alt,
    Meta,
}

impl ModifierKey {
    pub const ALL: [ModifierKey; 4] = [
        ModifierKey::Shift,
        ModifierKey::Ctrl,
        ModifierKey::Alt,
        ModifierKey::Meta,
    ];

    /// The (left, right) physical key codes for this modifier.
    pub fn halves(self) -> (Key, Key) {
        match self {
            ModifierKey::Shift => (Key::KEY_LEFTSHIFT, Key::KEY_RIGHTSHIFT),
            ModifierKey::Ctrl => (Key::KEY_LEFTCTRL, Key::KEY_RIGHTCTRL),
            ModifierKey::Alt => (Key::KEY_LEFTALT, Key::KEY_RIGHTALT),
            ModifierKey::Meta => (Key::KEY_LEFTMETA, Key::KEY_RIGHTMETA),
        }
    }
}

/// The set of modifiers held at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn get(self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Shift => self.shift,
            ModifierKey::Ctrl => self.ctrl,
            ModifierKey::Alt => self.alt,
            ModifierKey::Meta => self.meta,
        }
    }

    fn slot(&mut self, key: ModifierKey) -> &mut bool {
        match key {
            ModifierKey::Shift => &mut self.shift,
            ModifierKey::Ctrl => &mut self.ctrl,
            ModifierKey::Alt => &mut self.alt,
            ModifierKey::Meta => &mut self.meta,
        }
    }
}

/// Read access to a device key-state snapshot.
pub trait KeySnapshot {
    fn is_pressed(&self, key: Key) -> bool;
}

impl KeySnapshot for AttributeSet<Key> {
    fn is_pressed(&self, key: Key) -> bool {
        self.contains(key)
    }
}

/// Compute the currently-held modifier set from a live key-state
/// snapshot. Either physical half counts toward the logical flag.
pub fn modifier_state<S: KeySnapshot>(snapshot: &S) -> Modifiers {
    let mut held = Modifiers::default();
    for key in ModifierKey::ALL {
        let (left, right) = key.halves();
        *held.slot(key) = snapshot.is_pressed(left) || snapshot.is_pressed(right);
    }
    held
}

/// Pending-release suppression flags, one set per (device, event class).
///
/// When a keystroke is recorded while modifiers are held, those modifiers
/// are marked here; the modifier release that ends the chord then clears
/// its flag instead of being treated as a fresh edge. A flag is consumed
/// at most once per chord.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipSet {
    inner: Modifiers,
}

impl SkipSet {
    pub fn is_set(&self, key: ModifierKey) -> bool {
        self.inner.get(key)
    }

    /// Consume the pending flag for one modifier, reporting whether it
    /// was set.
    pub fn clear(&mut self, key: ModifierKey) -> bool {
        let slot = self.inner.slot(key);
        std::mem::replace(slot, false)
    }

    /// Mark every modifier held during a recorded keystroke as pending.
    pub fn absorb(&mut self, held: Modifiers) {
        self.inner.shift |= held.shift;
        self.inner.ctrl |= held.ctrl;
        self.inner.alt |= held.alt;
        self.inner.meta |= held.meta;
    }
}
