//! Canonical keystrokes

use crate::events::EventClass;
use crate::modifiers::Modifiers;

/// A normalized, displayable key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystroke {
    pub class: EventClass,
    pub code: u16,
    /// Kernel-level name, shown by the unknown-code fallback rendering
    pub name: String,
    /// Display glyph; `None` for codes missing from the symbol table
    pub glyph: Option<String>,
    /// Modifiers held when the key was pressed
    pub held: Modifiers,
    /// Consecutive repeat count
    pub count: u32,
    /// Occupies a history slot but never renders
    pub hidden: bool,
}

impl Keystroke {
    /// Merge identity: the code within its class plus the exact modifier
    /// tuple. Glyph text is deliberately not part of the identity, so a
    /// symbol override between two presses cannot split a repeat run.
    pub fn merges_with(&self, other: &Self) -> bool {
        self.class == other.class && self.code == other.code && self.held == other.held
    }
}
