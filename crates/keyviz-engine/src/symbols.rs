//! Glyph tables
//!
//! Maps (class, code) pairs to display glyphs. Codes missing from the
//! table are not filtered out; they surface through the unknown-code
//! fallback so missing mappings stay visible.

use std::collections::HashMap;

use evdev::Key;
use keyviz_config::{DisplayConfig, InputConfig, ModGlyphs};

use crate::events::{resolve_event, EventClass, ResolveError};
use crate::modifiers::ModifierKey;

/// Glyph assigned to codes that must never be displayed.
pub const HIDDEN_GLYPH: &str = "\0";

/// The per-process glyph table.
///
/// Built once at startup from the defaults, the decoration glyph set and
/// the resolved config overrides; immutable afterwards and shared by
/// every device task.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    glyphs: HashMap<(EventClass, u16), String>,
    modifier_halves: HashMap<String, ModifierKey>,
    decorations: ModGlyphs,
}

impl SymbolTable {
    pub fn new(decorations: &ModGlyphs) -> Self {
        Self::with_overrides(decorations, &[])
    }

    /// Build the table with config overrides applied on top of the
    /// defaults.
    ///
    /// The glyphs that identify modifier halves are recomputed after the
    /// overrides, so overriding a modifier key's glyph moves its control
    /// behavior along with it.
    pub fn with_overrides(
        decorations: &ModGlyphs,
        overrides: &[((EventClass, u16), String)],
    ) -> Self {
        let mut glyphs = default_glyphs();

        for key in ModifierKey::ALL {
            let decor = match key {
                ModifierKey::Shift => &decorations.shift,
                ModifierKey::Ctrl => &decorations.ctrl,
                ModifierKey::Alt => &decorations.alt,
                ModifierKey::Meta => &decorations.meta,
            };
            let (left, right) = key.halves();
            glyphs.insert(
                (EventClass::Key, left.code()),
                format!("{}{}", decorations.left, decor),
            );
            glyphs.insert(
                (EventClass::Key, right.code()),
                format!("{}{}", decor, decorations.right),
            );
        }

        for (target, glyph) in overrides {
            glyphs.insert(*target, glyph.clone());
        }

        let mut modifier_halves = HashMap::new();
        for key in ModifierKey::ALL {
            let (left, right) = key.halves();
            for half in [left, right] {
                if let Some(glyph) = glyphs.get(&(EventClass::Key, half.code())) {
                    modifier_halves.insert(glyph.clone(), key);
                }
            }
        }

        Self {
            glyphs,
            modifier_halves,
            decorations: decorations.clone(),
        }
    }

    /// Build the table from the resolved configuration, rejecting
    /// override names the kernel does not know.
    pub fn from_config(
        display: &DisplayConfig,
        input: &InputConfig,
    ) -> Result<Self, ResolveError> {
        let mut overrides = Vec::with_capacity(input.symbols.len());
        for (name, glyph) in &input.symbols {
            overrides.push((resolve_event(name)?, glyph.clone()));
        }
        Ok(Self::with_overrides(&display.glyphs, &overrides))
    }

    pub fn lookup(&self, class: EventClass, code: u16) -> Option<&str> {
        self.glyphs.get(&(class, code)).map(String::as_str)
    }

    /// Whether this glyph currently marks one half of a modifier pair.
    pub fn modifier_for_glyph(&self, glyph: &str) -> Option<ModifierKey> {
        self.modifier_halves.get(glyph).copied()
    }

    pub fn decorations(&self) -> &ModGlyphs {
        &self.decorations
    }

    /// The shifted form of a plain character, if the US layout defines
    /// one.
    pub fn shifted(&self, c: char) -> Option<char> {
        let shifted = match c {
            'a'..='z' => c.to_ascii_uppercase(),
            '`' => '~',
            '1' => '!',
            '2' => '@',
            '3' => '#',
            '4' => '$',
            '5' => '%',
            '6' => '^',
            '7' => '&',
            '8' => '*',
            '9' => '(',
            '0' => ')',
            '-' => '_',
            '=' => '+',
            '[' => '{',
            ']' => '}',
            ';' => ':',
            '\'' => '"',
            ',' => '<',
            '.' => '>',
            '/' => '?',
            '\\' => '|',
            _ => return None,
        };
        Some(shifted)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new(&ModGlyphs::default())
    }
}

fn default_glyphs() -> HashMap<(EventClass, u16), String> {
    let pairs: &[(Key, &str)] = &[
        (Key::KEY_RESERVED, HIDDEN_GLYPH),
        (Key::BTN_RIGHT, "\u{efba}\u{eb70}"),
        (Key::BTN_LEFT, "\u{eb6f}\u{efba}"),
        (Key::BTN_MIDDLE, "\u{eb8a}\u{efba}\u{eb8a}"),
        (Key::BTN_EXTRA, "\u{efba}\u{b9}"),
        (Key::BTN_SIDE, "\u{efba}\u{b2}"),
        (Key::KEY_ESC, "\u{f1968}"),
        (Key::KEY_1, "1"),
        (Key::KEY_2, "2"),
        (Key::KEY_3, "3"),
        (Key::KEY_4, "4"),
        (Key::KEY_5, "5"),
        (Key::KEY_6, "6"),
        (Key::KEY_7, "7"),
        (Key::KEY_8, "8"),
        (Key::KEY_9, "9"),
        (Key::KEY_0, "0"),
        (Key::KEY_MINUS, "-"),
        (Key::KEY_EQUAL, "="),
        (Key::KEY_BACKSPACE, "\u{f006e}"),
        (Key::KEY_DELETE, "\u{f0e7e}"),
        (Key::KEY_TAB, "↹"),
        (Key::KEY_Q, "Q"),
        (Key::KEY_W, "W"),
        (Key::KEY_E, "E"),
        (Key::KEY_R, "R"),
        (Key::KEY_T, "T"),
        (Key::KEY_Y, "Y"),
        (Key::KEY_U, "U"),
        (Key::KEY_I, "I"),
        (Key::KEY_O, "O"),
        (Key::KEY_P, "P"),
        (Key::KEY_LEFTBRACE, "["),
        (Key::KEY_RIGHTBRACE, "]"),
        (Key::KEY_ENTER, "↲"),
        (Key::KEY_A, "A"),
        (Key::KEY_S, "S"),
        (Key::KEY_D, "D"),
        (Key::KEY_F, "F"),
        (Key::KEY_G, "G"),
        (Key::KEY_H, "H"),
        (Key::KEY_J, "J"),
        (Key::KEY_K, "K"),
        (Key::KEY_L, "L"),
        (Key::KEY_SEMICOLON, ";"),
        (Key::KEY_APOSTROPHE, "'"),
        (Key::KEY_GRAVE, "`"),
        (Key::KEY_BACKSLASH, "\\"),
        (Key::KEY_Z, "Z"),
        (Key::KEY_X, "X"),
        (Key::KEY_C, "C"),
        (Key::KEY_V, "V"),
        (Key::KEY_B, "B"),
        (Key::KEY_N, "N"),
        (Key::KEY_M, "M"),
        (Key::KEY_COMMA, ","),
        (Key::KEY_DOT, "."),
        (Key::KEY_SLASH, "/"),
        (Key::KEY_LEFT, "←"),
        (Key::KEY_RIGHT, "→"),
        (Key::KEY_UP, "↑"),
        (Key::KEY_DOWN, "↓"),
        (Key::KEY_SPACE, "⋯"),
        (Key::KEY_HOME, "⇐"),
        (Key::KEY_END, "⇒"),
        (Key::KEY_PAGEUP, "↥"),
        (Key::KEY_PAGEDOWN, "↧"),
        (Key::KEY_INSERT, "INS"),
    ];

    let mut glyphs: HashMap<(EventClass, u16), String> = pairs
        .iter()
        .map(|(key, glyph)| ((EventClass::Key, key.code()), (*glyph).to_string()))
        .collect();

    let function_keys = [
        Key::KEY_F1,
        Key::KEY_F2,
        Key::KEY_F3,
        Key::KEY_F4,
        Key::KEY_F5,
        Key::KEY_F6,
        Key::KEY_F7,
        Key::KEY_F8,
        Key::KEY_F9,
        Key::KEY_F10,
        Key::KEY_F11,
        Key::KEY_F12,
        Key::KEY_F13,
        Key::KEY_F14,
        Key::KEY_F15,
        Key::KEY_F16,
        Key::KEY_F17,
        Key::KEY_F18,
        Key::KEY_F19,
        Key::KEY_F20,
        Key::KEY_F21,
        Key::KEY_F22,
        Key::KEY_F23,
        Key::KEY_F24,
    ];
    for (i, key) in function_keys.into_iter().enumerate() {
        glyphs.insert((EventClass::Key, key.code()), format!("\u{f0295}{}", i + 1));
    }

    let keypad_digits = [
        Key::KEY_KP0,
        Key::KEY_KP1,
        Key::KEY_KP2,
        Key::KEY_KP3,
        Key::KEY_KP4,
        Key::KEY_KP5,
        Key::KEY_KP6,
        Key::KEY_KP7,
        Key::KEY_KP8,
        Key::KEY_KP9,
    ];
    for (i, key) in keypad_digits.into_iter().enumerate() {
        glyphs.insert((EventClass::Key, key.code()), format!("#{}", i));
    }

    glyphs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookups() {
        let table = SymbolTable::default();
        assert_eq!(table.lookup(EventClass::Key, Key::KEY_Q.code()), Some("Q"));
        assert_eq!(table.lookup(EventClass::Key, Key::KEY_KP8.code()), Some("#8"));
        assert_eq!(
            table.lookup(EventClass::Key, Key::KEY_F12.code()),
            Some("\u{f0295}12")
        );
        assert_eq!(
            table.lookup(EventClass::Key, Key::KEY_RESERVED.code()),
            Some(HIDDEN_GLYPH)
        );
        assert_eq!(table.lookup(EventClass::Key, Key::KEY_CAPSLOCK.code()), None);
        assert_eq!(table.lookup(EventClass::Switch, 0), None);
    }

    #[test]
    fn test_modifier_halves_are_identified() {
        let table = SymbolTable::default();
        let decor = ModGlyphs::default();

        let left_shift = format!("{}{}", decor.left, decor.shift);
        let right_meta = format!("{}{}", decor.meta, decor.right);
        assert_eq!(table.modifier_for_glyph(&left_shift), Some(ModifierKey::Shift));
        assert_eq!(table.modifier_for_glyph(&right_meta), Some(ModifierKey::Meta));
        assert_eq!(table.modifier_for_glyph("Q"), None);
    }

    #[test]
    fn test_override_replaces_glyph() {
        let table = SymbolTable::with_overrides(
            &ModGlyphs::default(),
            &[((EventClass::Key, Key::KEY_Q.code()), "@q".to_string())],
        );
        assert_eq!(table.lookup(EventClass::Key, Key::KEY_Q.code()), Some("@q"));
    }

    #[test]
    fn test_override_moves_modifier_identity() {
        let table = SymbolTable::with_overrides(
            &ModGlyphs::default(),
            &[((EventClass::Key, Key::KEY_LEFTSHIFT.code()), "SH".to_string())],
        );
        assert_eq!(table.modifier_for_glyph("SH"), Some(ModifierKey::Shift));
    }

    #[test]
    fn test_from_config_rejects_unknown_names() {
        let mut input = InputConfig::default();
        input.symbols.push(("KEY_NOT_REAL".to_string(), "x".to_string()));
        let err = SymbolTable::from_config(&DisplayConfig::default(), &input).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownEvent(_)));
    }

    #[test]
    fn test_shift_substitutions() {
        let table = SymbolTable::default();
        assert_eq!(table.shifted('a'), Some('A'));
        assert_eq!(table.shifted('1'), Some('!'));
        assert_eq!(table.shifted('/'), Some('?'));
        assert_eq!(table.shifted('↲'), None);
    }
}
