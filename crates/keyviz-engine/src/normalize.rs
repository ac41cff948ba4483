//! Raw event normalization
//!
//! One `Normalizer` lives inside each device's listener task. It owns the
//! per-class skip flags for that device, so nothing here is shared; only
//! the keystrokes it emits cross into the shared history.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use evdev::Key;
use keyviz_config::InputConfig;

use crate::events::{
    event_value, resolve_class, resolve_event, technical_name, EventClass, RawEvent, ResolveError,
};
use crate::keystroke::Keystroke;
use crate::modifiers::{Modifiers, SkipSet};
use crate::symbols::{SymbolTable, HIDDEN_GLYPH};

/// The class/event filter applied before anything else.
#[derive(Debug, Clone)]
pub struct EventFilter {
    listen: HashSet<EventClass>,
    ignore: HashSet<(EventClass, u16)>,
}

impl EventFilter {
    /// The built-in filter: key events only, with the touchpad contact
    /// pseudo-buttons ignored.
    pub fn new() -> Self {
        let listen = HashSet::from([EventClass::Key]);
        let ignore = HashSet::from([
            (EventClass::Key, Key::BTN_TOOL_FINGER.code()),
            (EventClass::Key, Key::BTN_TOUCH.code()),
            (EventClass::Key, Key::BTN_TOOL_DOUBLETAP.code()),
            (EventClass::Key, Key::BTN_TOOL_TRIPLETAP.code()),
        ]);
        Self { listen, ignore }
    }

    /// Apply the configured filter directives on top of the defaults.
    pub fn from_config(input: &InputConfig) -> Result<Self, ResolveError> {
        let mut filter = Self::new();

        for name in &input.classes_on {
            filter.listen.insert(resolve_class(name)?);
        }
        for name in &input.classes_off {
            let class = resolve_class(name)?;
            filter.listen.remove(&class);
        }
        for name in &input.ignore {
            filter.ignore.insert(resolve_event(name)?);
        }
        for name in &input.listen {
            let event = resolve_event(name)?;
            filter.ignore.remove(&event);
        }

        Ok(filter)
    }

    pub fn accepts(&self, class: EventClass, code: u16) -> bool {
        self.listen.contains(&class) && !self.ignore.contains(&(class, code))
    }

    /// The classes a device must support to be worth listening to.
    pub fn classes(&self) -> impl Iterator<Item = EventClass> + '_ {
        self.listen.iter().copied()
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-device normalization state machine.
pub struct Normalizer {
    table: Arc<SymbolTable>,
    filter: Arc<EventFilter>,
    keep_hidden: bool,
    skip: HashMap<EventClass, SkipSet>,
}

impl Normalizer {
    pub fn new(table: Arc<SymbolTable>, filter: Arc<EventFilter>, keep_hidden: bool) -> Self {
        Self {
            table,
            filter,
            keep_hidden,
            skip: HashMap::new(),
        }
    }

    /// Cheap pre-check, run before the key-state query.
    pub fn accepts(&self, event: &RawEvent) -> bool {
        self.filter.accepts(event.class, event.code)
    }

    /// Turn an accepted raw event into a keystroke, or suppress it.
    ///
    /// `held` must be a fresh snapshot of the device's key state at the
    /// time of the event.
    ///
    /// Modifier halves are edge-triggered control signals, never
    /// displayable keys: their presses are dropped outright, and their
    /// releases consume at most one pending skip flag before being
    /// dropped as well. Everything else becomes a keystroke on press and
    /// autorepeat, while releases are dropped because the merge logic
    /// already accounts for the press.
    pub fn normalize(&mut self, event: &RawEvent, held: Modifiers) -> Option<Keystroke> {
        let glyph = self
            .table
            .lookup(event.class, event.code)
            .map(str::to_owned);
        let skip = self.skip.entry(event.class).or_default();

        if let Some(modifier) = glyph
            .as_deref()
            .and_then(|g| self.table.modifier_for_glyph(g))
        {
            if event.value == event_value::RELEASE {
                skip.clear(modifier);
            }
            return None;
        }

        if event.value == event_value::RELEASE {
            return None;
        }

        let hidden = matches!(glyph.as_deref(), Some("") | Some(HIDDEN_GLYPH));
        if hidden && !self.keep_hidden {
            return None;
        }

        skip.absorb(held);

        Some(Keystroke {
            class: event.class,
            code: event.code,
            name: technical_name(event.class, event.code),
            glyph,
            held,
            count: 1,
            hidden,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(keep_hidden: bool) -> Normalizer {
        Normalizer::new(
            Arc::new(SymbolTable::default()),
            Arc::new(EventFilter::new()),
            keep_hidden,
        )
    }

    fn key_event(key: Key, value: i32) -> RawEvent {
        RawEvent::new(EventClass::Key, key.code(), value)
    }

    const NO_MODS: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    #[test]
    fn test_press_produces_keystroke_release_does_not() {
        let mut norm = normalizer(true);

        let key = norm
            .normalize(&key_event(Key::KEY_A, event_value::PRESS), NO_MODS)
            .expect("press should produce a keystroke");
        assert_eq!(key.code, Key::KEY_A.code());
        assert_eq!(key.glyph.as_deref(), Some("A"));
        assert_eq!(key.count, 1);
        assert!(!key.hidden);

        assert!(norm
            .normalize(&key_event(Key::KEY_A, event_value::RELEASE), NO_MODS)
            .is_none());
    }

    #[test]
    fn test_autorepeat_produces_keystroke() {
        let mut norm = normalizer(true);
        assert!(norm
            .normalize(&key_event(Key::KEY_A, event_value::REPEAT), NO_MODS)
            .is_some());
    }

    #[test]
    fn test_shift_chord_yields_single_entry() {
        let mut norm = normalizer(true);

        // Shift goes down: control signal, suppressed
        assert!(norm
            .normalize(&key_event(Key::KEY_LEFTSHIFT, event_value::PRESS), SHIFT)
            .is_none());

        // A goes down with shift held
        let key = norm
            .normalize(&key_event(Key::KEY_A, event_value::PRESS), SHIFT)
            .expect("chorded key should produce a keystroke");
        assert!(key.held.shift);

        // A up, then shift up: both suppressed
        assert!(norm
            .normalize(&key_event(Key::KEY_A, event_value::RELEASE), SHIFT)
            .is_none());
        assert!(norm
            .normalize(&key_event(Key::KEY_LEFTSHIFT, event_value::RELEASE), NO_MODS)
            .is_none());
    }

    #[test]
    fn test_bare_modifier_tap_is_invisible() {
        let mut norm = normalizer(true);
        assert!(norm
            .normalize(&key_event(Key::KEY_LEFTSHIFT, event_value::PRESS), SHIFT)
            .is_none());
        assert!(norm
            .normalize(&key_event(Key::KEY_LEFTSHIFT, event_value::RELEASE), NO_MODS)
            .is_none());
    }

    #[test]
    fn test_unknown_code_still_surfaces() {
        let mut norm = normalizer(true);
        let key = norm
            .normalize(&key_event(Key::KEY_CAPSLOCK, event_value::PRESS), NO_MODS)
            .expect("unmapped codes still become keystrokes");
        assert!(key.glyph.is_none());
        assert_eq!(key.name, "KEY_CAPSLOCK");
    }

    #[test]
    fn test_hidden_glyph_policies() {
        let reserved = key_event(Key::KEY_RESERVED, event_value::PRESS);

        let mut keeping = normalizer(true);
        let key = keeping
            .normalize(&reserved, NO_MODS)
            .expect("hidden key should occupy a slot when kept");
        assert!(key.hidden);

        let mut dropping = normalizer(false);
        assert!(dropping.normalize(&reserved, NO_MODS).is_none());
    }

    #[test]
    fn test_filter_defaults() {
        let filter = EventFilter::new();
        assert!(filter.accepts(EventClass::Key, Key::KEY_A.code()));
        assert!(!filter.accepts(EventClass::Key, Key::BTN_TOUCH.code()));
        assert!(!filter.accepts(EventClass::Relative, 0));
    }

    #[test]
    fn test_filter_from_config() {
        let mut input = InputConfig::default();
        input.classes_on.push("EV_SW".to_string());
        input.classes_off.push("EV_KEY".to_string());
        input.listen.push("BTN_TOUCH".to_string());
        input.ignore.push("EV_SW:3".to_string());

        let filter = EventFilter::from_config(&input).unwrap();
        assert!(filter.accepts(EventClass::Switch, 0));
        assert!(!filter.accepts(EventClass::Switch, 3));
        assert!(!filter.accepts(EventClass::Key, Key::KEY_A.code()));

        input.classes_on.push("EV_WAT".to_string());
        assert!(EventFilter::from_config(&input).is_err());
    }

    #[test]
    fn test_skip_flag_consumed_once_per_chord() {
        let mut norm = normalizer(true);

        // Chord: ctrl held while C is pressed twice, then ctrl released
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        assert!(norm
            .normalize(&key_event(Key::KEY_C, event_value::PRESS), ctrl)
            .is_some());
        assert!(norm
            .normalize(&key_event(Key::KEY_C, event_value::PRESS), ctrl)
            .is_some());
        assert!(norm
            .normalize(&key_event(Key::KEY_LEFTCTRL, event_value::RELEASE), NO_MODS)
            .is_none());

        // A fresh ctrl release arrives with no chord pending: still
        // suppressed, nothing to consume
        assert!(norm
            .normalize(&key_event(Key::KEY_LEFTCTRL, event_value::RELEASE), NO_MODS)
            .is_none());
    }
}
