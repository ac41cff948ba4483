//! Event classes and name resolution
//!
//! The kernel reports every input event as a (type, code, value) triple.
//! The recognized types form a closed enum here; a type outside this set
//! is plain data that no listen-set entry can name, so events carrying
//! one are dropped by the class filter rather than dispatched on.

use std::fmt;
use std::str::FromStr;

use evdev::Key;
use thiserror::Error;

/// Event value constants for key events.
pub mod event_value {
    /// Key release event value
    pub const RELEASE: i32 = 0;
    /// Key press event value
    pub const PRESS: i32 = 1;
    /// Key repeat event value (autorepeat)
    pub const REPEAT: i32 = 2;
}

/// The input event classes defined by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    Synchronization,
    Key,
    Relative,
    Absolute,
    Misc,
    Switch,
    Led,
    Sound,
    Repeat,
    ForceFeedback,
}

impl EventClass {
    /// All recognized classes, in kernel numbering order.
    pub const ALL: [EventClass; 10] = [
        EventClass::Synchronization,
        EventClass::Key,
        EventClass::Relative,
        EventClass::Absolute,
        EventClass::Misc,
        EventClass::Switch,
        EventClass::Led,
        EventClass::Sound,
        EventClass::Repeat,
        EventClass::ForceFeedback,
    ];

    /// Map a raw `EV_*` type number to its class, if recognized.
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0x00 => Some(Self::Synchronization),
            0x01 => Some(Self::Key),
            0x02 => Some(Self::Relative),
            0x03 => Some(Self::Absolute),
            0x04 => Some(Self::Misc),
            0x05 => Some(Self::Switch),
            0x11 => Some(Self::Led),
            0x12 => Some(Self::Sound),
            0x14 => Some(Self::Repeat),
            0x15 => Some(Self::ForceFeedback),
            _ => None,
        }
    }

    /// The raw `EV_*` type number.
    pub fn raw(self) -> u16 {
        match self {
            Self::Synchronization => 0x00,
            Self::Key => 0x01,
            Self::Relative => 0x02,
            Self::Absolute => 0x03,
            Self::Misc => 0x04,
            Self::Switch => 0x05,
            Self::Led => 0x11,
            Self::Sound => 0x12,
            Self::Repeat => 0x14,
            Self::ForceFeedback => 0x15,
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Self::Synchronization => "SYN",
            Self::Key => "KEY",
            Self::Relative => "REL",
            Self::Absolute => "ABS",
            Self::Misc => "MSC",
            Self::Switch => "SW",
            Self::Led => "LED",
            Self::Sound => "SND",
            Self::Repeat => "REP",
            Self::ForceFeedback => "FF",
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EV_{}", self.short_name())
    }
}

/// A single raw event as reported by a device driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub class: EventClass,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(class: EventClass, code: u16, value: i32) -> Self {
        Self { class, code, value }
    }
}

/// Failure to resolve a user-supplied event or class name.
///
/// These only surface while resolving configuration, before any device
/// listener starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("event `{0}` doesn't exist")]
    UnknownEvent(String),
    #[error("class `{0}` doesn't exist")]
    UnknownClass(String),
}

/// Normalize a user-supplied name the way the kernel headers spell them.
fn canonical(name: &str) -> String {
    name.trim().to_uppercase().replace(['-', ' '], "_")
}

/// Resolve an event name into a (class, code) pair.
///
/// Accepts `KEY_*`/`BTN_*` names (case-insensitive, `-` and space treated
/// as `_`), bare code numbers (taken as key codes), and the explicit
/// `EV_<CLASS>:<code>` form for non-key classes.
pub fn resolve_event(name: &str) -> Result<(EventClass, u16), ResolveError> {
    let canon = canonical(name);

    if let Ok(code) = canon.parse::<u16>() {
        return Ok((EventClass::Key, code));
    }

    if let Ok(key) = Key::from_str(&canon) {
        return Ok((EventClass::Key, key.code()));
    }

    if let Some((class_name, code)) = canon.split_once(':') {
        let class = resolve_class(class_name)?;
        let code = code
            .parse::<u16>()
            .map_err(|_| ResolveError::UnknownEvent(name.to_string()))?;
        return Ok((class, code));
    }

    Err(ResolveError::UnknownEvent(name.to_string()))
}

/// Resolve a class name (`EV_KEY`, `key`, or a raw type number).
pub fn resolve_class(name: &str) -> Result<EventClass, ResolveError> {
    let canon = canonical(name);

    if let Ok(raw) = canon.parse::<u16>() {
        return EventClass::from_raw(raw).ok_or_else(|| ResolveError::UnknownClass(name.to_string()));
    }

    let canon = if canon.starts_with("EV_") {
        canon
    } else {
        format!("EV_{}", canon)
    };

    EventClass::ALL
        .into_iter()
        .find(|class| class.to_string() == canon)
        .ok_or_else(|| ResolveError::UnknownClass(name.to_string()))
}

/// The technical name of a code, for diagnostics and the unknown-code
/// fallback rendering.
pub fn technical_name(class: EventClass, code: u16) -> String {
    match class {
        EventClass::Key => format!("{:?}", Key::new(code)),
        _ => format!("{}:{}", class, code),
    }
}
