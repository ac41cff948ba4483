//! Event normalization and history aggregation for keyviz
//!
//! This crate turns raw per-device input events into canonical keystrokes
//! and keeps the shared, width-bounded history the renderer draws from:
//!
//! - [`events`] — the closed set of recognized event classes and the
//!   resolution of user-supplied event/class names into (class, code)
//!   pairs.
//! - [`symbols`] — the glyph table, including the eight modifier-half
//!   glyphs and the shift substitution map.
//! - [`modifiers`] — held-modifier snapshots read from a device's live
//!   key state, and the per-chord release-suppression flags.
//! - [`normalize`] — the per-device state machine that accepts, filters
//!   and converts raw events into [`keystroke::Keystroke`]s.
//! - [`history`] — the ordered merge-on-repeat history with its soft
//!   length bound.
//! - [`format`] — the greedy right-to-left width fitting that produces
//!   styled display tokens.
//!
//! Everything here is synchronous and device-agnostic; the binary owns
//! the devices, the tasks and the lock around [`history::History`].

pub mod events;
pub mod format;
pub mod history;
pub mod keystroke;
pub mod modifiers;
pub mod normalize;
pub mod symbols;

pub use events::{EventClass, RawEvent, ResolveError};
pub use format::{Formatter, Palette, Token};
pub use history::History;
pub use keystroke::Keystroke;
pub use modifiers::{modifier_state, KeySnapshot, ModifierKey, Modifiers};
pub use normalize::{EventFilter, Normalizer};
pub use symbols::SymbolTable;
