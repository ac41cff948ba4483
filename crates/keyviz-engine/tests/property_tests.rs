//! Property-based tests for the normalization, history and formatting
//! pipeline using proptest.

use std::sync::Arc;

use proptest::prelude::*;

use keyviz_engine::events::{event_value, EventClass, RawEvent};
use keyviz_engine::format::{Formatter, Palette};
use keyviz_engine::history::{History, TRIM_FACTOR};
use keyviz_engine::keystroke::Keystroke;
use keyviz_engine::modifiers::Modifiers;
use keyviz_engine::normalize::{EventFilter, Normalizer};
use keyviz_engine::symbols::SymbolTable;

/// Key codes for the letter rows, all of which carry default glyphs and
/// are not modifiers.
const LETTER_CODES: &[u16] = &[
    16, 17, 18, 19, 20, 21, 22, 23, 24, 25, // Q..P
    30, 31, 32, 33, 34, 35, 36, 37, 38, // A..L
    44, 45, 46, 47, 48, 49, 50, // Z..M
];

fn pipeline(keep_hidden: bool) -> (Normalizer, History, Formatter) {
    let table = Arc::new(SymbolTable::default());
    let filter = Arc::new(EventFilter::new());
    (
        Normalizer::new(Arc::clone(&table), filter, keep_hidden),
        History::new(),
        Formatter::new(table, Palette::default()),
    )
}

fn arb_modifiers() -> impl Strategy<Value = Modifiers> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(shift, ctrl, alt, meta)| Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        },
    )
}

fn arb_stroke() -> impl Strategy<Value = Keystroke> {
    (1u16..120, arb_modifiers(), 1u32..6, prop::bool::weighted(0.1)).prop_map(
        |(code, held, count, hidden)| Keystroke {
            class: EventClass::Key,
            code,
            name: format!("KEY_{}", code),
            glyph: if code % 9 == 0 {
                None
            } else {
                Some(((b'a' + (code % 26) as u8) as char).to_string())
            },
            held,
            count,
            hidden,
        },
    )
}

proptest! {
    /// N identical presses with no modifiers involved collapse into a
    /// single history entry whose count is exactly N.
    #[test]
    fn prop_identical_presses_merge(
        code_index in 0..LETTER_CODES.len(),
        presses in 1u32..50
    ) {
        let code = LETTER_CODES[code_index];
        let (mut norm, mut history, _) = pipeline(true);

        for _ in 0..presses {
            let down = RawEvent::new(EventClass::Key, code, event_value::PRESS);
            let up = RawEvent::new(EventClass::Key, code, event_value::RELEASE);

            if let Some(key) = norm.normalize(&down, Modifiers::default()) {
                history.record(key);
            }
            prop_assert!(norm.normalize(&up, Modifiers::default()).is_none());
        }

        prop_assert_eq!(history.len(), 1);
        prop_assert_eq!(history.entries()[0].count, presses);
    }

    /// A chord produces exactly one visible entry no matter how often
    /// the chorded key repeats; the modifier edges never surface.
    #[test]
    fn prop_chord_yields_single_entry(
        code_index in 0..LETTER_CODES.len(),
        presses in 1u32..20
    ) {
        let code = LETTER_CODES[code_index];
        let (mut norm, mut history, _) = pipeline(true);
        let shift = Modifiers { shift: true, ..Modifiers::default() };

        let shift_down = RawEvent::new(EventClass::Key, 42, event_value::PRESS);
        prop_assert!(norm.normalize(&shift_down, shift).is_none());

        for _ in 0..presses {
            let down = RawEvent::new(EventClass::Key, code, event_value::PRESS);
            if let Some(key) = norm.normalize(&down, shift) {
                prop_assert!(key.held.shift);
                history.record(key);
            }
            let up = RawEvent::new(EventClass::Key, code, event_value::RELEASE);
            prop_assert!(norm.normalize(&up, shift).is_none());
        }

        let shift_up = RawEvent::new(EventClass::Key, 42, event_value::RELEASE);
        prop_assert!(norm.normalize(&shift_up, Modifiers::default()).is_none());

        prop_assert_eq!(history.len(), 1);
        prop_assert_eq!(history.entries()[0].count, presses);
    }

    /// The visible width of the formatted line stays under the budget,
    /// and the fit is greedily maximal from the newest end.
    #[test]
    fn prop_width_fit_and_maximality(
        entries in prop::collection::vec(arb_stroke(), 0..200),
        width in 2usize..200
    ) {
        let formatter = Formatter::new(Arc::new(SymbolTable::default()), Palette::default());
        let tokens = formatter.format(&entries, width);

        let used: usize = tokens.iter().map(|t| t.width + 1).sum();
        prop_assert!(used < width, "used {} cells of a {} budget", used, width);

        let visible: Vec<&Keystroke> = entries.iter().rev().filter(|k| !k.hidden).collect();
        prop_assert!(tokens.len() <= visible.len());
        if tokens.len() < visible.len() {
            let next = formatter.token(visible[tokens.len()]);
            prop_assert!(
                used + next.width + 1 >= width,
                "entry of width {} was excluded with {} of {} cells used",
                next.width, used, width
            );
        }
    }

    /// Formatting is idempotent: the same history and width always
    /// produce the same token sequence.
    #[test]
    fn prop_format_idempotent(
        entries in prop::collection::vec(arb_stroke(), 0..100),
        width in 2usize..200
    ) {
        let formatter = Formatter::new(Arc::new(SymbolTable::default()), Palette::default());
        prop_assert_eq!(formatter.format(&entries, width), formatter.format(&entries, width));
    }

    /// Recording keeps the history inside the soft bound, and trimming
    /// only ever drops from the old end.
    #[test]
    fn prop_trim_bound(
        codes in prop::collection::vec(1u16..240, 1..400),
        width in 1usize..6
    ) {
        let mut history = History::new();
        history.set_display_width(width);

        for (i, code) in codes.iter().enumerate() {
            history.record(Keystroke {
                class: EventClass::Key,
                code: *code,
                name: format!("KEY_{}", code),
                glyph: None,
                held: Modifiers::default(),
                count: 1,
                hidden: false,
            });

            prop_assert!(history.len() <= TRIM_FACTOR * width);
            prop_assert!(history.len() <= i + 1);
        }
    }
}
