//! Keystroke formatting and width fitting
//!
//! Turns history entries into styled display tokens and greedily fits as
//! many as possible, newest first, into the caller's width budget. The
//! styled text carries ANSI sequences; width accounting only ever counts
//! user-visible characters.

use std::sync::Arc;

use crossterm::style::{Color, Stylize};
use keyviz_config::{ColorRole, Rgb};

use crate::keystroke::Keystroke;
use crate::modifiers::Modifiers;
use crate::symbols::SymbolTable;

/// Colors for the distinct token parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub glyph: Color,
    pub marker: Color,
    pub modifier: Color,
    pub repeat: Color,
    pub unknown: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            glyph: Color::Blue,
            marker: Color::Yellow,
            modifier: Color::Red,
            repeat: Color::Magenta,
            unknown: Color::Green,
        }
    }
}

impl Palette {
    /// The default palette with configured `#rrggbb` overrides applied.
    pub fn with_overrides(colors: &[(ColorRole, Rgb)]) -> Self {
        let mut palette = Self::default();
        for (role, rgb) in colors {
            let color = Color::Rgb {
                r: rgb.r,
                g: rgb.g,
                b: rgb.b,
            };
            match role {
                ColorRole::Glyph => palette.glyph = color,
                ColorRole::Marker => palette.marker = color,
                ColorRole::Modifier => palette.modifier = color,
                ColorRole::Repeat => palette.repeat = color,
                ColorRole::Unknown => palette.unknown = color,
            }
        }
        palette
    }
}

/// A formatted history entry, ready for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Display text including ANSI styling
    pub styled: String,
    /// Visible width in character cells
    pub width: usize,
    /// Whether this is the unknown-code fallback form
    pub unknown: bool,
}

/// Formats keystrokes into display tokens.
///
/// Pure: formatting the same entries with the same width always yields
/// the same tokens, so redraws are idempotent.
pub struct Formatter {
    table: Arc<SymbolTable>,
    palette: Palette,
}

impl Formatter {
    pub fn new(table: Arc<SymbolTable>, palette: Palette) -> Self {
        Self { table, palette }
    }

    /// Fit as many of the newest entries as the width budget allows.
    ///
    /// Walks newest to oldest, skipping hidden entries, counting each
    /// token plus its separating space, and stops before the budget is
    /// met. Tokens come back in chronological order.
    pub fn format(&self, entries: &[Keystroke], width: usize) -> Vec<Token> {
        let mut kept = Vec::new();
        let mut used = 0usize;

        for key in entries.iter().rev() {
            if key.hidden {
                continue;
            }
            let token = self.token(key);
            if used + token.width + 1 >= width {
                break;
            }
            used += token.width + 1;
            kept.push(token);
        }

        kept.reverse();
        kept
    }

    /// Format a single keystroke.
    pub fn token(&self, key: &Keystroke) -> Token {
        let (mut plain, mut styled, shift_consumed) = match key.glyph.as_deref() {
            None => {
                let text = format!("<{}: {}>", key.code, key.name);
                let styled = text.clone().with(self.palette.unknown).bold().to_string();
                (text, styled, false)
            }
            Some(glyph) => self.styled_glyph(glyph, key.held),
        };

        // Decorations end up reading meta, ctrl, alt, shift, glyph
        let decor = self.table.decorations();
        let prefixes = [
            (key.held.shift && !shift_consumed, decor.shift.as_str()),
            (key.held.alt, decor.alt.as_str()),
            (key.held.ctrl, decor.ctrl.as_str()),
            (key.held.meta, decor.meta.as_str()),
        ];
        for (held, glyph) in prefixes {
            if held {
                plain.insert_str(0, glyph);
                styled = format!("{}{}", glyph.with(self.palette.modifier).bold(), styled);
            }
        }

        if key.count > 1 {
            let suffix = format!("×{}", key.count);
            styled.push_str(&suffix.clone().with(self.palette.repeat).italic().to_string());
            plain.push_str(&suffix);
        }

        Token {
            styled,
            width: plain.chars().count(),
            unknown: key.glyph.is_none(),
        }
    }

    /// Style one glyph; returns (plain, styled, shift_consumed).
    fn styled_glyph(&self, glyph: &str, held: Modifiers) -> (String, String, bool) {
        let decor = self.table.decorations();
        let left = decor.left.as_str();
        let right = decor.right.as_str();
        let first = glyph.chars().next().unwrap_or(' ');

        // Textual label: bold, no case folding
        if glyph.chars().count() > 1 && (first as u32) < 256 {
            return (
                glyph.to_string(),
                glyph.to_string().bold().to_string(),
                false,
            );
        }

        // Left-half modifier marker gets split coloring
        if !left.is_empty() && glyph.len() > left.len() {
            if let Some(rest) = glyph.strip_prefix(left) {
                let styled = format!(
                    "{}{}",
                    left.with(self.palette.marker).bold(),
                    rest.with(self.palette.glyph).bold()
                );
                return (glyph.to_string(), styled, false);
            }
        }

        if (first as u32) > 255 {
            // Right-half marker splits the other way
            if !right.is_empty() && glyph.len() > right.len() {
                if let Some(head) = glyph.strip_suffix(right) {
                    let styled = format!(
                        "{}{}",
                        head.with(self.palette.glyph).bold(),
                        right.with(self.palette.marker).bold()
                    );
                    return (glyph.to_string(), styled, false);
                }
            }
            return (
                glyph.to_string(),
                glyph.to_string().with(self.palette.glyph).bold().to_string(),
                false,
            );
        }

        // Single plain character: lowercase, shift substitutes where the
        // layout defines it
        let lower = first.to_ascii_lowercase();
        if held.shift {
            if let Some(upper) = self.table.shifted(lower) {
                return (upper.to_string(), upper.to_string(), true);
            }
        }
        (lower.to_string(), lower.to_string(), false)
    }
}
