//! Configuration data model

use std::str::FromStr;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub display: DisplayConfig,
    pub input: InputConfig,
}

/// Display and timing settings
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Inactivity window after which the key line is cleared
    pub timeout: Duration,
    /// Whether a hidden-glyph key still occupies a history slot
    pub keep_hidden: bool,
    /// Per-role color overrides (role name -> color)
    pub colors: Vec<(ColorRole, Rgb)>,
    /// Modifier decoration glyph set
    pub glyphs: ModGlyphs,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            keep_hidden: true,
            colors: Vec::new(),
            glyphs: ModGlyphs::default(),
        }
    }
}

/// The color roles the renderer distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    /// Symbolic (non-ASCII) glyphs
    Glyph,
    /// Left/right half markers on modifier glyphs
    Marker,
    /// Modifier decoration prefixes
    Modifier,
    /// The `×N` repeat suffix
    Repeat,
    /// The `<code: name>` fallback for unmapped codes
    Unknown,
}

impl FromStr for ColorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "glyph" => Ok(Self::Glyph),
            "marker" => Ok(Self::Marker),
            "modifier" | "mod" => Ok(Self::Modifier),
            "repeat" | "count" => Ok(Self::Repeat),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown color role: {}", s)),
        }
    }
}

/// An `#rrggbb` color value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| format!("Invalid color code: {} (expected #rrggbb)", s))?;

        // Validated above, the radix parses cannot fail
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        Ok(Self {
            r: channel(0),
            g: channel(2),
            b: channel(4),
        })
    }
}

/// Glyphs used to decorate keystrokes with held-modifier state, plus the
/// left/right markers that distinguish the two physical halves of a
/// modifier pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModGlyphs {
    pub shift: String,
    pub ctrl: String,
    pub alt: String,
    pub meta: String,
    pub left: String,
    pub right: String,
}

impl Default for ModGlyphs {
    fn default() -> Self {
        Self {
            shift: "⮭".to_string(),
            ctrl: "▲".to_string(),
            alt: "\u{eaab}".to_string(),
            meta: "\u{e00a}".to_string(),
            left: "\u{eb6f}".to_string(),
            right: "\u{eb70}".to_string(),
        }
    }
}

/// Raw input-side configuration.
///
/// Everything in here is additive over the built-in defaults and stays as
/// the strings the user wrote; the engine resolves them into
/// (class, code) pairs at startup and rejects anything unknown.
#[derive(Debug, Clone, Default)]
pub struct InputConfig {
    /// Event classes to listen to (beyond the default EV_KEY)
    pub classes_on: Vec<String>,
    /// Event classes to stop listening to
    pub classes_off: Vec<String>,
    /// Events to add to the ignore set
    pub ignore: Vec<String>,
    /// Events to remove from the ignore set
    pub listen: Vec<String>,
    /// Glyph overrides (event name -> glyph)
    pub symbols: Vec<(String, String)>,
}
