//! Terminal rendering
//!
//! A single task owns stdout; everyone else only sends redraw requests
//! over a channel. Each request re-reads the terminal width, snapshots
//! the history under its lock, formats, and repaints the line
//! right-aligned.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crossterm::cursor::MoveTo;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use keyviz_engine::format::{Formatter, Token};
use keyviz_engine::history::History;

/// Why a redraw was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    Startup,
    Key,
    Idle,
    Resize,
}

/// Drain redraw requests until every sender is gone.
pub async fn run(
    mut requests: UnboundedReceiver<Redraw>,
    history: Arc<Mutex<History>>,
    formatter: Formatter,
) {
    while let Some(reason) = requests.recv().await {
        if let Err(e) = draw(&history, &formatter) {
            tracing::warn!("Redraw failed ({:?}): {}", reason, e);
        }
    }
}

fn draw(history: &Mutex<History>, formatter: &Formatter) -> io::Result<()> {
    let width = crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(80);

    let entries = {
        let mut h = match history.lock() {
            Ok(h) => h,
            Err(poisoned) => poisoned.into_inner(),
        };
        h.set_display_width(width);
        h.entries().to_vec()
    };

    let tokens = formatter.format(&entries, width);
    let line = compose_line(&tokens, width);

    let mut out = io::stdout().lock();
    crossterm::queue!(out, MoveTo(0, 0), Clear(ClearType::All), Print(line))?;
    out.flush()
}

/// Right-align the styled tokens inside the width budget.
fn compose_line(tokens: &[Token], width: usize) -> String {
    let mut line = String::new();
    let mut used = 0usize;

    for token in tokens {
        line.push_str(&token.styled);
        line.push(' ');
        used += token.width + 1;
    }

    format!("{}{}", " ".repeat(width.saturating_sub(used)), line)
}

/// Turn terminal size changes into redraw requests.
pub async fn watch_resize(redraw: UnboundedSender<Redraw>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut winch = match signal(SignalKind::window_change()) {
        Ok(winch) => winch,
        Err(e) => {
            tracing::warn!("Cannot watch for terminal resizes: {}", e);
            return;
        }
    };

    while winch.recv().await.is_some() {
        if redraw.send(Redraw::Resize).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(styled: &str, width: usize) -> Token {
        Token {
            styled: styled.to_string(),
            width,
            unknown: false,
        }
    }

    #[test]
    fn test_compose_line_right_aligns() {
        let tokens = [token("a", 1), token("b", 1)];
        let line = compose_line(&tokens, 10);
        assert_eq!(line, "      a b ");
    }

    #[test]
    fn test_compose_line_pads_styled_by_visible_width() {
        // Styling bytes must not count against the padding
        let tokens = [token("\x1b[1ma\x1b[0m", 1)];
        let line = compose_line(&tokens, 5);
        assert!(line.starts_with("   \x1b[1m"));
        assert!(line.ends_with(' '));
    }

    #[test]
    fn test_compose_line_empty() {
        assert_eq!(compose_line(&[], 4), "    ");
    }
}
