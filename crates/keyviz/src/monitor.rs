//! Idle timeout monitor

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use keyviz_engine::history::History;

use crate::render::Redraw;

/// Poll interval for the inactivity check.
const TICK: Duration = Duration::from_millis(500);

/// Clear the history once the inactivity window expires.
///
/// This is the only task allowed to fully reset shared state. A timeout
/// of zero disables the monitor entirely.
pub async fn run(
    history: Arc<Mutex<History>>,
    redraw: UnboundedSender<Redraw>,
    timeout: Duration,
) {
    if timeout.is_zero() {
        tracing::debug!("Idle timeout disabled");
        return;
    }

    let mut tick = tokio::time::interval(TICK);
    loop {
        tick.tick().await;

        let expired = {
            let mut h = match history.lock() {
                Ok(h) => h,
                Err(poisoned) => poisoned.into_inner(),
            };
            let idle = h
                .last_event()
                .map(|at| at.elapsed() >= timeout)
                .unwrap_or(false);

            if idle && !h.is_empty() {
                h.clear();
                true
            } else {
                false
            }
        };

        if expired {
            tracing::debug!("Idle timeout expired, clearing display");
            if redraw.send(Redraw::Idle).is_err() {
                return;
            }
        }
    }
}
