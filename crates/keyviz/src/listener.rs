//! Per-device listen loop

use std::sync::{Arc, Mutex};

use evdev::Device;
use tokio::sync::mpsc::UnboundedSender;

use keyviz_engine::events::{EventClass, RawEvent};
use keyviz_engine::history::History;
use keyviz_engine::modifiers::modifier_state;
use keyviz_engine::normalize::Normalizer;

use crate::device::DeviceInfo;
use crate::render::Redraw;

/// Listen on one device until its stream dies.
///
/// A read or key-state query failure is fatal for this device only: the
/// error is reported and the loop ends, leaving every other listener
/// running. The normalizer (and with it the skip state) is owned here
/// and never shared; only finished keystrokes cross into the shared
/// history, from a short-lived task so a slow redraw can never hold up
/// the next device read.
pub async fn run(
    device: Device,
    info: DeviceInfo,
    mut normalizer: Normalizer,
    history: Arc<Mutex<History>>,
    redraw: UnboundedSender<Redraw>,
) {
    let mut stream = match device.into_event_stream() {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(
                "stream: {} [{}]: {}",
                info.name,
                info.path.display(),
                e
            );
            return;
        }
    };

    tracing::info!("Listening to '{}' at {}", info.name, info.path.display());

    loop {
        let event = match stream.next_event().await {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("read: {} [{}]: {}", info.name, info.path.display(), e);
                return;
            }
        };

        let Some(class) = EventClass::from_raw(event.event_type().0) else {
            continue;
        };
        let raw = RawEvent::new(class, event.code(), event.value());
        tracing::trace!(
            device = %info.name,
            class = %raw.class,
            code = raw.code,
            value = raw.value,
            "raw event"
        );

        if !normalizer.accepts(&raw) {
            continue;
        }

        // Held modifiers come from the driver's live key state, not from
        // integrating edges ourselves
        let held = match stream.device().get_key_state() {
            Ok(state) => modifier_state(&state),
            Err(e) => {
                tracing::error!("state: {} [{}]: {}", info.name, info.path.display(), e);
                return;
            }
        };

        if let Some(key) = normalizer.normalize(&raw, held) {
            let history = Arc::clone(&history);
            let redraw = redraw.clone();
            tokio::spawn(async move {
                match history.lock() {
                    Ok(mut h) => h.record(key),
                    Err(poisoned) => poisoned.into_inner().record(key),
                }
                let _ = redraw.send(Redraw::Key);
            });
        }
    }
}
