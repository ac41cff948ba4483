//! Device enumeration and selection

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use evdev::Device;
use serde::Serialize;

use keyviz_engine::normalize::EventFilter;

/// Information about an input device
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
    pub vendor: u16,
    pub product: u16,
}

impl DeviceInfo {
    fn from_device(path: &Path, device: &Device) -> Self {
        let id = device.input_id();
        Self {
            path: path.to_path_buf(),
            name: device.name().unwrap_or("Unknown").to_string(),
            vendor: id.vendor(),
            product: id.product(),
        }
    }

    /// Get vendor:product string (e.g., "3434:0361")
    pub fn vendor_product(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor, self.product)
    }
}

fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("event"))
        .unwrap_or(false)
}

/// Open every device under `/dev/input` whose capabilities intersect the
/// listened event classes.
///
/// Nodes that cannot be opened (usually a permissions problem) are
/// skipped with a debug diagnostic; a device only has to be readable at
/// startup, there is no re-probe later.
pub fn open_matching(filter: &EventFilter) -> Result<Vec<(Device, DeviceInfo)>> {
    let mut matched = Vec::new();

    for entry in std::fs::read_dir("/dev/input").context("Failed to read /dev/input")? {
        let entry = entry?;
        let path = entry.path();

        if !is_event_node(&path) {
            continue;
        }

        match Device::open(&path) {
            Ok(device) => {
                let supported = device.supported_events();
                let wanted = filter
                    .classes()
                    .any(|class| supported.contains(evdev::EventType(class.raw())));

                if wanted {
                    let info = DeviceInfo::from_device(&path, &device);
                    tracing::debug!(
                        "Using device '{}' [{}] at {}",
                        info.name,
                        info.vendor_product(),
                        path.display()
                    );
                    matched.push((device, info));
                }
            }
            Err(e) => {
                tracing::debug!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    Ok(matched)
}

/// One row of the `devices` listing.
#[derive(Debug, Serialize)]
struct DeviceListing {
    #[serde(flatten)]
    info: DeviceInfo,
    keyboard: bool,
}

/// Check if a device is a keyboard
fn is_keyboard(device: &Device) -> bool {
    device.supported_events().contains(evdev::EventType::KEY)
        && device
            .supported_keys()
            .map(|keys| keys.contains(evdev::Key::KEY_A))
            .unwrap_or(false)
}

/// `keyviz devices` — list every enumerable input device.
pub fn list_devices(json: bool) -> Result<()> {
    let mut listings = Vec::new();

    for entry in std::fs::read_dir("/dev/input").context("Failed to read /dev/input")? {
        let entry = entry?;
        let path = entry.path();

        if !is_event_node(&path) {
            continue;
        }

        match Device::open(&path) {
            Ok(device) => {
                listings.push(DeviceListing {
                    keyboard: is_keyboard(&device),
                    info: DeviceInfo::from_device(&path, &device),
                });
            }
            Err(e) => {
                tracing::debug!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    listings.sort_by(|a, b| a.info.path.cmp(&b.info.path));

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    if listings.is_empty() {
        println!("No readable input devices (listing usually requires root).");
        return Ok(());
    }

    println!("Available input devices:\n");
    for listing in &listings {
        let device_type = if listing.keyboard { "keyboard" } else { "other" };
        println!("  {} [{}]", listing.info.name, device_type);
        println!("    Path: {}", listing.info.path.display());
        println!("    ID: {}", listing.info.vendor_product());
        println!();
    }

    Ok(())
}
