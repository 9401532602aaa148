//! Device discovery from `flutter devices`.
//!
//! The toolchain prints one device per line with columns separated by a
//! bullet:
//!
//! ```text
//! Found 3 connected devices:
//!   Sam’s iPhone (mobile) • 00008030-001A2B3C • ios        • iOS 17.5 21F79
//!   iPhone 15 (mobile)    • 5A2B…             • ios        • com.apple.CoreSimulator.SimRuntime.iOS-17-2 (simulator)
//!   macOS (desktop)       • macos             • darwin-arm64 • macOS 14.5
//! ```
//!
//! Only physical iOS devices make it into the [`Inventory`]. Simulators are
//! counted so the caller can tell "only simulators" apart from "nothing".

use serde::Serialize;

use crate::error::Result;
use crate::runner::CommandRunner;

/// Column delimiter used by the toolchain. Device names contain spaces and
/// punctuation, so only this exact character splits columns.
pub const FIELD_SEPARATOR: char = '•';

/// Platform token carried by simulator runtimes.
const SIMULATOR_RUNTIME_TOKEN: &str = "coresimulator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    Wired,
    Wireless,
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wired => write!(f, "usb"),
            Self::Wireless => write!(f, "wireless"),
        }
    }
}

/// A physical device visible to the toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    /// Display name exactly as listed
    pub name: String,
    /// Identifier passed verbatim to `flutter install -d`
    pub id: String,
    /// Platform column as reported (e.g. `ios`)
    pub platform: String,
    pub connection: Connection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    /// Physical devices in listing order
    pub devices: Vec<DeviceRecord>,
    /// Number of simulator lines that were filtered out
    pub simulators_seen: usize,
}

impl Inventory {
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn has_simulators(&self) -> bool {
        self.simulators_seen > 0
    }

    pub fn wired(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices
            .iter()
            .filter(|d| d.connection == Connection::Wired)
    }

    pub fn wireless(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices
            .iter()
            .filter(|d| d.connection == Connection::Wireless)
    }

    pub fn find(&self, id: &str) -> Option<&DeviceRecord> {
        self.devices.iter().find(|d| d.id == id)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineKind {
    Device(DeviceRecord),
    Simulator,
    Ignored,
}

fn classify_line(line: &str) -> LineKind {
    if !line.contains(FIELD_SEPARATOR) {
        return LineKind::Ignored;
    }

    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    if fields.len() < 3 {
        return LineKind::Ignored;
    }

    let (name, id, platform) = (fields[0], fields[1], fields[2]);
    let lower_line = line.to_lowercase();
    let lower_platform = platform.to_lowercase();

    // Simulators often report an `ios` platform too, so this check goes first.
    if lower_line.contains("simulator") || lower_platform.contains(SIMULATOR_RUNTIME_TOKEN) {
        return LineKind::Simulator;
    }

    if !(lower_platform.contains("ios") || lower_platform.contains("mobile")) {
        return LineKind::Ignored;
    }

    let connection = if lower_line.contains("wireless") {
        Connection::Wireless
    } else {
        Connection::Wired
    };

    LineKind::Device(DeviceRecord {
        name: name.to_string(),
        id: id.to_string(),
        platform: platform.to_string(),
        connection,
    })
}

/// Parse a device listing into an inventory of physical iOS devices.
///
/// Malformed lines, headers and non-mobile targets are skipped silently.
pub fn parse_device_listing(listing: &str) -> Inventory {
    let mut inventory = Inventory::default();

    for line in listing.lines() {
        match classify_line(line) {
            LineKind::Device(device) => inventory.devices.push(device),
            LineKind::Simulator => inventory.simulators_seen += 1,
            LineKind::Ignored => {}
        }
    }

    inventory
}

/// Raw `flutter devices` output together with what was parsed from it.
#[derive(Debug, Clone)]
pub struct Listing {
    pub raw: String,
    pub inventory: Inventory,
}

/// Run `flutter devices` and parse the result.
///
/// Fails only when the listing command itself fails; an empty listing is an
/// empty inventory.
pub async fn list_ios_devices(runner: &dyn CommandRunner, flutter: &str) -> Result<Listing> {
    let output = runner.run_checked(flutter, &["devices"]).await?;
    let inventory = parse_device_listing(&output.stdout);

    tracing::debug!(
        "found {} physical device(s), {} simulator(s)",
        inventory.len(),
        inventory.simulators_seen
    );

    Ok(Listing {
        raw: output.stdout,
        inventory,
    })
}
