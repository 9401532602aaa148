//! Choosing where to install.
//!
//! The decision is a pure function of the inventory and the configured
//! policy. The VPN probe never changes it; it only produces advisories that
//! are shown before the install starts.
//!
//! A run moves through `Start → ProbeDone → InventoryDone → Decided`, modelled
//! by [`Selection`] so the steps can only happen in that order.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::devices::{DeviceRecord, Inventory};
use crate::error::{DeployError, Result};
use crate::probe::{ProbeResult, VpnSignal};

/// What to do when there is no single obvious device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Fail with an explanation
    Strict,
    /// Hand the choice to flutter's own device prompt
    Interactive,
}

/// Policy as configured; `Auto` picks based on whether a terminal is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicySetting {
    #[default]
    Auto,
    Strict,
    Interactive,
}

impl PolicySetting {
    pub fn resolve(self, terminal_attached: bool) -> SelectionPolicy {
        match self {
            Self::Strict => SelectionPolicy::Strict,
            Self::Interactive => SelectionPolicy::Interactive,
            Self::Auto if terminal_attached => SelectionPolicy::Interactive,
            Self::Auto => SelectionPolicy::Strict,
        }
    }
}

impl FromStr for PolicySetting {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "strict" => Ok(Self::Strict),
            "interactive" => Ok(Self::Interactive),
            other => Err(format!(
                "Unknown policy '{}'. Use one of: auto, strict, interactive",
                other
            )),
        }
    }
}

impl std::fmt::Display for PolicySetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Strict => write!(f, "strict"),
            Self::Interactive => write!(f, "interactive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentDecision {
    InstallTargeted(String),
    NoDeviceFound,
    /// Nothing physical, but simulators were listed
    SimulatorOnly,
    AmbiguousDevices(Vec<DeviceRecord>),
    DelegateInteractive,
}

impl DeploymentDecision {
    /// Device id to pass to the installer (`None` lets flutter prompt), or
    /// the failure to report.
    pub fn into_target(self) -> Result<Option<String>> {
        match self {
            Self::InstallTargeted(id) => Ok(Some(id)),
            Self::DelegateInteractive => Ok(None),
            Self::NoDeviceFound => Err(DeployError::NoDeviceFound),
            Self::SimulatorOnly => Err(DeployError::SimulatorOnly),
            Self::AmbiguousDevices(devices) => Err(DeployError::AmbiguousDevices(devices)),
        }
    }
}

pub fn decide(
    inventory: &Inventory,
    probe: &ProbeResult,
    policy: SelectionPolicy,
) -> DeploymentDecision {
    tracing::debug!(
        devices = inventory.len(),
        simulators = inventory.simulators_seen,
        vpn = probe.vpn_active,
        ?policy,
        "selecting install target"
    );

    match (inventory.devices.as_slice(), policy) {
        ([only], _) => DeploymentDecision::InstallTargeted(only.id.clone()),
        ([], _) if inventory.has_simulators() => DeploymentDecision::SimulatorOnly,
        ([], SelectionPolicy::Strict) => DeploymentDecision::NoDeviceFound,
        (devices, SelectionPolicy::Strict) => {
            DeploymentDecision::AmbiguousDevices(devices.to_vec())
        }
        (_, SelectionPolicy::Interactive) => DeploymentDecision::DelegateInteractive,
    }
}

/// Warnings shown before installing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    VpnActive(Option<VpnSignal>),
    /// VPN is up and every visible device is only reachable over the network
    VpnBlocksWireless,
}

pub fn advisories(inventory: &Inventory, probe: &ProbeResult) -> Vec<Advisory> {
    let mut out = Vec::new();
    if !probe.vpn_active {
        return out;
    }

    out.push(Advisory::VpnActive(probe.signal));
    if !inventory.is_empty() && inventory.wired().next().is_none() {
        out.push(Advisory::VpnBlocksWireless);
    }
    out
}

pub struct Start;

pub struct ProbeDone {
    probe: ProbeResult,
}

pub struct InventoryDone {
    probe: ProbeResult,
    inventory: Inventory,
}

/// Outcome of a selection run.
#[derive(Debug, Clone)]
pub struct Decided {
    pub decision: DeploymentDecision,
    pub advisories: Vec<Advisory>,
    pub probe: ProbeResult,
    pub inventory: Inventory,
}

pub struct Selection<S> {
    state: S,
}

impl Selection<Start> {
    pub fn start() -> Self {
        Self { state: Start }
    }

    pub fn probed(self, probe: ProbeResult) -> Selection<ProbeDone> {
        Selection {
            state: ProbeDone { probe },
        }
    }
}

impl Selection<ProbeDone> {
    pub fn probe(&self) -> &ProbeResult {
        &self.state.probe
    }

    pub fn inventoried(self, inventory: Inventory) -> Selection<InventoryDone> {
        Selection {
            state: InventoryDone {
                probe: self.state.probe,
                inventory,
            },
        }
    }
}

impl Selection<InventoryDone> {
    /// Finish with the given decision rule.
    pub fn decide_with<F>(self, rule: F) -> Decided
    where
        F: FnOnce(&Inventory, &ProbeResult) -> DeploymentDecision,
    {
        let InventoryDone { probe, inventory } = self.state;
        let decision = rule(&inventory, &probe);
        let advisories = advisories(&inventory, &probe);

        Decided {
            decision,
            advisories,
            probe,
            inventory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::parse_device_listing;

    const VPN: ProbeResult = ProbeResult {
        vpn_active: true,
        signal: Some(VpnSignal::TunnelInterface),
    };
    const NO_VPN: ProbeResult = ProbeResult {
        vpn_active: false,
        signal: None,
    };

    const BOTH: [SelectionPolicy; 2] = [SelectionPolicy::Strict, SelectionPolicy::Interactive];

    fn two_devices() -> Inventory {
        parse_device_listing(
            "Sam’s iPhone • 00008030-AA • ios • iOS 17.5\n\
             Work iPhone • 00008110-BB • ios • iOS 17.4",
        )
    }

    #[test]
    fn test_single_device_is_targeted_regardless_of_vpn_and_policy() {
        let inventory = parse_device_listing(
            "Sam's iPhone • 00008030-ABC123 • ios • iOS 17.5\n\
             iPhone 15 Pro Max • ABCD1234 • ios • simulator",
        );

        for probe in [VPN, NO_VPN] {
            for policy in BOTH {
                assert_eq!(
                    decide(&inventory, &probe, policy),
                    DeploymentDecision::InstallTargeted("00008030-ABC123".to_string())
                );
            }
        }
    }

    #[test]
    fn test_empty_listing_under_strict_policy_is_no_device() {
        let inventory = parse_device_listing("");
        assert_eq!(
            decide(&inventory, &NO_VPN, SelectionPolicy::Strict),
            DeploymentDecision::NoDeviceFound
        );
    }

    #[test]
    fn test_empty_listing_under_interactive_policy_delegates() {
        let inventory = parse_device_listing("macOS (desktop) • macos • darwin-arm64");
        assert_eq!(
            decide(&inventory, &NO_VPN, SelectionPolicy::Interactive),
            DeploymentDecision::DelegateInteractive
        );
    }

    #[test]
    fn test_simulator_only_listing_redirects_under_both_policies() {
        let inventory = parse_device_listing("iPhone 15 • SIM-1 • ios • simulator");
        for policy in BOTH {
            let decision = decide(&inventory, &VPN, policy);
            assert_eq!(decision, DeploymentDecision::SimulatorOnly);
            assert_ne!(decision, DeploymentDecision::NoDeviceFound);
        }
    }

    #[test]
    fn test_multiple_devices_strict_is_ambiguous() {
        let inventory = two_devices();
        match decide(&inventory, &NO_VPN, SelectionPolicy::Strict) {
            DeploymentDecision::AmbiguousDevices(devices) => {
                assert_eq!(devices, inventory.devices);
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_multiple_devices_interactive_delegates() {
        assert_eq!(
            decide(&two_devices(), &NO_VPN, SelectionPolicy::Interactive),
            DeploymentDecision::DelegateInteractive
        );
    }

    #[test]
    fn test_into_target() {
        assert_eq!(
            DeploymentDecision::InstallTargeted("X".to_string())
                .into_target()
                .unwrap(),
            Some("X".to_string())
        );
        assert_eq!(DeploymentDecision::DelegateInteractive.into_target().unwrap(), None);
        assert!(matches!(
            DeploymentDecision::NoDeviceFound.into_target(),
            Err(DeployError::NoDeviceFound)
        ));
        assert!(matches!(
            DeploymentDecision::SimulatorOnly.into_target(),
            Err(DeployError::SimulatorOnly)
        ));
        assert!(matches!(
            DeploymentDecision::AmbiguousDevices(two_devices().devices).into_target(),
            Err(DeployError::AmbiguousDevices(d)) if d.len() == 2
        ));
    }

    #[test]
    fn test_advisories() {
        let wired = two_devices();
        let wireless = parse_device_listing("Sam’s iPhone (wireless) • AA • ios");

        assert!(advisories(&wired, &NO_VPN).is_empty());
        assert_eq!(
            advisories(&wired, &VPN),
            [Advisory::VpnActive(Some(VpnSignal::TunnelInterface))]
        );
        assert_eq!(
            advisories(&wireless, &VPN),
            [
                Advisory::VpnActive(Some(VpnSignal::TunnelInterface)),
                Advisory::VpnBlocksWireless
            ]
        );
        assert_eq!(advisories(&Inventory::default(), &VPN).len(), 1);
    }

    #[test]
    fn test_selection_flow() {
        let selection = Selection::start().probed(VPN);
        assert!(selection.probe().vpn_active);

        let decided = selection
            .inventoried(parse_device_listing("Sam’s iPhone • AA • ios"))
            .decide_with(|inventory, probe| decide(inventory, probe, SelectionPolicy::Strict));

        assert_eq!(decided.decision, DeploymentDecision::InstallTargeted("AA".to_string()));
        assert_eq!(decided.inventory.len(), 1);
        assert_eq!(decided.advisories.len(), 1);
        assert!(decided.probe.vpn_active);
    }

    #[test]
    fn test_policy_setting() {
        assert_eq!(PolicySetting::Auto.resolve(true), SelectionPolicy::Interactive);
        assert_eq!(PolicySetting::Auto.resolve(false), SelectionPolicy::Strict);
        assert_eq!(PolicySetting::Strict.resolve(true), SelectionPolicy::Strict);
        assert_eq!(PolicySetting::Interactive.resolve(false), SelectionPolicy::Interactive);

        assert_eq!("Strict".parse::<PolicySetting>().unwrap(), PolicySetting::Strict);
        assert!("sometimes".parse::<PolicySetting>().is_err());
        assert_eq!(PolicySetting::Interactive.to_string(), "interactive");
    }
}
