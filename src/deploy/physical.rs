use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dialoguer::{Confirm, Select};

use super::Deployment;
use crate::build;
use crate::config::AppConfig;
use crate::devices::{list_ios_devices, Inventory, Listing};
use crate::error::{DeployError, Result};
use crate::install::{self, BuildMode, Destination, InstallRequest};
use crate::probe::{probe_vpn, usb_iphone_attached, ProbeResult};
use crate::runner::CommandRunner;
use crate::select::{decide, Advisory, DeploymentDecision, SelectionPolicy};
use crate::ui;

const TRUST_STEPS: &[&str] = &[
    "Unlock your iPhone",
    "Look for a 'Trust This Computer?' dialog on your iPhone",
    "Tap 'Trust' and enter your iPhone passcode",
    "If no dialog appears, go to Settings > General > VPN & Device Management and trust your Mac",
];

/// Release build installed onto a real iPhone.
pub struct PhysicalDeviceDeployment<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a AppConfig,
    policy: SelectionPolicy,
    device: Option<String>,
    skip_build: bool,
    interactive: bool,
    /// Set once the operator has answered the VPN prompt
    vpn_answered: AtomicBool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VpnChoice {
    Continue,
    Rescan,
    Simulator,
    Exit,
}

impl<'a> PhysicalDeviceDeployment<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a AppConfig, policy: SelectionPolicy) -> Self {
        Self {
            runner,
            config,
            policy,
            device: None,
            skip_build: false,
            interactive: ui::is_interactive(),
            vpn_answered: AtomicBool::new(false),
        }
    }

    /// Install to this device id without selecting.
    pub fn device(mut self, id: Option<String>) -> Self {
        self.device = id;
        self
    }

    pub fn skip_build(mut self, skip: bool) -> Self {
        self.skip_build = skip;
        self
    }

    /// Whether prompts may be shown (trust confirmation, VPN choice).
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    async fn list(&self) -> Result<Listing> {
        let listing = list_ios_devices(self.runner, &self.config.flutter_binary()).await?;
        ui::listing(&listing.raw);
        Ok(listing)
    }

    /// An iPhone on the USB bus that flutter can't see over the cable is
    /// almost always an untrusted one, even when wireless devices are listed.
    async fn check_trust(&self, listing: Listing) -> Result<Listing> {
        if listing.inventory.wired().next().is_some() || !usb_iphone_attached(self.runner).await {
            return Ok(listing);
        }

        ui::warn("iPhone connected but not trusted");
        ui::note("Your iPhone is connected via USB, but flutter cannot access it.");
        ui::numbered(TRUST_STEPS);

        if !self.interactive {
            return Ok(listing);
        }

        let trusted = Confirm::new()
            .with_prompt("  Trusted this Mac? Check again")
            .default(true)
            .interact()?;
        if !trusted {
            // Wireless devices are still usable without the cable.
            if listing.inventory.is_empty() {
                return Err(DeployError::Cancelled);
            }
            return Ok(listing);
        }

        ui::step("Rechecking device connection...");
        self.list().await
    }

    fn ask_vpn_choice(&self) -> Result<VpnChoice> {
        let options = [
            "Continue with wireless deployment (may fail)",
            "I'll connect the iPhone via USB cable, check again",
            "Deploy to the iOS Simulator instead",
            "Exit and fix VPN settings",
        ];

        let choice = Select::new()
            .with_prompt("  Would you like to")
            .items(&options)
            .default(0)
            .interact()?;

        Ok(match choice {
            0 => VpnChoice::Continue,
            1 => VpnChoice::Rescan,
            2 => VpnChoice::Simulator,
            _ => VpnChoice::Exit,
        })
    }

    async fn apply_vpn_choice(&self, choice: VpnChoice, listing: Listing) -> Result<Listing> {
        let listing = match choice {
            VpnChoice::Continue => listing,
            VpnChoice::Rescan => {
                ui::step("Rechecking device connection...");
                self.list().await?
            }
            VpnChoice::Simulator => return Err(DeployError::SimulatorRequested),
            VpnChoice::Exit => return Err(DeployError::Cancelled),
        };

        self.vpn_answered.store(true, Ordering::Relaxed);
        Ok(listing)
    }
}

#[async_trait]
impl Deployment for PhysicalDeviceDeployment<'_> {
    fn label(&self) -> &'static str {
        "iPhone"
    }

    async fn build(&self) -> Result<()> {
        if self.skip_build {
            return Ok(());
        }

        ui::step(format!("Building {} (release)...", self.config.app_name));
        build::build(
            self.runner,
            &self.config.flutter_binary(),
            BuildMode::Release,
            Destination::Device,
        )
        .await
    }

    async fn probe(&self) -> ProbeResult {
        probe_vpn(self.runner, &self.config.probe).await
    }

    async fn discover(&self, probe: &ProbeResult) -> Result<Inventory> {
        ui::step("Checking for connected devices...");
        let mut listing = self.list().await?;

        if self.device.is_some() {
            return Ok(listing.inventory);
        }

        listing = self.check_trust(listing).await?;

        let wireless_only =
            !listing.inventory.is_empty() && listing.inventory.wired().next().is_none();

        // VPN never blocks; on a terminal the operator gets to decide first.
        if probe.vpn_active && wireless_only && self.interactive {
            ui::warn("VPN detected. It can block the local network discovery wireless installs need.");
            let choice = self.ask_vpn_choice()?;
            listing = self.apply_vpn_choice(choice, listing).await?;
        }

        Ok(listing.inventory)
    }

    fn select(&self, inventory: &Inventory, probe: &ProbeResult) -> DeploymentDecision {
        match &self.device {
            Some(id) => {
                if inventory.find(id).is_none() {
                    tracing::warn!("device {} is not in the current listing, trying anyway", id);
                }
                DeploymentDecision::InstallTargeted(id.clone())
            }
            None => decide(inventory, probe, self.policy),
        }
    }

    fn suppresses(&self, advisory: &Advisory) -> bool {
        *advisory == Advisory::VpnBlocksWireless && self.vpn_answered.load(Ordering::Relaxed)
    }

    async fn install(&self, decision: DeploymentDecision, probe: &ProbeResult) -> Result<()> {
        let device_id = decision.into_target()?;

        match &device_id {
            Some(id) => ui::step(format!("Installing to iPhone (ID: {})...", id)),
            None => {
                ui::step("Installing to iPhone...");
                ui::note("Please select your iPhone when prompted:");
            }
        }

        install::install(
            self.runner,
            &self.config.flutter_binary(),
            InstallRequest {
                destination: Destination::Device,
                mode: BuildMode::Release,
                device_id: device_id.as_deref(),
                vpn_active: probe.vpn_active,
            },
        )
        .await?;

        ui::success("Deployment complete!");
        ui::note(format!(
            "{} has been updated on your iPhone. You can disconnect it and use the app anywhere.",
            self.config.app_name
        ));
        Ok(())
    }
}
