use async_trait::async_trait;

use super::Deployment;
use crate::build;
use crate::config::AppConfig;
use crate::devices::Inventory;
use crate::error::Result;
use crate::install::{self, BuildMode, Destination, InstallRequest};
use crate::probe::ProbeResult;
use crate::runner::CommandRunner;
use crate::select::DeploymentDecision;
use crate::ui;
use crate::utils::format_duration;

/// Debug build installed onto whatever the Simulator app boots.
pub struct SimulatorDeployment<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a AppConfig,
    skip_build: bool,
}

impl<'a> SimulatorDeployment<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a AppConfig) -> Self {
        Self {
            runner,
            config,
            skip_build: false,
        }
    }

    pub fn skip_build(mut self, skip: bool) -> Self {
        self.skip_build = skip;
        self
    }
}

#[async_trait]
impl Deployment for SimulatorDeployment<'_> {
    fn label(&self) -> &'static str {
        "iOS Simulator"
    }

    async fn build(&self) -> Result<()> {
        if self.skip_build {
            return Ok(());
        }

        ui::step(format!("Building {} (debug, simulator)...", self.config.app_name));
        build::build(
            self.runner,
            &self.config.flutter_binary(),
            BuildMode::Debug,
            Destination::Simulator,
        )
        .await
    }

    async fn probe(&self) -> ProbeResult {
        ProbeResult::default()
    }

    /// Start the Simulator app and give it a moment to boot.
    async fn discover(&self, _probe: &ProbeResult) -> Result<Inventory> {
        ui::step("Starting iOS Simulator...");
        self.runner.run_checked("open", &["-a", "Simulator"]).await?;

        let wait = self.config.boot_wait();
        if !wait.is_zero() {
            ui::note(format!(
                "Waiting {} for the simulator to start...",
                format_duration(wait.as_secs())
            ));
            tokio::time::sleep(wait).await;
        }

        Ok(Inventory::default())
    }

    fn select(&self, _inventory: &Inventory, _probe: &ProbeResult) -> DeploymentDecision {
        DeploymentDecision::DelegateInteractive
    }

    async fn install(&self, decision: DeploymentDecision, probe: &ProbeResult) -> Result<()> {
        let device_id = decision.into_target()?;

        ui::step("Installing to iOS Simulator...");
        install::install(
            self.runner,
            &self.config.flutter_binary(),
            InstallRequest {
                destination: Destination::Simulator,
                mode: BuildMode::Debug,
                device_id: device_id.as_deref(),
                vpn_active: probe.vpn_active,
            },
        )
        .await?;

        ui::success("Deployment complete!");
        ui::note(format!(
            "{} has been installed on the iOS Simulator.",
            self.config.app_name
        ));
        Ok(())
    }
}
