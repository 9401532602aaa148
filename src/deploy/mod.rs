//! Deployment orchestration.
//!
//! ```text
//! build → probe → discover → select → install
//! ```
//!
//! Each step finishes before the next one starts. The two variants share the
//! sequence and differ in what each step does:
//!
//! - [`PhysicalDeviceDeployment`]: VPN probe, `flutter devices`, policy-driven
//!   selection, release install.
//! - [`SimulatorDeployment`]: no probe, start the Simulator app instead of
//!   discovery, debug install left to flutter.

mod physical;
mod simulator;

use async_trait::async_trait;

pub use physical::PhysicalDeviceDeployment;
pub use simulator::SimulatorDeployment;

use crate::devices::Inventory;
use crate::error::{DeployError, Result};
use crate::probe::ProbeResult;
use crate::select::{Advisory, Decided, DeploymentDecision, Selection};
use crate::ui;

#[async_trait]
pub trait Deployment: Send + Sync {
    /// Human-readable destination ("iPhone", "iOS Simulator")
    fn label(&self) -> &'static str;

    async fn build(&self) -> Result<()>;

    /// Environment checks. Never fails.
    async fn probe(&self) -> ProbeResult;

    async fn discover(&self, probe: &ProbeResult) -> Result<Inventory>;

    fn select(&self, inventory: &Inventory, probe: &ProbeResult) -> DeploymentDecision;

    /// Advisories already dealt with during discovery, not worth repeating.
    fn suppresses(&self, _advisory: &Advisory) -> bool {
        false
    }

    async fn install(&self, decision: DeploymentDecision, probe: &ProbeResult) -> Result<()>;
}

/// Run one deployment end to end.
pub async fn run(deployment: &dyn Deployment) -> Result<Decided> {
    tracing::debug!("deploying to {}", deployment.label());

    deployment.build().await?;

    let selection = Selection::start().probed(deployment.probe().await);
    let inventory = deployment.discover(selection.probe()).await?;
    let mut decided = selection
        .inventoried(inventory)
        .decide_with(|inventory, probe| deployment.select(inventory, probe));
    decided.advisories.retain(|advisory| !deployment.suppresses(advisory));

    for advisory in &decided.advisories {
        ui::advisory(advisory);
    }

    tracing::debug!("decision: {:?}", decided.decision);
    deployment
        .install(decided.decision.clone(), &decided.probe)
        .await?;

    Ok(decided)
}

/// Run `primary`, switching to `fallback` when the operator picks the
/// simulator at a prompt.
pub async fn run_with_fallback(
    primary: &dyn Deployment,
    fallback: &dyn Deployment,
) -> Result<Decided> {
    match run(primary).await {
        Err(DeployError::SimulatorRequested) => {
            ui::step(format!("Switching to {}...", fallback.label()));
            run(fallback).await
        }
        other => other,
    }
}
