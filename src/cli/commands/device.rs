use crate::config::AppConfig;
use crate::deploy::{self, PhysicalDeviceDeployment, SimulatorDeployment};
use crate::error::Result;
use crate::runner::ProcessRunner;
use crate::select::PolicySetting;
use crate::ui;

pub async fn execute(
    config: &AppConfig,
    policy: Option<PolicySetting>,
    device: Option<String>,
    skip_build: bool,
) -> Result<()> {
    ui::print_banner();

    let interactive = ui::is_interactive();
    let policy = policy.unwrap_or(config.policy).resolve(interactive);
    tracing::debug!("selection policy: {:?}", policy);

    let runner = ProcessRunner::new();
    let deployment = PhysicalDeviceDeployment::new(&runner, config, policy)
        .device(device)
        .skip_build(skip_build)
        .interactive(interactive);
    let simulator = SimulatorDeployment::new(&runner, config).skip_build(skip_build);

    deploy::run_with_fallback(&deployment, &simulator).await?;
    Ok(())
}
