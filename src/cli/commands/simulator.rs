use crate::config::AppConfig;
use crate::deploy::{self, SimulatorDeployment};
use crate::error::Result;
use crate::runner::ProcessRunner;
use crate::ui;

pub async fn execute(config: &AppConfig, skip_build: bool) -> Result<()> {
    ui::print_banner();

    let runner = ProcessRunner::new();
    let deployment = SimulatorDeployment::new(&runner, config).skip_build(skip_build);

    deploy::run(&deployment).await?;
    Ok(())
}
