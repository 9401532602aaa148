//! `flutter build ios` ahead of the install.

use crate::error::{DeployError, Result};
use crate::install::{BuildMode, Destination};
use crate::runner::CommandRunner;
use crate::ui;
use crate::utils::command_line;

pub fn build_args(mode: BuildMode, destination: Destination) -> Vec<&'static str> {
    let mut args = vec!["build", "ios", mode.flag()];
    if destination == Destination::Simulator {
        args.push("--simulator");
    }
    args
}

pub async fn build(
    runner: &dyn CommandRunner,
    flutter: &str,
    mode: BuildMode,
    destination: Destination,
) -> Result<()> {
    let args = build_args(mode, destination);
    let code = runner.run_streaming(flutter, &args).await?;
    ui::reset_terminal();

    match code {
        Some(0) => Ok(()),
        code => Err(DeployError::Build(format!(
            "`{}` exited with {:?}",
            command_line(flutter, &args),
            code
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;

    #[test]
    fn test_build_args() {
        assert_eq!(
            build_args(BuildMode::Release, Destination::Device),
            ["build", "ios", "--release"]
        );
        assert_eq!(
            build_args(BuildMode::Debug, Destination::Simulator),
            ["build", "ios", "--debug", "--simulator"]
        );
    }

    #[tokio::test]
    async fn test_build_failure() {
        let runner = FakeRunner::new().respond("flutter build ios --release", 1, "");
        let err = build(&runner, "flutter", BuildMode::Release, Destination::Device)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Build(_)));
        assert!(err.to_string().contains("flutter build ios --release"));
    }

    #[tokio::test]
    async fn test_build_success() {
        let runner = FakeRunner::new().respond("flutter build ios --debug --simulator", 0, "");
        build(&runner, "flutter", BuildMode::Debug, Destination::Simulator)
            .await
            .unwrap();
    }
}
