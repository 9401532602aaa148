//! `flutter install`, targeted or left to flutter's prompt.

use crate::error::{DeployError, Result};
use crate::runner::CommandRunner;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Release,
    Debug,
}

impl BuildMode {
    pub fn flag(self) -> &'static str {
        match self {
            Self::Release => "--release",
            Self::Debug => "--debug",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Device,
    Simulator,
}

#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    pub destination: Destination,
    pub mode: BuildMode,
    /// `None` leaves device selection to flutter
    pub device_id: Option<&'a str>,
    pub vpn_active: bool,
}

pub fn install_args<'a>(mode: BuildMode, device_id: Option<&'a str>) -> Vec<&'a str> {
    let mut args = vec!["install", mode.flag()];
    if let Some(id) = device_id {
        args.push("-d");
        args.push(id);
    }
    args
}

/// Troubleshooting steps for a failed install, most likely cause first.
pub fn remediation_hints(request: &InstallRequest<'_>) -> Vec<String> {
    let mut hints: Vec<&str> = match request.destination {
        Destination::Simulator => vec![
            "Make sure the Simulator app finished booting a device",
            "Check that an iOS simulator runtime is installed in Xcode",
        ],
        Destination::Device => vec![
            "Make sure your iPhone is unlocked",
            "Check that you've trusted this Mac on your iPhone",
            "Ensure Developer Mode is enabled on your iPhone",
        ],
    };

    if request.destination == Destination::Device && request.device_id.is_none() {
        hints.push("Try connecting your iPhone via USB cable");
        hints.push("Check that both devices are on the same Wi-Fi network");
    }

    if request.vpn_active {
        hints.push("Try disabling your VPN temporarily");
        hints.push("Configure VPN split tunneling to exclude the local network");
    }

    hints.into_iter().map(String::from).collect()
}

/// Run the install with the terminal attached so progress (and flutter's
/// device prompt, when untargeted) reach the operator directly.
pub async fn install(
    runner: &dyn CommandRunner,
    flutter: &str,
    request: InstallRequest<'_>,
) -> Result<()> {
    let args = install_args(request.mode, request.device_id);
    let code = runner.run_streaming(flutter, &args).await?;
    ui::reset_terminal();

    if code == Some(0) {
        return Ok(());
    }

    let target = match (request.destination, request.device_id) {
        (Destination::Simulator, _) => "the iOS Simulator".to_string(),
        (Destination::Device, Some(id)) => format!("iPhone {}", id),
        (Destination::Device, None) => "the selected iPhone".to_string(),
    };

    tracing::debug!("install to {} exited with {:?}", target, code);

    Err(DeployError::InstallFailed {
        target,
        code,
        hints: remediation_hints(&request),
    })
}
