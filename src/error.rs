use thiserror::Error;

use crate::devices::DeviceRecord;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("'{program}' was not found or could not be started")]
    ToolNotFound { program: String },

    /// The toolchain ran but reported failure for reasons unrelated to device state.
    #[error("`{command}` failed ({}){}", exit_label(.code), stderr_suffix(.stderr))]
    Toolchain {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("No iPhone found")]
    NoDeviceFound,

    #[error("No physical iPhone found, only simulators")]
    SimulatorOnly,

    #[error("{} iPhones connected, not sure which one to use", .0.len())]
    AmbiguousDevices(Vec<DeviceRecord>),

    #[error("Build failed: {0}")]
    Build(String),

    /// The app was built but installing it did not succeed.
    #[error("Installation to {target} failed ({})", exit_label(.code))]
    InstallFailed {
        target: String,
        code: Option<i32>,
        hints: Vec<String>,
    },

    #[error("Cancelled")]
    Cancelled,

    /// The operator chose the iOS Simulator at a prompt instead of the iPhone.
    #[error("Switched to the iOS Simulator")]
    SimulatorRequested,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dialog error: {0}")]
    Dialog(#[from] dialoguer::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

impl DeployError {
    /// What the operator can do about this failure, one step per entry.
    pub fn remediation(&self) -> Vec<String> {
        match self {
            Self::ToolNotFound { program } => vec![
                format!("Make sure '{}' is installed and on your PATH", program),
                "Point devicedrop at the toolchain: devicedrop config set flutter /path/to/flutter"
                    .to_string(),
            ],
            Self::Toolchain { .. } => {
                vec!["Run `flutter doctor` to check the toolchain setup".to_string()]
            }
            Self::NoDeviceFound => vec![
                "Connect your iPhone with a USB cable".to_string(),
                "Unlock it and tap 'Trust' when asked to trust this Mac".to_string(),
                "Enable Developer Mode (Settings > Privacy & Security)".to_string(),
                "Check what flutter sees: devicedrop devices".to_string(),
            ],
            Self::SimulatorOnly => vec![
                "Connect and unlock a physical iPhone, or".to_string(),
                "Deploy to the simulator instead: devicedrop simulator".to_string(),
            ],
            Self::AmbiguousDevices(devices) => {
                let mut steps: Vec<String> = devices
                    .iter()
                    .map(|d| format!("{} ({})", d.name, d.id))
                    .collect();
                steps.push("Pick one explicitly: devicedrop device --device <id>".to_string());
                steps.push(
                    "Or let flutter ask you: devicedrop device --policy interactive".to_string(),
                );
                steps
            }
            Self::Build(_) => vec!["Run `flutter build ios` directly to see the full log".to_string()],
            Self::InstallFailed { hints, .. } => {
                let mut steps = hints.clone();
                steps.push(
                    "The app was built successfully. You can still install it manually from Xcode."
                        .to_string(),
                );
                steps
            }
            _ => Vec::new(),
        }
    }
}
