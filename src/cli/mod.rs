pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::error::Result;
use crate::select::PolicySetting;

#[derive(Parser)]
#[command(name = "devicedrop")]
#[command(version)]
#[command(about = "Build a Flutter iOS app and install it on your iPhone or the simulator")]
#[command(long_about = "Builds the app, finds your iPhone in `flutter devices` and installs to it.\n\nOne device: installs straight away. None or several: fails with advice, or lets flutter ask, depending on --policy.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Flutter binary to use (overrides config)
    #[arg(long, global = true, env = "DEVICEDROP_FLUTTER")]
    pub flutter: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build in release mode and install to a connected iPhone
    Device {
        /// What to do with zero or several devices
        #[arg(short, long, value_enum)]
        policy: Option<PolicySetting>,

        /// Install to this device id without selecting
        #[arg(short, long)]
        device: Option<String>,

        /// Install the existing build without rebuilding
        #[arg(long)]
        skip_build: bool,
    },

    /// Build in debug mode and install to the iOS Simulator
    Simulator {
        /// Install the existing build without rebuilding
        #[arg(long)]
        skip_build: bool,
    },

    /// List the physical iPhones flutter can see
    Devices {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the toolchain and environment
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Print the config file in use
    Path,
}

impl Cli {
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load()?;
        if let Some(flutter) = &self.flutter {
            config.flutter = flutter.clone();
        }
        Ok(config)
    }

    pub async fn execute(self) -> Result<()> {
        match &self.command {
            Commands::Device {
                policy,
                device,
                skip_build,
            } => {
                let config = self.load_config()?;
                commands::device::execute(&config, *policy, device.clone(), *skip_build).await
            }
            Commands::Simulator { skip_build } => {
                let config = self.load_config()?;
                commands::simulator::execute(&config, *skip_build).await
            }
            Commands::Devices { json } => {
                let config = self.load_config()?;
                commands::devices::execute(&config, *json).await
            }
            Commands::Doctor => {
                let config = self.load_config()?;
                commands::doctor::execute(&config).await
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => commands::config::show().await,
                ConfigCommands::Set { key, value } => commands::config::set(key, value).await,
                ConfigCommands::Path => commands::config::path().await,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_device_flags() {
        let cli = Cli::try_parse_from([
            "devicedrop",
            "device",
            "--policy",
            "strict",
            "--device",
            "00008030-ABC123",
            "--skip-build",
        ])
        .unwrap();

        match cli.command {
            Commands::Device {
                policy,
                device,
                skip_build,
            } => {
                assert_eq!(policy, Some(PolicySetting::Strict));
                assert_eq!(device.as_deref(), Some("00008030-ABC123"));
                assert!(skip_build);
            }
            _ => panic!("expected device command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["devicedrop", "device", "--policy", "maybe"]).is_err());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["devicedrop", "devices", "--json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Devices { json: true }));
    }
}
