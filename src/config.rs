use std::path::{Path, PathBuf};
use std::time::Duration;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};
use crate::select::PolicySetting;
use crate::utils::parse_duration;

/// Per-project config file, looked up in the current directory first.
pub const PROJECT_CONFIG_FILE: &str = "devicedrop.yaml";

const DEFAULT_BOOT_WAIT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Shown in success messages
    pub app_name: String,
    /// Toolchain binary, `~` is expanded
    pub flutter: String,
    pub policy: PolicySetting,
    pub simulator_boot_wait: String,
    pub probe: ProbeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Health Notes".to_string(),
            flutter: "flutter".to_string(),
            policy: PolicySetting::Auto,
            simulator_boot_wait: "3s".to_string(),
            probe: ProbeConfig::default(),
        }
    }
}

/// Knobs for the VPN heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub vpn: bool,
    /// Interface name fragment VPN clients use for their tunnels
    pub tunnel_interface: String,
    /// Process name fragments, joined with `|` into one pattern
    pub vpn_processes: Vec<String>,
    /// Marker `scutil --nc list` prints for an active connection
    pub connected_marker: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            vpn: true,
            tunnel_interface: "utun".to_string(),
            vpn_processes: [
                "openvpn",
                "wireguard",
                "tailscaled",
                "nordvpn",
                "expressvpn",
                "protonvpn",
                "Cisco AnyConnect",
                "GlobalProtect",
                "FortiClient",
                "vpn",
                "tunnel",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            connected_marker: "(Connected)".to_string(),
        }
    }
}

impl ProbeConfig {
    /// The process pattern, or `None` when no fragments are configured.
    pub fn process_regex(&self) -> std::result::Result<Option<Regex>, regex_lite::Error> {
        let fragments: Vec<&str> = self
            .vpn_processes
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if fragments.is_empty() {
            return Ok(None);
        }

        Regex::new(&fragments.join("|")).map(Some)
    }
}

impl AppConfig {
    pub fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| DeployError::Config("HOME environment variable not set".to_string()))?;
        Ok(PathBuf::from(home).join(".config").join("devicedrop"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.yaml"))
    }

    /// The file `load()` reads from: the project file if present, otherwise
    /// the user config if present.
    pub fn locate() -> Result<Option<PathBuf>> {
        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.exists() {
            return Ok(Some(project));
        }

        let user = Self::config_path()?;
        Ok(user.exists().then_some(user))
    }

    /// Load config, falling back to defaults when no file exists, then apply
    /// `DEVICEDROP_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::locate()? {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| {
            DeployError::Config(format!("Invalid config {}: {}", path.display(), e))
        })
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(flutter) = lookup("DEVICEDROP_FLUTTER").filter(|v| !v.is_empty()) {
            self.flutter = flutter;
        }

        if let Some(policy) = lookup("DEVICEDROP_POLICY").filter(|v| !v.is_empty()) {
            self.policy = policy.parse().map_err(DeployError::Config)?;
        }

        Ok(())
    }

    /// Save to the given path, or to the user config when `None`.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content)?;

        Ok(path)
    }

    pub fn flutter_binary(&self) -> String {
        shellexpand::tilde(&self.flutter).to_string()
    }

    pub fn boot_wait(&self) -> Duration {
        parse_duration(&self.simulator_boot_wait).unwrap_or(DEFAULT_BOOT_WAIT)
    }

    pub fn validate(&self) -> Result<()> {
        if self.flutter.trim().is_empty() {
            return Err(DeployError::Config(
                "flutter binary must not be empty".to_string(),
            ));
        }

        if parse_duration(&self.simulator_boot_wait).is_none() {
            return Err(DeployError::Config(format!(
                "Invalid simulator_boot_wait '{}'. Use format like '3s', '1m', or '5'",
                self.simulator_boot_wait
            )));
        }

        if self.probe.vpn && self.probe.tunnel_interface.trim().is_empty() {
            return Err(DeployError::Config(
                "probe.tunnel_interface must not be empty while the VPN probe is enabled"
                    .to_string(),
            ));
        }

        if let Err(e) = self.probe.process_regex() {
            return Err(DeployError::Config(format!(
                "Invalid probe.vpn_processes pattern: {}",
                e
            )));
        }

        Ok(())
    }

    /// Update one key from `config set`. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "app_name" | "app-name" => self.app_name = value.to_string(),
            "flutter" => self.flutter = value.to_string(),
            "policy" => self.policy = value.parse().map_err(DeployError::Config)?,
            "simulator_boot_wait" | "simulator-boot-wait" => {
                self.simulator_boot_wait = value.to_string()
            }
            "probe.vpn" => self.probe.vpn = matches!(value, "true" | "enabled" | "on"),
            "probe.tunnel_interface" => self.probe.tunnel_interface = value.to_string(),
            "probe.vpn_processes" => {
                self.probe.vpn_processes = value.split(',').map(|s| s.trim().to_string()).collect()
            }
            "probe.connected_marker" => self.probe.connected_marker = value.to_string(),
            _ => return Ok(false),
        }

        self.validate()?;
        Ok(true)
    }
}

pub const SETTABLE_KEYS: &[&str] = &[
    "app_name",
    "flutter",
    "policy",
    "simulator_boot_wait",
    "probe.vpn",
    "probe.tunnel_interface",
    "probe.vpn_processes",
    "probe.connected_marker",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.flutter, "flutter");
        assert_eq!(config.policy, PolicySetting::Auto);
        assert_eq!(config.boot_wait(), Duration::from_secs(3));
        assert!(config.probe.vpn);
        assert_eq!(config.probe.tunnel_interface, "utun");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
app_name: Field Notes
policy: strict
probe:
  vpn: false
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.app_name, "Field Notes");
        assert_eq!(config.policy, PolicySetting::Strict);
        assert_eq!(config.flutter, "flutter");
        assert!(!config.probe.vpn);
        assert_eq!(config.probe.connected_marker, "(Connected)");
        assert!(!config.probe.vpn_processes.is_empty());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result: std::result::Result<AppConfig, _> = serde_yaml::from_str("policy: maybe");
        assert!(result.is_err());
    }

    #[test]
    fn test_process_regex_joins_fragments() {
        let probe = ProbeConfig {
            vpn_processes: vec!["openvpn".to_string(), " ".to_string(), "wg-quick".to_string()],
            ..Default::default()
        };
        let re = probe.process_regex().unwrap().unwrap();
        assert_eq!(re.as_str(), "openvpn|wg-quick");

        let empty = ProbeConfig {
            vpn_processes: Vec::new(),
            ..Default::default()
        };
        assert!(empty.process_regex().unwrap().is_none());
    }

    #[test]
    fn test_validate_invalid_boot_wait() {
        let config = AppConfig {
            simulator_boot_wait: "a while".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid simulator_boot_wait"));
    }

    #[test]
    fn test_validate_oversized_boot_wait() {
        let config = AppConfig {
            simulator_boot_wait: "9999999999999999h".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DeployError::Config(_))));
    }

    #[test]
    fn test_validate_invalid_process_pattern() {
        let mut config = AppConfig::default();
        config.probe.vpn_processes = vec!["(unclosed".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_flutter() {
        let config = AppConfig {
            flutter: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| match key {
                "DEVICEDROP_FLUTTER" => Some("/opt/flutter/bin/flutter".to_string()),
                "DEVICEDROP_POLICY" => Some("interactive".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.flutter, "/opt/flutter/bin/flutter");
        assert_eq!(config.policy, PolicySetting::Interactive);

        let err = AppConfig::default()
            .apply_overrides(|key| (key == "DEVICEDROP_POLICY").then(|| "yolo".to_string()))
            .unwrap_err();
        assert!(matches!(err, DeployError::Config(_)));
    }

    #[test]
    fn test_set_known_and_unknown_keys() {
        let mut config = AppConfig::default();
        assert!(config.set("policy", "strict").unwrap());
        assert!(config.set("probe.vpn", "false").unwrap());
        assert!(config.set("probe.vpn_processes", "openvpn, wireguard").unwrap());
        assert!(!config.set("color", "blue").unwrap());

        assert_eq!(config.policy, PolicySetting::Strict);
        assert!(!config.probe.vpn);
        assert_eq!(config.probe.vpn_processes, ["openvpn", "wireguard"]);
        assert!(config.set("simulator_boot_wait", "later").is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(PROJECT_CONFIG_FILE);

        let config = AppConfig {
            app_name: "Field Notes".to_string(),
            policy: PolicySetting::Interactive,
            ..Default::default()
        };
        let written = config.save(Some(&path)).unwrap();
        assert_eq!(written, path);

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.app_name, "Field Notes");
        assert_eq!(loaded.policy, PolicySetting::Interactive);
        assert_eq!(loaded.probe, ProbeConfig::default());
    }

    #[test]
    fn test_load_from_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "probe: [not, a, map]").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    fn test_flutter_binary_expands_tilde() {
        let config = AppConfig {
            flutter: "/usr/local/bin/flutter".to_string(),
            ..Default::default()
        };
        assert_eq!(config.flutter_binary(), "/usr/local/bin/flutter");

        let config = AppConfig {
            flutter: "~/fvm/default/bin/flutter".to_string(),
            ..Default::default()
        };
        assert!(!config.flutter_binary().starts_with('~') || std::env::var("HOME").is_err());
    }
}
