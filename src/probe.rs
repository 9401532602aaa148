//! Best-effort environment checks.
//!
//! Nothing here returns an error: a command that is missing or fails just
//! means "no signal". The classifiers are plain functions over captured text.

use regex_lite::Regex;

use crate::config::ProbeConfig;
use crate::runner::CommandRunner;

/// Which heuristic reported the VPN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpnSignal {
    TunnelInterface,
    VpnProcess,
    ConnectedService,
}

impl std::fmt::Display for VpnSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TunnelInterface => write!(f, "tunnel network interface"),
            Self::VpnProcess => write!(f, "VPN client process"),
            Self::ConnectedService => write!(f, "connected VPN service"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub vpn_active: bool,
    pub signal: Option<VpnSignal>,
}

impl ProbeResult {
    pub fn detected(signal: VpnSignal) -> Self {
        Self {
            vpn_active: true,
            signal: Some(signal),
        }
    }
}

pub fn has_tunnel_interface(ifconfig: &str, interface: &str) -> bool {
    !interface.is_empty() && ifconfig.contains(interface)
}

pub fn matches_vpn_process(process_list: &str, pattern: &Regex) -> bool {
    process_list.lines().any(|line| pattern.is_match(line))
}

pub fn reports_connected_service(services: &str, marker: &str) -> bool {
    !marker.is_empty() && services.contains(marker)
}

pub fn lists_usb_iphone(usb_tree: &str) -> bool {
    usb_tree.contains("iPhone")
}

/// Stdout of a successful run, `None` for anything else.
async fn capture(runner: &dyn CommandRunner, program: &str, args: &[&str]) -> Option<String> {
    match runner.run(program, args).await {
        Ok(output) if output.success() => Some(output.stdout),
        Ok(output) => {
            tracing::debug!("{} exited with {:?}, treating as no signal", program, output.code);
            None
        }
        Err(e) => {
            tracing::debug!("{} unavailable ({}), treating as no signal", program, e);
            None
        }
    }
}

/// Check whether a VPN is likely up. The first heuristic that fires wins.
pub async fn probe_vpn(runner: &dyn CommandRunner, config: &ProbeConfig) -> ProbeResult {
    if !config.vpn {
        return ProbeResult::default();
    }

    if let Some(interfaces) = capture(runner, "ifconfig", &[]).await {
        if has_tunnel_interface(&interfaces, &config.tunnel_interface) {
            return found(VpnSignal::TunnelInterface);
        }
    }

    match config.process_regex() {
        Ok(Some(pattern)) => {
            if let Some(processes) = capture(runner, "ps", &["-A", "-o", "command="]).await {
                if matches_vpn_process(&processes, &pattern) {
                    return found(VpnSignal::VpnProcess);
                }
            }
        }
        Ok(None) => {}
        Err(e) => tracing::debug!("skipping process check, bad pattern: {}", e),
    }

    if let Some(services) = capture(runner, "scutil", &["--nc", "list"]).await {
        if reports_connected_service(&services, &config.connected_marker) {
            return found(VpnSignal::ConnectedService);
        }
    }

    ProbeResult::default()
}

fn found(signal: VpnSignal) -> ProbeResult {
    tracing::info!("VPN likely active ({})", signal);
    ProbeResult::detected(signal)
}

/// Whether an iPhone shows up on the USB bus, trusted or not.
pub async fn usb_iphone_attached(runner: &dyn CommandRunner) -> bool {
    capture(runner, "system_profiler", &["SPUSBDataType"])
        .await
        .map(|tree| lists_usb_iphone(&tree))
        .unwrap_or(false)
}
