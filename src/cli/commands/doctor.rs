//! Environment report: toolchain, VPN, USB, devices.

use console::style;

use crate::config::AppConfig;
use crate::devices::list_ios_devices;
use crate::error::Result;
use crate::probe::{probe_vpn, usb_iphone_attached};
use crate::runner::{CommandRunner, ProcessRunner};
use crate::ui;

fn row(label: &str, ok: bool, detail: impl std::fmt::Display) {
    let mark = if ok {
        style("✓").green().bold()
    } else {
        style("!").yellow().bold()
    };
    println!("  {} {:<14} {}", mark, label, detail);
}

pub async fn execute(config: &AppConfig) -> Result<()> {
    let runner = ProcessRunner::new();
    let flutter = config.flutter_binary();

    println!();
    println!("{}", style("devicedrop doctor").bold().cyan());
    println!();

    let flutter_path = which::which(&flutter).ok();
    match &flutter_path {
        Some(path) => row("Flutter", true, style(path.display()).dim()),
        None => row("Flutter", false, style(format!("'{}' not found in PATH", flutter)).red()),
    }

    if flutter_path.is_some() {
        if let Ok(output) = runner.run(&flutter, &["--version"]).await {
            if let Some(first) = output.stdout.lines().next() {
                println!("    {}", style(first).dim());
            }
        }
    }

    let probe = probe_vpn(&runner, &config.probe).await;
    match (config.probe.vpn, probe.signal) {
        (false, _) => row("VPN", true, style("check disabled").dim()),
        (true, None) => row("VPN", true, style("none detected").dim()),
        (true, Some(signal)) => row(
            "VPN",
            false,
            format!("likely active ({}), wireless installs may fail", signal),
        ),
    }

    let usb = usb_iphone_attached(&runner).await;
    row(
        "USB iPhone",
        usb,
        if usb {
            style("attached").dim()
        } else {
            style("none on the USB bus").dim()
        },
    );

    if flutter_path.is_some() {
        match list_ios_devices(&runner, &flutter).await {
            Ok(listing) => {
                let inventory = listing.inventory;
                row(
                    "Devices",
                    !inventory.is_empty(),
                    format!(
                        "{} physical ({} wireless), {} simulator(s)",
                        inventory.len(),
                        inventory.wireless().count(),
                        inventory.simulators_seen
                    ),
                );
                if inventory.is_empty() && usb {
                    ui::note("An iPhone is attached but flutter can't see it. Has it trusted this Mac?");
                }
            }
            Err(e) => row("Devices", false, style(e).red()),
        }
    }

    let policy = config.policy.resolve(ui::is_interactive());
    row("Policy", true, format!("{} (resolves to {:?} here)", config.policy, policy));
    println!();

    Ok(())
}
