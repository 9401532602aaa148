//! Terminal output helpers.

use std::io::{stdin, stdout, IsTerminal};

use console::style;
use crossterm::terminal::disable_raw_mode;

use crate::error::DeployError;
use crate::select::Advisory;

const BANNER: &str = r#"
╔═══════════════════════════════╗
║  d e v i c e d r o p          ║
║  flutter → iPhone             ║
╚═══════════════════════════════╝
"#;

pub fn print_banner() {
    println!("{}", style(BANNER).cyan());
}

/// Both ends attached to a terminal, so prompting makes sense.
pub fn is_interactive() -> bool {
    stdin().is_terminal() && stdout().is_terminal()
}

/// Turn raw mode back off after a subprocess that had the terminal.
///
/// Nothing is written to stdout: devicedrop never switches screens, so the
/// cursor and the lines already printed stay where they are.
pub fn reset_terminal() {
    let _ = disable_raw_mode();
}

pub fn step(message: impl AsRef<str>) {
    println!("  {} {}", style("◐").cyan(), style(message.as_ref()).dim());
}

pub fn success(message: impl AsRef<str>) {
    println!("  {} {}", style("✓").green().bold(), message.as_ref());
}

pub fn warn(message: impl AsRef<str>) {
    println!("  {} {}", style("!").yellow().bold(), style(message.as_ref()).yellow());
}

pub fn note(message: impl AsRef<str>) {
    println!("    {}", style(message.as_ref()).dim());
}

pub fn numbered<S: AsRef<str>>(items: &[S]) {
    for (i, item) in items.iter().enumerate() {
        println!("    {} {}", style(format!("{}.", i + 1)).dim(), item.as_ref());
    }
}

/// Echo the raw device listing the way flutter printed it.
pub fn listing(raw: &str) {
    println!();
    for line in raw.lines() {
        println!("  {}", style(line).dim());
    }
    println!();
}

pub fn advisory(advisory: &Advisory) {
    match advisory {
        Advisory::VpnActive(signal) => {
            let reason = signal
                .map(|s| format!(" (found a {})", s))
                .unwrap_or_default();
            warn(format!(
                "VPN detected{}. It may interfere with wireless device connections.",
                reason
            ));
            note("USB connections work fine with a VPN.");
        }
        Advisory::VpnBlocksWireless => {
            warn("Only wireless devices are visible and a VPN is active.");
            numbered(&[
                "Disconnect the VPN temporarily and try again",
                "Connect your iPhone via USB cable (recommended with VPN)",
                "Add your local network to VPN split tunneling",
                "Use the iOS Simulator instead: devicedrop simulator",
            ]);
        }
    }
}

/// Render a failure with its remediation steps instead of a debug dump.
pub fn print_error(err: &DeployError) {
    if matches!(err, DeployError::Cancelled) {
        println!();
        println!("  {}", style("Cancelled.").dim());
        return;
    }

    eprintln!();
    eprintln!("  {} {}", style("✕").red().bold(), style(err).red());

    let steps = err.remediation();
    if !steps.is_empty() {
        eprintln!();
        for (i, item) in steps.iter().enumerate() {
            eprintln!("    {} {}", style(format!("{}.", i + 1)).dim(), item);
        }
    }
    eprintln!();
}
