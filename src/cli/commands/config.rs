use console::style;

use crate::config::{AppConfig, SETTABLE_KEYS};
use crate::error::Result;

pub async fn show() -> Result<()> {
    let config = AppConfig::load()?;

    println!("{}", style("Current Configuration").bold().cyan());
    println!();
    println!("  App name:      {}", style(&config.app_name).white());
    println!("  Flutter:       {}", style(&config.flutter).white());
    println!("  Policy:        {}", style(config.policy).yellow());
    println!("  Boot wait:     {}", style(&config.simulator_boot_wait).white());
    println!(
        "  VPN probe:     {}",
        if config.probe.vpn {
            style("enabled").green()
        } else {
            style("disabled").dim()
        }
    );
    println!("  Tunnel iface:  {}", style(&config.probe.tunnel_interface).dim());
    println!(
        "  VPN processes: {}",
        style(config.probe.vpn_processes.join(", ")).dim()
    );
    println!();

    match AppConfig::locate()? {
        Some(path) => println!("Config file: {}", style(path.display()).dim()),
        None => println!("{}", style("No config file, using defaults.").dim()),
    }

    Ok(())
}

pub async fn set(key: &str, value: &str) -> Result<()> {
    let location = AppConfig::locate()?;
    let mut config = match &location {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::default(),
    };

    if !config.set(key, value)? {
        println!(
            "{} Unknown config key: {}",
            style("!").yellow().bold(),
            style(key).red()
        );
        println!("\nAvailable keys:");
        println!("  {}", SETTABLE_KEYS.join(", "));
        return Ok(());
    }

    let path = config.save(location.as_deref())?;

    println!(
        "{} Set {} = {}",
        style("✓").green().bold(),
        style(key).cyan(),
        style(value).white()
    );
    println!("  {}", style(path.display()).dim());

    Ok(())
}

pub async fn path() -> Result<()> {
    match AppConfig::locate()? {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", AppConfig::config_path()?.display()),
    }
    Ok(())
}
