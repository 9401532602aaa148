use console::style;

use crate::config::AppConfig;
use crate::devices::{list_ios_devices, Inventory};
use crate::error::Result;
use crate::runner::ProcessRunner;

pub async fn execute(config: &AppConfig, json: bool) -> Result<()> {
    let runner = ProcessRunner::new();
    let listing = list_ios_devices(&runner, &config.flutter_binary()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing.inventory)?);
    } else {
        print_inventory(&listing.inventory);
    }

    Ok(())
}

fn print_inventory(inventory: &Inventory) {
    println!();
    if inventory.is_empty() {
        println!("  {}", style("No physical iPhones found.").dim());
    } else {
        println!(
            "  {:<32} {:<28} {:<8} {}",
            style("NAME").dim(),
            style("ID").dim(),
            style("PLATFORM").dim(),
            style("CONNECTION").dim()
        );
        for device in &inventory.devices {
            println!(
                "  {:<32} {:<28} {:<8} {}",
                style(&device.name).white().bold(),
                style(&device.id).cyan(),
                device.platform,
                device.connection
            );
        }
    }

    if inventory.has_simulators() {
        println!();
        println!(
            "  {}",
            style(format!(
                "{} simulator(s) hidden. Use `devicedrop simulator` to deploy there.",
                inventory.simulators_seen
            ))
            .dim()
        );
    }
    println!();
}
