use anyhow::{Context, Result};
use colored::*;
use vt_broker::MetricsListing;

pub async fn run(api: &str) -> Result<()> {
    let url = format!("{}/metrics", api.trim_end_matches('/'));
    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("Failed to reach {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("List rooms call failed with {}", response.status());
    }

    let listing: MetricsListing = response
        .json()
        .await
        .context("Unexpected response from broker")?;

    if listing.rooms.is_empty() && listing.metrics.is_empty() {
        println!("{}", "No rooms open right now.".yellow());
        return Ok(());
    }

    println!("{}", "Rooms".bold());
    for room in &listing.rooms {
        println!("  {} ({} connected)", room.room_name.to_string().bold(), room.members);
    }

    if !listing.metrics.is_empty() {
        println!("{}", "Donor reports".bold());
        for report in &listing.metrics {
            println!(
                "  {} CPU: {} ∘ Memory: {} ∘ Disk: {}",
                report.room_name.to_string().bold(),
                report.available_cpu,
                report.available_memory,
                report.available_disk,
            );
        }
    }

    Ok(())
}
