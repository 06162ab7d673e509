use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;

use super::{print_header, spinner};
use crate::config::WorkbenchConfig;

static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");
static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

const SAMPLE_DATA: &str = include_str!("../../../assets/sample.ttl");

pub async fn run(force: bool) -> Result<()> {
    print_header("Initialization");

    let config_dir = WorkbenchConfig::config_dir()?;
    let config_path = config_dir.join("config.toml");

    if config_path.exists() && !force {
        println!(
            "{}Configuration already exists at {}",
            WARN,
            style(config_path.display()).cyan()
        );
        println!("  Use {} to overwrite", style("--force").yellow());
        return Ok(());
    }

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    let spinner = spinner(&GEAR, "Creating configuration...");

    let sample_path = config_dir.join("sample.ttl");
    fs::write(&sample_path, SAMPLE_DATA).context("Failed to write sample dataset")?;

    let mut config = WorkbenchConfig::default();
    config.data.source = sample_path.display().to_string();
    config.save(&config_path)?;
    spinner.finish_and_clear();

    println!(
        "{}Created configuration at {}",
        CHECK,
        style(config_path.display()).cyan()
    );
    println!(
        "{}Created sample dataset at {}",
        CHECK,
        style(sample_path.display()).cyan()
    );

    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();
    println!("{}Next steps:", ROCKET);
    println!();
    println!("  Inspect the sample graph:");
    println!("    {} ontobench stats", style("$").dim());
    println!();
    println!("  Open it in the browser:");
    println!("    {} ontobench viz --layout radial", style("$").dim());
    println!();
    println!("  Query it locally:");
    println!(
        "    {} ontobench query --sample Applications --data {}",
        style("$").dim(),
        sample_path.display()
    );
    println!();

    Ok(())
}
