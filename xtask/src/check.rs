use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, OnFailure};

/// Cross-target the device uses.
const DEVICE_TARGET: &str = "thumbv7em-none-eabihf";

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    cargo(
        "Checking device build",
        &["check", "-p", "firmware", "--target", DEVICE_TARGET, "--features", "hardware"],
        OnFailure::Abort,
    )?;
    cargo(
        "Checking device build (PDM sink)",
        &[
            "check",
            "-p",
            "firmware",
            "--target",
            DEVICE_TARGET,
            "--features",
            "hardware,pdm-sink",
        ],
        OnFailure::Abort,
    )?;
    cargo(
        "Checking emulator build",
        &["check", "-p", "firmware", "--features", "emulator"],
        OnFailure::Abort,
    )?;
    for krate in ["platform", "playback", "ui"] {
        cargo(
            &format!("Checking {krate} (no_std)"),
            &["check", "-p", krate, "--target", DEVICE_TARGET, "--no-default-features"],
            OnFailure::Abort,
        )?;
    }
    cargo(
        "Running clippy",
        &["clippy", "--workspace", "--all-targets", "--features", "firmware/emulator", "--", "-D", "warnings"],
        OnFailure::Warn,
    )?;
    if cargo("Checking formatting", &["fmt", "--all", "--check"], OnFailure::Warn)?.is_none() {
        eprintln!("     Run 'cargo fmt --all' to fix");
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
