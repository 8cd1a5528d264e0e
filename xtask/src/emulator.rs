use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;

pub fn run(station: Option<usize>, fail_every: Option<u32>, release: bool) -> Result<()> {
    println!();
    println!("{}", "📻 Starting emulator...".cyan().bold());
    println!("{}", "   + - volume   > < station   m mute   n p r   q quit".dimmed());
    println!();

    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-p", "firmware", "--bin", "emulator", "--features", "emulator"]);
    if release {
        cmd.arg("--release");
    }
    cmd.arg("--");
    if let Some(index) = station {
        cmd.args(["--station", &index.to_string()]);
    }
    if let Some(n) = fail_every {
        cmd.args(["--fail-every", &n.to_string()]);
    }

    let status = cmd.status().context("Failed to run emulator")?;
    if !status.success() {
        anyhow::bail!("Emulator exited with {status}");
    }
    Ok(())
}
