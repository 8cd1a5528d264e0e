use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, test_summary, OnFailure};

/// Host tests need the mocks and simulated stages.
const HOST_FEATURES: &[&str] = &["--features", "firmware/std"];

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();

    if !integration_only {
        let mut args = vec!["test", "--lib", "--workspace"];
        args.extend_from_slice(HOST_FEATURES);
        if let Some(output) = cargo("Unit tests", &args, OnFailure::Abort)? {
            println!("    {}", test_summary(&output));
        }
    }

    if !unit_only {
        let mut args = vec!["test", "--tests", "--workspace"];
        args.extend_from_slice(HOST_FEATURES);
        if let Some(output) = cargo("Integration and property tests", &args, OnFailure::Abort)? {
            println!("    {}", test_summary(&output));
        }
    }

    let mut args = vec!["test", "--doc", "--workspace"];
    args.extend_from_slice(HOST_FEATURES);
    cargo("Doc tests", &args, OnFailure::Warn)?;

    println!(
        "{}",
        format!(
            "✓ All tests completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
