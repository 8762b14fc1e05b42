//! The `chromaquiz init` command.

use std::path::Path;

use anyhow::{Context, Result};

use chromaquiz_core::config::{QuizConfig, LOCAL_CONFIG};

pub fn execute() -> Result<()> {
    let path = Path::new(LOCAL_CONFIG);
    if path.exists() {
        println!("{LOCAL_CONFIG} already exists, skipping.");
        return Ok(());
    }

    std::fs::write(path, QuizConfig::starter_toml())
        .with_context(|| format!("failed to write {LOCAL_CONFIG}"))?;
    println!("Created {LOCAL_CONFIG}");

    println!("\nNext steps:");
    println!("  1. Edit {LOCAL_CONFIG} to pick a difficulty and mode");
    println!("  2. Run: chromaquiz palette");
    println!("  3. Run: chromaquiz play");

    Ok(())
}
