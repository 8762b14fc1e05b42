//! The `chromaquiz stats` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::{Cell, Table};

use chromaquiz_core::stats::PersistentStats;
use chromaquiz_core::traits::StatsStore;
use chromaquiz_store::open_stats_store;

use super::{resolve_config, Overrides};

pub async fn execute(overrides: Overrides, config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(overrides, config_path.as_deref())?;
    let store = open_stats_store(config.stats_file.as_deref())?;
    let stats = store
        .read()
        .await
        .with_context(|| format!("failed to read stats from {}", store.inner().path().display()))?;

    println!("{}", render(&stats));
    Ok(())
}

fn render(stats: &PersistentStats) -> Table {
    let last_played = stats
        .last_played
        .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut table = Table::new();
    table.set_header(vec!["Stat", "Value"]);
    table.add_row(vec![Cell::new("High score"), Cell::new(stats.high_score)]);
    table.add_row(vec![Cell::new("Answers"), Cell::new(stats.total_answers)]);
    table.add_row(vec![Cell::new("Correct"), Cell::new(stats.total_correct)]);
    table.add_row(vec![
        Cell::new("Accuracy"),
        Cell::new(format!("{}%", stats.lifetime_accuracy_pct())),
    ]);
    table.add_row(vec![Cell::new("Last played"), Cell::new(last_played)]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fresh_stats() {
        let out = render(&PersistentStats::default()).to_string();
        assert!(out.contains("High score"));
        assert!(out.contains("never"));
        assert!(out.contains("0%"));
    }

    #[test]
    fn renders_accuracy() {
        let stats = PersistentStats {
            high_score: 70,
            total_correct: 2,
            total_answers: 3,
            last_played: None,
        };
        let out = render(&stats).to_string();
        assert!(out.contains("70"));
        assert!(out.contains("67%"));
    }
}
