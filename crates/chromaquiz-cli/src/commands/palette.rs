//! The `chromaquiz palette` command.

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Color as CellColor, Table};

use chromaquiz_core::model::Difficulty;
use chromaquiz_core::palette::{option_count_for, palette_for};

pub fn execute(difficulty: Option<Difficulty>) -> Result<()> {
    let tiers = match difficulty {
        Some(tier) => vec![tier],
        None => Difficulty::ALL.to_vec(),
    };

    for tier in tiers {
        let colors = palette_for(tier);
        println!(
            "{} ({} colors, {} options per round)",
            tier.to_string().bold(),
            colors.len(),
            option_count_for(tier)
        );

        let mut table = Table::new();
        table.set_header(vec!["Name", "Hex", "Swatch"]);
        for color in colors {
            let mut swatch = Cell::new("██████");
            if let Some((r, g, b)) = color.rgb() {
                swatch = swatch.fg(CellColor::Rgb { r, g, b });
            }
            table.add_row(vec![Cell::new(color.name), Cell::new(color.hex), swatch]);
        }
        println!("{table}\n");
    }

    Ok(())
}
