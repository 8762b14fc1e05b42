//! Subcommands.

pub mod init;
pub mod palette;
pub mod play;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::Result;

use chromaquiz_core::config::{load_config_from, QuizConfig};
use chromaquiz_core::model::{Difficulty, Mode};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub difficulty: Option<Difficulty>,
    pub mode: Option<Mode>,
    pub no_sound: bool,
    pub stats_file: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(self, config: &mut QuizConfig) {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.no_sound {
            config.sound_enabled = false;
        }
        if self.stats_file.is_some() {
            config.stats_file = self.stats_file;
        }
    }
}

/// Load the config file (if any) and layer the flags on top.
pub fn resolve_config(overrides: Overrides, path: Option<&Path>) -> Result<QuizConfig> {
    let mut config = load_config_from(path)?;
    overrides.apply(&mut config);
    tracing::debug!(?config, "effective configuration");
    Ok(config)
}
