//! Player configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, GameSettings, Mode};

pub const ENV_DIFFICULTY: &str = "CHROMAQUIZ_DIFFICULTY";
pub const ENV_MODE: &str = "CHROMAQUIZ_MODE";
pub const ENV_SOUND: &str = "CHROMAQUIZ_SOUND";

/// Name of the config file looked up in the current directory.
pub const LOCAL_CONFIG: &str = "chromaquiz.toml";

/// Top-level chromaquiz configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_sound")]
    pub sound_enabled: bool,
    /// Where stats are kept. `${VAR}` references are expanded on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_file: Option<PathBuf>,
}

fn default_sound() -> bool {
    true
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            mode: Mode::default(),
            sound_enabled: default_sound(),
            stats_file: None,
        }
    }
}

impl QuizConfig {
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            difficulty: self.difficulty,
            mode: self.mode,
            sound_enabled: self.sound_enabled,
        }
    }

    /// Apply `CHROMAQUIZ_*` overrides found through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup(ENV_DIFFICULTY) {
            self.difficulty = v
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .with_context(|| format!("invalid {ENV_DIFFICULTY}"))?;
        }
        if let Some(v) = lookup(ENV_MODE) {
            self.mode = v
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .with_context(|| format!("invalid {ENV_MODE}"))?;
        }
        if let Some(v) = lookup(ENV_SOUND) {
            self.sound_enabled = parse_switch(&v)
                .with_context(|| format!("invalid {ENV_SOUND}: '{v}'"))?;
        }
        Ok(())
    }

    /// A commented starter file.
    pub fn starter_toml() -> &'static str {
        STARTER
    }
}

const STARTER: &str = r#"# chromaquiz configuration

# easy (6 colors, 3 options), medium (9 colors, 6 options), hard (12 colors, 6 options)
difficulty = "easy"

# normal: the word is a neutral word shown in the color
# trick: the word names a different color; answer the FONT color
mode = "normal"

sound_enabled = true

# stats_file = "${HOME}/.config/chromaquiz/stats.json"
"#;

fn parse_switch(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => anyhow::bail!("expected one of 1/0/true/false/on/off"),
    }
}

/// Expand `${VAR}` references; unset variables expand to nothing.
fn resolve_env_vars(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&lookup(&rest[start + 2..start + len]).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `chromaquiz.toml` in the current directory
/// 2. `~/.config/chromaquiz/config.toml`
///
/// Environment overrides: `CHROMAQUIZ_DIFFICULTY`, `CHROMAQUIZ_MODE`,
/// `CHROMAQUIZ_SOUND`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    load_config_with(path, |key: &str| std::env::var(key).ok())
}

/// [`load_config_from`] with environment lookups going through `env`.
pub fn load_config_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<QuizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(LOCAL_CONFIG);
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    config.apply_env(&env)?;
    config.stats_file = config
        .stats_file
        .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy(), &env)));

    Ok(config)
}

/// Parse a config file's contents.
pub fn parse_config(content: &str) -> Result<QuizConfig> {
    Ok(toml::from_str(content)?)
}

/// `~/.config/chromaquiz`, if `HOME` is set.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("chromaquiz"))
}
