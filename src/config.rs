//! rc file settings
//!
//! `~/.sitecal/rc` is a plain `key=value` file. Blank lines and lines
//! starting with `#` are skipped, unknown keys are ignored, and a value that
//! does not parse keeps the default.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::recurrence::DEFAULT_MAX_ITERATIONS;

pub const DEFAULT_DAYS_BEFORE: i64 = 31;
pub const DEFAULT_DAYS_AFTER: i64 = 92;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database file; `None` means the default under the config directory
    pub data_location: Option<PathBuf>,
    /// Days before today shown by `calendar` without `--from`
    pub days_before: i64,
    /// Days after today shown by `calendar` without `--to`
    pub days_after: i64,
    /// Expansion safety bound
    pub max_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_location: None,
            days_before: DEFAULT_DAYS_BEFORE,
            days_after: DEFAULT_DAYS_AFTER,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Config {
    /// Directory holding the rc file and the default database
    pub fn dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(home.join(".sitecal"))
    }

    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("rc"))
    }

    /// Load the rc file, or defaults when there is none
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Ok(Self::parse(&content, path.parent()))
    }

    /// Parse rc content. Relative `data.location` paths resolve against
    /// `base_dir` when one is given.
    pub fn parse(content: &str, base_dir: Option<&Path>) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "data.location" if !value.is_empty() => {
                    let path = PathBuf::from(value);
                    config.data_location = Some(match base_dir {
                        Some(dir) if path.is_relative() => dir.join(path),
                        _ => path,
                    });
                }
                "calendar.days_before" => {
                    if let Some(n) = parse_non_negative(value) {
                        config.days_before = n;
                    }
                }
                "calendar.days_after" => {
                    if let Some(n) = parse_non_negative(value) {
                        config.days_after = n;
                    }
                }
                "calendar.max_iterations" => match value.parse::<usize>() {
                    Ok(n) if n > 0 => config.max_iterations = n,
                    _ => log::warn!("Ignoring invalid calendar.max_iterations: {}", value),
                },
                _ => {}
            }
        }

        config
    }
}

fn parse_non_negative(value: &str) -> Option<i64> {
    match value.parse::<i64>() {
        Ok(n) if n >= 0 => Some(n),
        _ => {
            log::warn!("Ignoring invalid day count in config: {}", value);
            None
        }
    }
}
