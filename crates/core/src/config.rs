use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::DEFAULT_PALETTE;
use crate::error::{GantryError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub palette: Vec<String>,
    pub row_width: usize,
    pub overview_width: usize,
    pub overview_height: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            row_width: 80,
            overview_width: 120,
            overview_height: 12,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    palette: Option<String>,
    row_width: Option<usize>,
    overview_width: Option<usize>,
    overview_height: Option<usize>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("GANTRY_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("gantry/config.toml")
}

fn load_file_overrides(path: &PathBuf) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| GantryError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| GantryError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    let parse_usize = |name: &str| -> Result<Option<usize>> {
        match env::var(name) {
            Ok(v) => Ok(Some(v.parse::<usize>().map_err(|e| {
                GantryError::Config(format!("bad {name} in environment: {e}"))
            })?)),
            Err(_) => Ok(None),
        }
    };

    Ok(ConfigOverrides {
        palette: env::var("GANTRY_PALETTE").ok(),
        row_width: parse_usize("GANTRY_ROW_WIDTH")?,
        overview_width: parse_usize("GANTRY_OVERVIEW_WIDTH")?,
        overview_height: parse_usize("GANTRY_OVERVIEW_HEIGHT")?,
    })
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.palette {
        cfg.palette = parse_palette(&v)
            .map_err(|e| GantryError::Config(format!("bad palette in {source}: {e} (value={v})")))?;
    }
    if let Some(v) = overrides.row_width {
        cfg.row_width = v;
    }
    if let Some(v) = overrides.overview_width {
        cfg.overview_width = v;
    }
    if let Some(v) = overrides.overview_height {
        cfg.overview_height = v;
    }
    Ok(())
}

fn parse_palette(raw: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in raw.split(',') {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        if crate::color::parse_hex_color(trimmed).is_none() {
            return Err(GantryError::Config(format!(
                "palette entries must be #rrggbb colors, got {trimmed}"
            )));
        }
        out.push(trimmed.to_string());
    }
    if out.is_empty() {
        return Err(GantryError::Config("palette cannot be empty".to_string()));
    }
    Ok(out)
}
