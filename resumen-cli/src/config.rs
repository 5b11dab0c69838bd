use anyhow::{Context, Result};
use resumen_ingest::StatementRules;
use resumen_ingest::importer::DEFAULT_MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::render::OutputFormat;
use crate::state::{config_path, rules_path};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default for `parse --format`.
    pub output: OutputFormat,
    pub max_upload_bytes: usize,
    /// Rule set to use instead of `~/.resumen/rules.toml`.
    pub rules: Option<PathBuf>,
    /// Skip the content-stream pass unless `--raw-only` says otherwise.
    pub raw_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputFormat::Table,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            rules: None,
            raw_only: false,
        }
    }
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

/// Resolve the rule set: explicit path, then `config.rules`, then
/// `~/.resumen/rules.toml`, then the built-in defaults.
pub fn load_rules(explicit: Option<&Path>, cfg: &Config) -> Result<StatementRules> {
    let path = match explicit.or(cfg.rules.as_deref()) {
        Some(p) => p.to_path_buf(),
        None => {
            let p = rules_path()?;
            if !p.exists() {
                return Ok(StatementRules::default());
            }
            p
        }
    };
    read_rules(&path)
}

pub fn read_rules(path: &Path) -> Result<StatementRules> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse rules {}", path.display()))
}

pub fn init_rules() -> Result<()> {
    let p = rules_path()?;
    if p.exists() {
        println!("Rules already exist: {}", p.display());
        return Ok(());
    }
    let s = rules_to_toml(&StatementRules::default())?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn rules_to_toml(rules: &StatementRules) -> Result<String> {
    toml::to_string_pretty(rules).context("serialize rules")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: Config = toml::from_str("output = \"json\"\n").unwrap();
        assert_eq!(cfg.output, OutputFormat::Json);
        assert_eq!(cfg.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(cfg.rules.is_none());
        assert!(!cfg.raw_only);
    }

    #[test]
    fn test_default_rules_survive_toml() {
        let rules = StatementRules::default();
        let s = rules_to_toml(&rules).unwrap();
        let back: StatementRules = toml::from_str(&s).unwrap();
        assert_eq!(back, rules);
    }

    #[test]
    fn test_explicit_rules_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("custom.toml");
        fs::write(&p, "min_amount = 50.0\n").unwrap();

        let cfg = Config {
            rules: Some(dir.path().join("missing.toml")),
            ..Config::default()
        };
        let rules = load_rules(Some(&p), &cfg).unwrap();
        assert_eq!(rules.min_amount, 50.0);
        assert_eq!(rules.min_line_chars, 10);

        assert!(load_rules(None, &cfg).is_err());
    }
}
