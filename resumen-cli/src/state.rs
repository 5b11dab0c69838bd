use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn resumen_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".resumen"))
}

pub fn ensure_resumen_home() -> Result<PathBuf> {
    let dir = resumen_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_resumen_home()?.join("config.toml"))
}

pub fn rules_path() -> Result<PathBuf> {
    Ok(ensure_resumen_home()?.join("rules.toml"))
}
