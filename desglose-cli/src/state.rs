use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn desglose_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".desglose"))
}

/// `override_dir` (from `--home`) wins over `~/.desglose`.
pub fn resolve_home(override_dir: Option<&Path>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => desglose_home(),
    }
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))
}
