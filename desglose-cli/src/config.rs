use anyhow::{Context, Result, bail};
use desglose_core::{
    BatchSettings, DEFAULT_FAILURE_MESSAGE, DEFAULT_REDIRECT_DELAY, SimulationSettings,
};
use desglose_finance::CategoryRules;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::ensure_dir;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upload: UploadSection,
    pub pacing: PacingSection,
    pub simulation: SimulationSection,
    /// Merchant keyword -> category label, checked before the built-in rules.
    pub categories: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSection {
    pub max_file_mb: u64,
    /// Accepted extensions, lower-case, without the dot.
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSection {
    /// Pause before each simulated progress tick.
    pub tick_ms: u64,
    /// Simulated progress increment, in percent.
    pub step: u8,
    /// Pause after each file resolves.
    pub settle_ms: u64,
    /// Pause between batch completion and the report.
    pub redirect_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub failure_rate: f64,
    pub failure_message: String,
}

impl Default for UploadSection {
    fn default() -> Self {
        Self {
            max_file_mb: 10,
            extensions: vec!["pdf".to_string(), "txt".to_string()],
        }
    }
}

impl Default for PacingSection {
    fn default() -> Self {
        Self {
            tick_ms: 150,
            step: 10,
            settle_ms: 200,
            redirect_ms: DEFAULT_REDIRECT_DELAY.as_millis() as u64,
        }
    }
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            failure_rate: 0.1,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.upload.max_file_mb == 0 {
            bail!("upload.max_file_mb must be greater than 0");
        }
        if self.upload.extensions.is_empty() {
            bail!("upload.extensions must list at least one extension");
        }
        self.simulation_settings()
            .validate()
            .context("invalid [simulation]/[pacing] settings")?;
        Ok(())
    }

    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            settle_delay: Duration::from_millis(self.pacing.settle_ms),
        }
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            tick_interval: Duration::from_millis(self.pacing.tick_ms),
            step: self.pacing.step,
            failure_rate: self.simulation.failure_rate,
            failure_message: self.simulation.failure_message.clone(),
        }
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.pacing.redirect_ms)
    }

    pub fn category_rules(&self) -> CategoryRules {
        CategoryRules::with_overrides(self.categories.clone())
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.upload.max_file_mb.saturating_mul(1024 * 1024)
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn load_config(home: &Path) -> Result<Config> {
    let p = config_path(home);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config(home: &Path, cfg: &Config) -> Result<PathBuf> {
    ensure_dir(home)?;
    let p = config_path(home);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config(home: &Path) -> Result<()> {
    let p = config_path(home);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(home, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.max_file_bytes(), 10 * 1024 * 1024);
        assert_eq!(cfg.redirect_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            "[simulation]\nfailure_rate = 0.5\n\n[categories]\nFARMACIA = \"Salud\"\n",
        )
        .unwrap();

        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.simulation.failure_rate, 0.5);
        assert_eq!(cfg.pacing.tick_ms, 150);
        assert_eq!(cfg.category_rules().categorize("FARMACIA"), "Salud");
    }

    #[test]
    fn test_round_trip_through_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.upload.max_file_mb = 25;
        save_config(dir.path(), &cfg).unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn test_huge_size_limit_saturates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            format!("[upload]\nmax_file_mb = {}\n", i64::MAX),
        )
        .unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.max_file_bytes(), u64::MAX);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(config_path(dir.path()), "[simulation]\nfailure_rate = 2.0\n").unwrap();
        assert!(load_config(dir.path()).is_err());

        fs::write(config_path(dir.path()), "[pacing]\nstep = 0\n").unwrap();
        assert!(load_config(dir.path()).is_err());
    }
}
