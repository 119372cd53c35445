//! Store and stage-runner configuration (`test-structure.toml`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Configuration shared by [`TestDataStore`](crate::io::store::TestDataStore)
/// and [`StageRunner`](crate::stage::StageRunner).
///
/// Missing fields default to the conventional layout: records under
/// `<dir>/.test-data/` and overrides named `SKIP_<stage>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StructureConfig {
    /// Subdirectory of the working directory that holds records.
    pub data_dir: String,

    /// Prefix of the per-stage override variables.
    pub skip_prefix: String,

    /// Pretty-print persisted JSON.
    pub pretty: bool,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            data_dir: ".test-data".to_string(),
            skip_prefix: "SKIP_".to_string(),
            pretty: true,
        }
    }
}

impl StructureConfig {
    pub fn validate(&self) -> Result<()> {
        let data_dir = self.data_dir.trim();
        if data_dir.is_empty() {
            return Err(anyhow!("data_dir must not be empty"));
        }
        if data_dir == "." || data_dir == ".." || data_dir.contains(['/', '\\']) {
            return Err(anyhow!(
                "data_dir must be a single directory name (got '{}')",
                self.data_dir
            ));
        }
        if self.skip_prefix.trim().is_empty() {
            return Err(anyhow!("skip_prefix must not be empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `StructureConfig::default()`.
pub fn load_config(path: &Path) -> Result<StructureConfig> {
    if !path.exists() {
        let cfg = StructureConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read test-structure config {}", path.display()))?;
    let cfg: StructureConfig =
        toml::from_str(&contents)
            .with_context(|| format!("parse test-structure config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &StructureConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize test-structure config")?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("test-structure config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create config directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp test-structure config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace test-structure config {}", path.display()))?;
    Ok(())
}
