//! Grading configuration for cohortgrade
//!
//! Configuration is read from TOML. Resolution order: an explicit path, then
//! `cohortgrade.toml` in the working directory, then the global file under the
//! user config directory, then built-in defaults.

pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bail_invalid;
use crate::error::{GradeError, Result};

pub use types::{
    CategoryConfig, CategoryMode, CategoryRule, DiscoveryConfig, GradingConfig, GradingPolicy,
    PolicyConfig, RankStrategy, RarityConfig, CONFIG_FORMAT_VERSION, DEFAULT_CATEGORY_LABEL,
    DEFAULT_RARITY_BONUS, DEFAULT_RARITY_THRESHOLD, DEFAULT_WINDOW_SIZE,
};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "cohortgrade.toml";

const CONFIG_DIR: &str = "cohortgrade";
const GLOBAL_CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV_VAR: &str = "COHORTGRADE_CONFIG_DIR";

impl GradingConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GradeError::Other(format!(
                "failed to read config from {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: GradingConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GradeError::Other(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn resolve(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(GradeError::not_found("config file", path.display()));
            }
            debug!(path = %path.display(), "config_explicit");
            return Self::load(path);
        }

        let local = working_dir.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            debug!(path = %local.display(), "config_local");
            return Self::load(&local);
        }

        if let Some(global) = global_config_path() {
            if global.is_file() {
                debug!(path = %global.display(), "config_global");
                return Self::load(&global);
            }
        }

        debug!("config_defaults");
        Ok(Self::default())
    }

    /// Reject policy constants the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let threshold = self.rarity.threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            bail_invalid!("rarity threshold (expected 0.0-1.0)", threshold);
        }

        let bonus = self.rarity.bonus;
        if !bonus.is_finite() || bonus < 0.0 {
            bail_invalid!("rarity bonus (expected a non-negative number)", bonus);
        }

        if self.discovery.window_size < 1 {
            bail_invalid!("window size (expected at least 1)", self.discovery.window_size);
        }

        if self.categories.default_label.trim().is_empty() {
            bail_invalid!("default category label", "empty");
        }

        for rule in &self.categories.rules {
            if rule.name.trim().is_empty() {
                bail_invalid!("category rule name", "empty");
            }
        }

        Ok(())
    }
}

/// Location of the global config file, if a config directory can be found
pub fn global_config_path() -> Option<PathBuf> {
    let config_dir = if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
        PathBuf::from(env_dir)
    } else {
        dirs::config_dir()?.join(CONFIG_DIR)
    };

    Some(config_dir.join(GLOBAL_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = GradingConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert_eq!(config.rarity.threshold, 0.15);
        assert_eq!(config.rarity.bonus, 1.0);
        assert_eq!(config.discovery.window_size, 3);
        assert_eq!(config.grading.policy, GradingPolicy::Curve);
        assert_eq!(config.grading.rank, RankStrategy::Shared);
        assert_eq!(config.categories.default_label, "Uncategorized");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cohortgrade.toml");

        let mut config = GradingConfig::default();
        config.rarity.threshold = 0.2;
        config.grading.rank = RankStrategy::Positional;
        config.categories.rules.push(CategoryRule {
            name: "Accessibility".to_string(),
            keywords: vec!["aria".to_string(), "a11y".to_string()],
        });
        config.save(&path).unwrap();

        let loaded = GradingConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cohortgrade.toml");
        fs::write(&path, "[grading]\npolicy = \"additive\"\n").unwrap();

        let loaded = GradingConfig::load(&path).unwrap();
        assert_eq!(loaded.grading.policy, GradingPolicy::Additive);
        assert_eq!(loaded.rarity.threshold, DEFAULT_RARITY_THRESHOLD);
        assert_eq!(loaded.discovery.window_size, DEFAULT_WINDOW_SIZE);
    }

    #[test]
    fn test_dense_is_alias_for_shared() {
        let config: GradingConfig = toml::from_str("[grading]\nrank = \"dense\"\n").unwrap();
        assert_eq!(config.grading.rank, RankStrategy::Shared);
    }

    #[test]
    fn test_validate_rejects_bad_constants() {
        let mut config = GradingConfig::default();
        config.rarity.threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(GradeError::InvalidValue { .. })
        ));

        let mut config = GradingConfig::default();
        config.rarity.bonus = -1.0;
        assert!(config.validate().is_err());

        let mut config = GradingConfig::default();
        config.discovery.window_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cohortgrade.toml");
        fs::write(&path, "[discovery]\nwindow_size = 0\n").unwrap();
        assert!(GradingConfig::load(&path).is_err());
    }

    #[test]
    fn test_resolve_prefers_local_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(LOCAL_CONFIG_FILE),
            "[rarity]\nthreshold = 0.3\n",
        )
        .unwrap();

        let config = GradingConfig::resolve(None, dir.path()).unwrap();
        assert_eq!(config.rarity.threshold, 0.3);
    }

    #[test]
    fn test_resolve_missing_explicit_path_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = GradingConfig::resolve(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, GradeError::NotFound { .. }));
    }
}
