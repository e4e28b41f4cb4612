//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/leadmagnet/config.toml)
//! 3. Project config (.leadmagnet/config.toml)
//! 4. Environment variables (LEADMAGNET_* prefix, `__` between sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{LeadError, Result};

const ENV_PREFIX: &str = "LEADMAGNET_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::resolve(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
            ENV_PREFIX,
        )
    }

    fn resolve(global: Option<&Path>, project: &Path, env_prefix: &str) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // LEADMAGNET_PIPELINE__CONCEPT_COUNT -> pipeline.concept_count
        figment = figment.merge(Env::prefixed(env_prefix).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| LeadError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| LeadError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/leadmagnet/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("leadmagnet"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".leadmagnet")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;
        println!("{}", Self::render_config(&config, as_json)?);
        Ok(())
    }

    fn render_config(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| LeadError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            LeadError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_config(&global_dir, force, GLOBAL_HEADER)?;
        Ok(global_dir)
    }

    /// Initialize project configuration in the current directory
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::init_project_in(Path::new("."), force)
    }

    /// Initialize project configuration under `base`
    pub fn init_project_in(base: &Path, force: bool) -> Result<PathBuf> {
        let project_dir = base.join(Self::project_dir());
        Self::write_config(&project_dir, force, PROJECT_HEADER)?;
        fs::create_dir_all(project_dir.join("campaigns"))?;
        Ok(project_dir)
    }

    fn write_config(dir: &Path, force: bool, header: &str) -> Result<()> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_text(header)?)?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }
        Ok(())
    }

    /// Default configuration rendered as commented TOML
    fn default_config_text(header: &str) -> Result<String> {
        let body = Self::render_config(&Config::default(), false)?;
        Ok(format!("{}\n{}", header, body))
    }
}

const GLOBAL_HEADER: &str = "\
# Lead Magnet Global Configuration
# User-wide defaults. Project settings in .leadmagnet/config.toml override these.
# The API key is read from OPENAI_API_KEY.
";

const PROJECT_HEADER: &str = "\
# Lead Magnet Project Configuration
# Project-specific settings that override global defaults.
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::IconSet;
    use crate::pipeline::SubscriptionTier;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::resolve(
            None,
            &temp_dir.path().join("missing.toml"),
            "LEADMAGNET_TEST_NONE_",
        )
        .unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.render.icons, IconSet::Emoji);
    }

    #[test]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(&global, "[llm]\nmodel = \"global-model\"\ntimeout_secs = 30\n").unwrap();
        fs::write(&project, "[llm]\nmodel = \"project-model\"\n").unwrap();

        let config =
            ConfigLoader::resolve(Some(&global), &project, "LEADMAGNET_TEST_LAYER_").unwrap();
        assert_eq!(config.llm.model, "project-model");
        assert_eq!(config.llm.timeout_secs, 30);
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: the variable names are unique to this test
        unsafe {
            std::env::set_var("LEADMAGNET_TEST_ENV_LLM__MODEL", "test-model");
            std::env::set_var("LEADMAGNET_TEST_ENV_ENTITLEMENT__DEFAULT_TIER", "premium");
        }
        let config = ConfigLoader::resolve(
            None,
            &temp_dir.path().join("missing.toml"),
            "LEADMAGNET_TEST_ENV_",
        )
        .unwrap();
        unsafe {
            std::env::remove_var("LEADMAGNET_TEST_ENV_LLM__MODEL");
            std::env::remove_var("LEADMAGNET_TEST_ENV_ENTITLEMENT__DEFAULT_TIER");
        }

        assert_eq!(config.llm.model, "test-model");
        assert_eq!(config.entitlement.default_tier, SubscriptionTier::Premium);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[pipeline]\nconcept_count = 0\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, LeadError::Config(_)));
    }

    #[test]
    fn test_init_project_writes_loadable_config() {
        let temp_dir = TempDir::new().unwrap();
        let dir = ConfigLoader::init_project_in(temp_dir.path(), false).unwrap();

        let path = dir.join("config.toml");
        assert!(path.exists());
        assert!(dir.join("campaigns").is_dir());
        assert!(fs::read_to_string(&path).unwrap().starts_with("# Lead Magnet"));

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.pipeline.concept_count, 3);
    }

    #[test]
    fn test_init_project_keeps_existing_unless_forced() {
        let temp_dir = TempDir::new().unwrap();
        let dir = ConfigLoader::init_project_in(temp_dir.path(), false).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "version = \"custom\"\n").unwrap();

        ConfigLoader::init_project_in(temp_dir.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

        ConfigLoader::init_project_in(temp_dir.path(), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[llm]"));
    }
}
