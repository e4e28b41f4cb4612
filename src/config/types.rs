//! Configuration Types
//!
//! All configuration structures with defaults. Every section is optional in
//! config files; missing keys fall back to these defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ai::ProviderConfig;
use crate::constants::{network as net_constants, pipeline as pipeline_constants};
use crate::constants::{branding as branding_constants, render as render_constants};
use crate::document::{CustomizationOptions, IconSet, PageLayout, RenderTheme};
use crate::pipeline::{PipelineConfig, SubscriptionTier};
use crate::types::{LeadError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub branding: BrandingConfig,
    pub render: RenderConfig,
    pub entitlement: EntitlementConfig,
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            pipeline: PipelineConfig::default(),
            branding: BrandingConfig::default(),
            render: RenderConfig::default(),
            entitlement: EntitlementConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(LeadError::Config(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(LeadError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        let range = pipeline_constants::MIN_CONCEPT_COUNT..=pipeline_constants::MAX_CONCEPT_COUNT;
        if !range.contains(&self.pipeline.concept_count) {
            return Err(LeadError::Config(format!(
                "pipeline.concept_count must be between {} and {}, got {}",
                range.start(),
                range.end(),
                self.pipeline.concept_count
            )));
        }

        if self.render.max_blocks_per_page == 0 {
            return Err(LeadError::Config(
                "render.max_blocks_per_page must be greater than 0".to_string(),
            ));
        }

        self.branding
            .to_options()
            .validate()
            .map_err(|e| LeadError::Config(format!("branding: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name
    pub provider: String,

    pub model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    /// Any OpenAI-compatible endpoint
    pub api_base: Option<String>,

    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: net_constants::DEFAULT_MODEL.to_string(),
            timeout_secs: net_constants::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            api_base: None,
            max_tokens: 4096,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Provider settings; the API key comes from the environment
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: Some(self.model.clone()),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: None,
            api_base: self.api_base.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// Branding Configuration
// =============================================================================

/// House branding used when a run is not customized
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: String,
    pub website_url: Option<String>,
    pub support_email: Option<String>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            primary_color: branding_constants::DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: branding_constants::DEFAULT_SECONDARY_COLOR.to_string(),
            font_family: branding_constants::DEFAULT_FONT_FAMILY.to_string(),
            website_url: None,
            support_email: None,
        }
    }
}

impl BrandingConfig {
    /// Customization options seeded from the configured branding
    pub fn to_options(&self) -> CustomizationOptions {
        CustomizationOptions {
            website_url: self.website_url.clone(),
            support_email: self.support_email.clone(),
            primary_color: self.primary_color.clone(),
            secondary_color: self.secondary_color.clone(),
            font_family: self.font_family.clone(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Render Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Blocks per page before a section overflows
    pub max_blocks_per_page: usize,
    pub icons: IconSet,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_blocks_per_page: render_constants::DEFAULT_MAX_BLOCKS_PER_PAGE,
            icons: IconSet::default(),
        }
    }
}

impl RenderConfig {
    pub fn page_layout(&self) -> PageLayout {
        PageLayout {
            max_blocks_per_page: self.max_blocks_per_page,
        }
    }

    /// Fallback theme for unbranded documents
    pub fn theme(&self, branding: &BrandingConfig) -> RenderTheme {
        RenderTheme::from_options(&branding.to_options(), self.icons)
    }
}

// =============================================================================
// Entitlement & Storage
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EntitlementConfig {
    /// Tier reported for every user by the built-in static source
    pub default_tier: SubscriptionTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for persisted campaign documents
    pub campaigns_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            campaigns_dir: PathBuf::from(".leadmagnet/campaigns"),
        }
    }
}
