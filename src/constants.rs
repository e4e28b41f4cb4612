//! Global Constants
//!
//! Centralized defaults for the pipeline, branding, and rendering.

/// Pipeline constants
pub mod pipeline {
    /// Number of concepts requested per run
    pub const DEFAULT_CONCEPT_COUNT: usize = 3;

    /// Lower/upper bounds accepted for `pipeline.concept_count`
    pub const MIN_CONCEPT_COUNT: usize = 1;
    pub const MAX_CONCEPT_COUNT: usize = 10;
}

/// Branding defaults applied when the user skips customization
pub mod branding {
    pub const DEFAULT_PRIMARY_COLOR: &str = "#1E3A8A";
    pub const DEFAULT_SECONDARY_COLOR: &str = "#F59E0B";
    pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";
}

/// Rendering constants
pub mod render {
    /// Content blocks per page before a section overflows to the next page
    pub const DEFAULT_MAX_BLOCKS_PER_PAGE: usize = 6;
}

/// Network constants
pub mod network {
    /// Default request timeout for content generation (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Default OpenAI-compatible endpoint
    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

    /// Default model
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
}
