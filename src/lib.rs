//! leadmagnet - Guided Lead Magnet Generation
//!
//! Walks a user from campaign input to a finished, branded multi-section
//! document: concepts, an editable outline, a subscription gate, and final
//! generation, each stage driven by an injected content generator.
//!
//! ## Quick Start
//!
//! ```ignore
//! use leadmagnet::{GenerationPipeline, LlmContentGenerator, StaticEntitlements};
//!
//! let provider = create_provider(&config.llm.provider_config())?;
//! let mut pipeline = GenerationPipeline::new(
//!     Arc::new(LlmContentGenerator::new(provider)),
//!     Arc::new(StaticEntitlements::new(SubscriptionTier::Premium)),
//!     UserId::from("user-1"),
//! );
//! pipeline.submit(input).await?;
//! pipeline.select("concept-2", None).await?;
//! pipeline.approve().await?;
//! let document = pipeline.document();
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: Stage machine, entitlement gate, collaborator contracts
//! - [`document`]: Structured document model, customization merge, renderer
//! - [`ai`]: LLM-backed content generator and provider
//! - [`config`]: Layered configuration
//! - [`cli`]: Command handlers for the binary

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod document;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::{ErrorKind, LeadError, Result, ValidationError, ValidationErrorKind};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    CampaignInput, ContentGenerator, DocumentSink, EntitlementSource, GenerationPipeline,
    JsonFileSink, PipelineSession, PipelineState, StageKind, StaticEntitlements,
    SubscriptionTier, can_proceed,
};

// =============================================================================
// Document Re-exports
// =============================================================================

pub use document::{
    CustomizationOptions, RenderTheme, RenderedDocument, StructuredDocument, merge, render,
    render_document,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmContentGenerator, LlmProvider, create_provider, with_timeout};
