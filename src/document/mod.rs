//! Structured Documents
//!
//! The data shape produced by the generation pipeline and everything that
//! consumes it without holding state between calls:
//!
//! - [`model`]: typed document and closed `Section` variant set
//! - [`customize`]: branding/CTA validation and merging
//! - [`theme`]: colors, font, icon set
//! - [`render`]: layout, theming, pagination, export

pub mod customize;
pub mod model;
pub mod render;
pub mod theme;

pub use customize::{CustomizationOptions, merge};
pub use model::{
    Branding, CallToAction, ChecklistPhase, ComparisonItem, Introduction, ScriptScenario, Section,
    SectionKind, StructuredDocument, TitlePage,
};
pub use render::{
    BlockContent, BlockRegion, Page, PageLayout, RenderBlock, RenderedDocument, render,
    render_document,
};
pub use theme::{BlockStyle, IconSet, RenderTheme};
