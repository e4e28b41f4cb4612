//! Document Renderer
//!
//! Turns a [`StructuredDocument`] into an ordered list of themed blocks and
//! groups them into pages.
//!
//! ## Stages
//!
//! ```text
//! StructuredDocument → strip empty content → layout (per Section variant)
//!                    → apply theme → paginate → RenderedDocument
//! ```
//!
//! Rendering holds no state and never mutates the document. The same
//! document and theme always produce byte-identical output, so preview and
//! final export can render independently.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::model::{Introduction, Section, SectionKind, StructuredDocument};
use super::theme::{BlockStyle, IconRole, RenderTheme, StyleRole};
use crate::constants::render as render_constants;
use crate::types::split_paragraphs;

// =============================================================================
// Blocks
// =============================================================================

/// Part of the document a block was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "camelCase")]
pub enum BlockRegion {
    TitlePage,
    Introduction,
    /// Index among the sections that survived empty-content filtering
    Section(usize),
    CallToAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BlockContent {
    Title {
        title: String,
        subtitle: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        logo_data_uri: Option<String>,
    },
    Paragraph {
        text: String,
    },
    Bullets {
        items: Vec<String>,
    },
    SectionHeading {
        title: String,
        kind: SectionKind,
    },
    Comparison {
        label: String,
        pros: String,
        cons: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    Checklist {
        phase_title: String,
        lines: Vec<String>,
    },
    Script {
        trigger: String,
        response: String,
        rationale: String,
    },
    CallToAction {
        title: String,
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action_label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action_url: Option<String>,
    },
}

impl BlockContent {
    fn style(&self, theme: &RenderTheme) -> BlockStyle {
        match self {
            Self::Comparison { .. } => {
                theme.paired_style(StyleRole::Highlight, IconRole::Pros, IconRole::Cons)
            }
            _ => {
                let (role, icon) = self.style_role();
                theme.style(role, icon)
            }
        }
    }

    fn style_role(&self) -> (StyleRole, Option<IconRole>) {
        match self {
            Self::Title { .. } => (StyleRole::Title, None),
            Self::Paragraph { .. } | Self::Bullets { .. } => (StyleRole::Body, None),
            Self::SectionHeading { kind, .. } => {
                (StyleRole::Heading, Some(IconRole::Section(*kind)))
            }
            Self::Comparison { .. } => (StyleRole::Highlight, None),
            Self::Checklist { .. } => (StyleRole::Body, Some(IconRole::CheckItem)),
            Self::Script { .. } => (StyleRole::Highlight, Some(IconRole::Note)),
            Self::CallToAction { .. } => (StyleRole::CallToAction, Some(IconRole::CallToAction)),
        }
    }
}

/// Block before theme application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutBlock {
    pub region: BlockRegion,
    pub content: BlockContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBlock {
    pub region: BlockRegion,
    pub content: BlockContent,
    pub style: BlockStyle,
}

// =============================================================================
// Layout
// =============================================================================

/// Lay out document content without styling.
pub fn layout(document: &StructuredDocument) -> Vec<LayoutBlock> {
    let document = document.without_empty_content();
    let mut blocks = Vec::new();

    blocks.push(LayoutBlock {
        region: BlockRegion::TitlePage,
        content: BlockContent::Title {
            title: document.title_page.title.trim().to_string(),
            subtitle: document.title_page.subtitle.trim().to_string(),
            logo_data_uri: document
                .branding
                .as_ref()
                .and_then(|b| b.logo_data_uri.clone()),
        },
    });

    match &document.introduction {
        Introduction::Text(text) => {
            for text in split_paragraphs(text) {
                blocks.push(LayoutBlock {
                    region: BlockRegion::Introduction,
                    content: BlockContent::Paragraph { text },
                });
            }
        }
        Introduction::Points(points) if !points.is_empty() => blocks.push(LayoutBlock {
            region: BlockRegion::Introduction,
            content: BlockContent::Bullets {
                items: points.clone(),
            },
        }),
        Introduction::Points(_) => {}
    }

    for (index, section) in document.sections.iter().enumerate() {
        let region = BlockRegion::Section(index);
        blocks.push(LayoutBlock {
            region,
            content: BlockContent::SectionHeading {
                title: section.title().to_string(),
                kind: section.kind(),
            },
        });
        blocks.extend(
            section_blocks(section)
                .into_iter()
                .map(|content| LayoutBlock { region, content }),
        );
    }

    let cta = &document.call_to_action;
    blocks.push(LayoutBlock {
        region: BlockRegion::CallToAction,
        content: BlockContent::CallToAction {
            title: cta.title.trim().to_string(),
            body: cta.body.trim().to_string(),
            action_label: cta.action_label.clone(),
            action_url: cta.action_url.clone(),
        },
    });

    blocks
}

fn section_blocks(section: &Section) -> Vec<BlockContent> {
    match section {
        Section::Comparison { items, .. } => items
            .iter()
            .map(|item| BlockContent::Comparison {
                label: item.label.trim().to_string(),
                pros: item.pros.trim().to_string(),
                cons: item.cons.trim().to_string(),
                note: item
                    .note
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from),
            })
            .collect(),
        Section::PhasedChecklist { phases, .. } => phases
            .iter()
            .map(|phase| BlockContent::Checklist {
                phase_title: phase.phase_title.clone(),
                lines: phase.items.clone(),
            })
            .collect(),
        Section::Scripts { scenarios, .. } => scenarios
            .iter()
            .map(|scenario| BlockContent::Script {
                trigger: scenario.trigger.trim().to_string(),
                response: scenario.response.trim().to_string(),
                rationale: scenario.rationale.trim().to_string(),
            })
            .collect(),
        Section::FreeText { body, .. } => split_paragraphs(body)
            .into_iter()
            .map(|text| BlockContent::Paragraph { text })
            .collect(),
    }
}

// =============================================================================
// Theme Application
// =============================================================================

/// Style every block with the theme.
pub fn apply_theme(blocks: Vec<LayoutBlock>, theme: &RenderTheme) -> Vec<RenderBlock> {
    blocks
        .into_iter()
        .map(|block| RenderBlock {
            region: block.region,
            style: block.content.style(theme),
            content: block.content,
        })
        .collect()
}

/// Render a document into ordered, themed blocks.
pub fn render(document: &StructuredDocument, theme: &RenderTheme) -> Vec<RenderBlock> {
    let blocks = apply_theme(layout(document), theme);
    debug!(
        "Rendered {} blocks from {} sections",
        blocks.len(),
        document.sections.len()
    );
    blocks
}

// =============================================================================
// Pagination
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub max_blocks_per_page: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            max_blocks_per_page: render_constants::DEFAULT_MAX_BLOCKS_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub number: usize,
    pub blocks: Vec<RenderBlock>,
}

/// Group blocks into pages.
///
/// The title page stands alone, the introduction and each section start a
/// new page, and a page overflows after `max_blocks_per_page` blocks. The
/// call-to-action closes the last page.
pub fn paginate(blocks: Vec<RenderBlock>, layout: &PageLayout) -> Vec<Page> {
    let max = layout.max_blocks_per_page.max(1);
    let mut pages: Vec<Vec<RenderBlock>> = Vec::new();
    let mut current: Vec<RenderBlock> = Vec::new();
    let mut current_region: Option<BlockRegion> = None;

    for block in blocks {
        let starts_region = current_region != Some(block.region);
        let break_before = match block.region {
            BlockRegion::CallToAction => current_region == Some(BlockRegion::TitlePage),
            BlockRegion::TitlePage => starts_region,
            BlockRegion::Introduction | BlockRegion::Section(_) => {
                starts_region || current.len() >= max
            }
        };

        if break_before && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
        }

        current_region = Some(block.region);
        current.push(block);
    }
    if !current.is_empty() {
        pages.push(current);
    }

    pages
        .into_iter()
        .enumerate()
        .map(|(i, blocks)| Page {
            number: i + 1,
            blocks,
        })
        .collect()
}

// =============================================================================
// Rendered Document
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub theme: RenderTheme,
    pub pages: Vec<Page>,
}

/// Render and paginate a document.
pub fn render_document(
    document: &StructuredDocument,
    theme: &RenderTheme,
    page_layout: &PageLayout,
) -> RenderedDocument {
    RenderedDocument {
        theme: theme.clone(),
        pages: paginate(render(document, theme), page_layout),
    }
}

impl RenderedDocument {
    pub fn blocks(&self) -> impl Iterator<Item = &RenderBlock> {
        self.pages.iter().flat_map(|p| p.blocks.iter())
    }

    /// SHA-256 over the serialized pages
    pub fn fingerprint(&self) -> String {
        // Plain owned data with string keys; serialization cannot fail.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        format!("{:x}", Sha256::digest(&bytes))
    }

    /// Markdown export of the rendered pages
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        for page in &self.pages {
            if page.number > 1 {
                out.push_str(&format!("\n---\n<!-- page {} -->\n\n", page.number));
            }
            for block in &page.blocks {
                write_markdown_block(&mut out, block);
            }
        }

        out
    }
}

fn icon_prefix(style: &BlockStyle) -> String {
    style
        .icon
        .as_deref()
        .map(|icon| format!("{} ", icon))
        .unwrap_or_default()
}

fn write_markdown_block(out: &mut String, block: &RenderBlock) {
    let icon = icon_prefix(&block.style);
    match &block.content {
        BlockContent::Title {
            title, subtitle, ..
        } => {
            out.push_str(&format!("# {}\n\n", title));
            if !subtitle.is_empty() {
                out.push_str(&format!("_{}_\n\n", subtitle));
            }
        }
        BlockContent::Paragraph { text } => out.push_str(&format!("{}\n\n", text)),
        BlockContent::Bullets { items } => {
            for item in items {
                out.push_str(&format!("- {}\n", item));
            }
            out.push('\n');
        }
        BlockContent::SectionHeading { title, .. } => {
            out.push_str(&format!("## {}{}\n\n", icon, title));
        }
        BlockContent::Comparison {
            label,
            pros,
            cons,
            note,
        } => {
            let cons_icon = block
                .style
                .secondary_icon
                .as_deref()
                .map(|icon| format!("{} ", icon))
                .unwrap_or_default();
            out.push_str(&format!("**{}**\n\n", label));
            out.push_str(&format!("- {}Pros: {}\n", icon, pros));
            out.push_str(&format!("- {}Cons: {}\n", cons_icon, cons));
            if let Some(note) = note {
                out.push_str(&format!("- Note: {}\n", note));
            }
            out.push('\n');
        }
        BlockContent::Checklist { phase_title, lines } => {
            out.push_str(&format!("### {}\n\n", phase_title));
            for line in lines {
                out.push_str(&format!("- [ ] {}\n", line));
            }
            out.push('\n');
        }
        BlockContent::Script {
            trigger,
            response,
            rationale,
        } => {
            out.push_str(&format!("> **When:** {}\n>\n", trigger));
            out.push_str(&format!("> **Say:** {}\n>\n", response));
            out.push_str(&format!("> **Why:** {}\n\n", rationale));
        }
        BlockContent::CallToAction {
            title,
            body,
            action_label,
            action_url,
        } => {
            out.push_str(&format!("## {}{}\n\n{}\n", icon, title, body));
            match (action_label, action_url) {
                (Some(label), Some(url)) => out.push_str(&format!("\n[{}]({})\n", label, url)),
                (None, Some(url)) => out.push_str(&format!("\n<{}>\n", url)),
                (Some(label), None) => out.push_str(&format!("\n**{}**\n", label)),
                (None, None) => {}
            }
        }
    }
}
