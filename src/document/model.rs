//! Structured Document Model
//!
//! Typed representation of a generated lead magnet. Section content is a
//! closed set of variants discriminated by the `kind` tag, so every consumer
//! matches exhaustively instead of probing for optional fields.

use serde::{Deserialize, Serialize};

use crate::types::{is_blank, non_blank_lines};

// =============================================================================
// Document
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDocument {
    pub title_page: TitlePage,
    pub introduction: Introduction,
    pub sections: Vec<Section>,
    pub call_to_action: CallToAction,
    /// Attached by the customization merger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,
}

impl StructuredDocument {
    /// Copy of the document with blank items and blank sections removed.
    pub fn without_empty_content(&self) -> Self {
        Self {
            title_page: self.title_page.clone(),
            introduction: self.introduction.trimmed(),
            sections: self.sections.iter().filter_map(Section::pruned).collect(),
            call_to_action: self.call_to_action.clone(),
            branding: self.branding.clone(),
        }
    }

    /// True when at least one section carries renderable content
    pub fn has_content(&self) -> bool {
        self.sections.iter().any(|s| !s.is_blank())
    }

    /// Number of sections that survive empty-content filtering
    pub fn content_section_count(&self) -> usize {
        self.sections.iter().filter(|s| !s.is_blank()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlePage {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

/// Introduction is either prose or a list of points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Introduction {
    Text(String),
    Points(Vec<String>),
}

impl Introduction {
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => is_blank(text),
            Self::Points(points) => points.iter().all(|p| is_blank(p)),
        }
    }

    fn trimmed(&self) -> Self {
        match self {
            Self::Text(text) => Self::Text(text.trim().to_string()),
            Self::Points(points) => Self::Points(non_blank_lines(points)),
        }
    }
}

impl Default for Introduction {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

/// Visual identity attached to a document after customization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_data_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_email: Option<String>,
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Section {
    Comparison {
        title: String,
        items: Vec<ComparisonItem>,
    },
    PhasedChecklist {
        title: String,
        phases: Vec<ChecklistPhase>,
    },
    Scripts {
        title: String,
        scenarios: Vec<ScriptScenario>,
    },
    FreeText {
        title: String,
        body: String,
    },
}

/// Payload-free section discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Comparison,
    PhasedChecklist,
    Scripts,
    FreeText,
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comparison => write!(f, "comparison"),
            Self::PhasedChecklist => write!(f, "phasedChecklist"),
            Self::Scripts => write!(f, "scripts"),
            Self::FreeText => write!(f, "freeText"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonItem {
    pub label: String,
    pub pros: String,
    pub cons: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ComparisonItem {
    fn is_blank(&self) -> bool {
        is_blank(&self.label)
            && is_blank(&self.pros)
            && is_blank(&self.cons)
            && self.note.as_deref().is_none_or(is_blank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistPhase {
    pub phase_title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptScenario {
    pub trigger: String,
    pub response: String,
    pub rationale: String,
}

impl ScriptScenario {
    fn is_blank(&self) -> bool {
        is_blank(&self.trigger) && is_blank(&self.response) && is_blank(&self.rationale)
    }
}

impl Section {
    pub fn title(&self) -> &str {
        match self {
            Self::Comparison { title, .. }
            | Self::PhasedChecklist { title, .. }
            | Self::Scripts { title, .. }
            | Self::FreeText { title, .. } => title,
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Comparison { .. } => SectionKind::Comparison,
            Self::PhasedChecklist { .. } => SectionKind::PhasedChecklist,
            Self::Scripts { .. } => SectionKind::Scripts,
            Self::FreeText { .. } => SectionKind::FreeText,
        }
    }

    /// Deep scan: true when every nested content value is blank.
    ///
    /// The title is not content; a titled section with nothing under it is blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Comparison { items, .. } => items.iter().all(ComparisonItem::is_blank),
            Self::PhasedChecklist { phases, .. } => phases
                .iter()
                .all(|phase| phase.items.iter().all(|item| is_blank(item))),
            Self::Scripts { scenarios, .. } => scenarios.iter().all(ScriptScenario::is_blank),
            Self::FreeText { body, .. } => is_blank(body),
        }
    }

    /// Section with blank entries dropped, or `None` if nothing remains.
    pub fn pruned(&self) -> Option<Section> {
        let pruned = match self {
            Self::Comparison { title, items } => Self::Comparison {
                title: title.trim().to_string(),
                items: items.iter().filter(|i| !i.is_blank()).cloned().collect(),
            },
            Self::PhasedChecklist { title, phases } => Self::PhasedChecklist {
                title: title.trim().to_string(),
                phases: phases
                    .iter()
                    .map(|phase| ChecklistPhase {
                        phase_title: phase.phase_title.trim().to_string(),
                        items: non_blank_lines(&phase.items),
                    })
                    .filter(|phase| !phase.items.is_empty())
                    .collect(),
            },
            Self::Scripts { title, scenarios } => Self::Scripts {
                title: title.trim().to_string(),
                scenarios: scenarios.iter().filter(|s| !s.is_blank()).cloned().collect(),
            },
            Self::FreeText { title, body } => Self::FreeText {
                title: title.trim().to_string(),
                body: body.trim().to_string(),
            },
        };

        (!pruned.is_blank()).then_some(pruned)
    }
}
