//! Pipeline State
//!
//! Each variant owns exactly the data its stage needs. Going back to an
//! earlier stage is a matter of unwrapping the payload it was built from.

use serde::Serialize;

use super::gate::SubscriptionTier;
use super::model::{CampaignInput, Concept, Outline};
use crate::document::{CustomizationOptions, StructuredDocument};

/// Payload-free stage discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StageKind {
    Input,
    Concepts,
    OutlineReview,
    GateBlocked,
    Generating,
    Complete,
    Failed,
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Concepts => "Concepts",
            Self::OutlineReview => "Outline Review",
            Self::GateBlocked => "Gate Blocked",
            Self::Generating => "Generating",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Submitted input and the concepts generated from it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptStage {
    pub input: CampaignInput,
    pub concepts: Vec<Concept>,
}

impl ConceptStage {
    pub fn find(&self, concept_id: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.id == concept_id)
    }
}

/// The chosen concept and whatever customization came with it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub concept: Concept,
    pub customization: Option<CustomizationOptions>,
}

/// Outline under review: the generated original plus the user's working copy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStage {
    pub concepts: ConceptStage,
    pub selection: Selection,
    pub generated: Outline,
    pub draft: Outline,
}

/// Everything fixed at approval; the outline is frozen by value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedStage {
    pub concepts: ConceptStage,
    pub selection: Selection,
    pub generated: Outline,
    pub outline: Outline,
}

impl ApprovedStage {
    pub fn input(&self) -> &CampaignInput {
        &self.concepts.input
    }

    /// Back to review with the approved outline as the working copy
    pub fn into_review(self) -> ReviewStage {
        ReviewStage {
            concepts: self.concepts,
            selection: self.selection,
            generated: self.generated,
            draft: self.outline,
        }
    }

    pub fn customization_or_default(&self) -> CustomizationOptions {
        self.selection.customization.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum GateReason {
    /// Tier known, but below what the gated stage requires
    Tier { tier: SubscriptionTier },
    /// Tier could not be determined
    LookupFailed { message: String },
}

/// Data needed to re-issue a failed collaborator request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "camelCase")]
pub enum RetryPoint {
    /// Outline generation, issued from Concepts
    Outline {
        concepts: ConceptStage,
        selection: Selection,
    },
    /// Document generation, issued from Generating
    Document(ApprovedStage),
}

impl RetryPoint {
    /// Stage the failed request was issued from
    pub fn stage(&self) -> StageKind {
        match self {
            Self::Outline { .. } => StageKind::Concepts,
            Self::Document(_) => StageKind::Generating,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", content = "data", rename_all = "camelCase")]
pub enum PipelineState {
    Input {
        draft: Option<CampaignInput>,
    },
    Concepts(ConceptStage),
    OutlineReview(ReviewStage),
    GateBlocked {
        approved: ApprovedStage,
        reason: GateReason,
    },
    Generating(ApprovedStage),
    Complete {
        approved: ApprovedStage,
        document: StructuredDocument,
    },
    Failed {
        point: RetryPoint,
        message: String,
    },
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::Input { draft: None }
    }
}

impl PipelineState {
    pub fn kind(&self) -> StageKind {
        match self {
            Self::Input { .. } => StageKind::Input,
            Self::Concepts(_) => StageKind::Concepts,
            Self::OutlineReview(_) => StageKind::OutlineReview,
            Self::GateBlocked { .. } => StageKind::GateBlocked,
            Self::Generating(_) => StageKind::Generating,
            Self::Complete { .. } => StageKind::Complete,
            Self::Failed { .. } => StageKind::Failed,
        }
    }

    pub fn input(&self) -> Option<&CampaignInput> {
        match self {
            Self::Input { draft } => draft.as_ref(),
            Self::Concepts(stage) => Some(&stage.input),
            Self::OutlineReview(review) => Some(&review.concepts.input),
            Self::GateBlocked { approved, .. }
            | Self::Generating(approved)
            | Self::Complete { approved, .. } => Some(approved.input()),
            Self::Failed { point, .. } => match point {
                RetryPoint::Outline { concepts, .. } => Some(&concepts.input),
                RetryPoint::Document(approved) => Some(approved.input()),
            },
        }
    }

    pub fn concepts(&self) -> Option<&[Concept]> {
        let stage = match self {
            Self::Input { .. } => return None,
            Self::Concepts(stage) => stage,
            Self::OutlineReview(review) => &review.concepts,
            Self::GateBlocked { approved, .. }
            | Self::Generating(approved)
            | Self::Complete { approved, .. } => &approved.concepts,
            Self::Failed { point, .. } => match point {
                RetryPoint::Outline { concepts, .. } => concepts,
                RetryPoint::Document(approved) => &approved.concepts,
            },
        };
        Some(&stage.concepts)
    }

    /// Outline currently shown: the working draft in review, the frozen one after
    pub fn outline(&self) -> Option<&Outline> {
        match self {
            Self::OutlineReview(review) => Some(&review.draft),
            Self::GateBlocked { approved, .. }
            | Self::Generating(approved)
            | Self::Complete { approved, .. } => Some(&approved.outline),
            Self::Failed {
                point: RetryPoint::Document(approved),
                ..
            } => Some(&approved.outline),
            _ => None,
        }
    }

    pub fn document(&self) -> Option<&StructuredDocument> {
        match self {
            Self::Complete { document, .. } => Some(document),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::model::Tone;

    fn approved() -> ApprovedStage {
        let outline = Outline {
            title: "Plan".to_string(),
            introduction: "Intro".to_string(),
            core_points: vec!["One".to_string()],
        };
        ApprovedStage {
            concepts: ConceptStage {
                input: CampaignInput {
                    operator_name: "Dana".to_string(),
                    brand_name: "Acme".to_string(),
                    audience_description: "shops".to_string(),
                    niche_label: "retail".to_string(),
                    problem_statement: "p".to_string(),
                    desired_outcome: "o".to_string(),
                    tone: Tone::Direct,
                    operator_title: "Founder".to_string(),
                },
                concepts: vec![Concept {
                    id: "c1".to_string(),
                    title: "Checklist".to_string(),
                    description: "d".to_string(),
                }],
            },
            selection: Selection {
                concept: Concept {
                    id: "c1".to_string(),
                    title: "Checklist".to_string(),
                    description: "d".to_string(),
                },
                customization: None,
            },
            generated: outline.clone(),
            outline: Outline {
                title: "Edited".to_string(),
                ..outline
            },
        }
    }

    #[test]
    fn test_stage_kind_display() {
        assert_eq!(StageKind::OutlineReview.to_string(), "Outline Review");
        assert_eq!(PipelineState::default().kind(), StageKind::Input);
    }

    #[test]
    fn test_retry_point_origin() {
        let approved = approved();
        assert_eq!(
            RetryPoint::Document(approved.clone()).stage(),
            StageKind::Generating
        );
        let point = RetryPoint::Outline {
            concepts: approved.concepts.clone(),
            selection: approved.selection.clone(),
        };
        assert_eq!(point.stage(), StageKind::Concepts);
    }

    #[test]
    fn test_into_review_uses_approved_outline() {
        let review = approved().into_review();
        assert_eq!(review.draft.title, "Edited");
        assert_eq!(review.generated.title, "Plan");
    }

    #[test]
    fn test_accessors_follow_payload() {
        let state = PipelineState::Generating(approved());
        assert_eq!(state.input().map(|i| i.brand_name.as_str()), Some("Acme"));
        assert_eq!(state.concepts().map(|c| c.len()), Some(1));
        assert_eq!(state.outline().map(|o| o.title.as_str()), Some("Edited"));
        assert!(state.document().is_none());
    }
}
