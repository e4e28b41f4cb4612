//! Generation Pipeline
//!
//! Guided state machine that takes a campaign description to a finished,
//! customized document.
//!
//! ## Flow
//!
//! ```text
//! Input ──submit──▶ Concepts ──select──▶ OutlineReview ──approve──▶ [Gate]
//!                                                                  │
//!                      GateBlocked ◀──blocked────────────────────┤
//!                          │ recheck                               │ allowed
//!                          └──────────────▶ Generating ◀──────────┘
//!                                               │
//!                                               ▼
//!                                           Complete
//! ```
//!
//! A failed outline or document request parks the pipeline in `Failed`,
//! which keeps every earlier stage's data so `retry` can re-issue it.
//! `go_back` re-enters the predecessor and `reset` returns to `Input`.
//!
//! The pipeline performs no I/O; every request goes to an injected
//! collaborator.

pub mod collaborators;
pub mod gate;
pub mod model;
mod session;
pub mod state;

pub use collaborators::{
    CampaignRecord, ContentGenerator, DocumentSink, EntitlementSource, JsonFileSink,
    SharedEntitlements, SharedGenerator, StaticEntitlements,
};
pub use gate::{GatedStage, SubscriptionTier, can_proceed};
pub use model::{CampaignInput, Concept, Outline, Tone};
pub use session::PipelineSession;
pub use state::{
    ApprovedStage, ConceptStage, GateReason, PipelineState, RetryPoint, ReviewStage, Selection,
    StageKind,
};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::constants::pipeline as pipeline_constants;
use crate::document::{CustomizationOptions, StructuredDocument, merge};
use crate::types::{LeadError, Result, SessionId, UserId, ValidationError, is_blank};

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Concepts requested per run; the generator must return exactly this many
    pub concept_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concept_count: pipeline_constants::DEFAULT_CONCEPT_COUNT,
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// One session's pipeline. Owns its state exclusively.
pub struct GenerationPipeline {
    session_id: SessionId,
    user_id: UserId,
    config: PipelineConfig,
    generator: SharedGenerator,
    entitlements: SharedEntitlements,
    state: PipelineState,
    stage_tx: watch::Sender<StageKind>,
}

impl GenerationPipeline {
    pub fn new(
        generator: SharedGenerator,
        entitlements: SharedEntitlements,
        user_id: UserId,
    ) -> Self {
        let (stage_tx, _) = watch::channel(StageKind::Input);
        Self {
            session_id: SessionId::generate(),
            user_id,
            config: PipelineConfig::default(),
            generator,
            entitlements,
            state: PipelineState::default(),
            stage_tx,
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn stage(&self) -> StageKind {
        self.state.kind()
    }

    /// Final document, once the pipeline is `Complete`
    pub fn document(&self) -> Option<&StructuredDocument> {
        self.state.document()
    }

    /// Watch stage changes, including `Generating` while a request is in flight
    pub fn subscribe(&self) -> watch::Receiver<StageKind> {
        self.stage_tx.subscribe()
    }

    fn set_state(&mut self, state: PipelineState) {
        let from = self.state.kind();
        let to = state.kind();
        self.state = state;
        if from != to {
            debug!(session = %self.session_id, "Stage {} -> {}", from, to);
        }
        self.stage_tx.send_replace(to);
    }

    fn take_state(&mut self) -> PipelineState {
        std::mem::take(&mut self.state)
    }

    fn invalid(&self, action: &'static str) -> LeadError {
        LeadError::InvalidTransition {
            stage: self.stage(),
            action,
        }
    }

    // -------------------------------------------------------------------------
    // Input → Concepts
    // -------------------------------------------------------------------------

    /// Submit campaign input and request concepts.
    ///
    /// On failure the pipeline stays in `Input` with the input kept as draft.
    #[instrument(skip(self, input), fields(session = %self.session_id))]
    pub async fn submit(&mut self, input: CampaignInput) -> Result<StageKind> {
        if !matches!(self.state, PipelineState::Input { .. }) {
            return Err(self.invalid("submit"));
        }
        input.validate()?;

        info!(
            "Requesting {} concepts for {}",
            self.config.concept_count, input.brand_name
        );
        let result = self
            .generator
            .generate_concepts(&input)
            .await
            .and_then(|concepts| self.check_concepts(concepts));

        match result {
            Ok(concepts) => {
                info!("Received {} concepts", concepts.len());
                self.set_state(PipelineState::Concepts(ConceptStage { input, concepts }));
                Ok(StageKind::Concepts)
            }
            Err(e) => {
                warn!("Concept generation failed: {}", e);
                self.set_state(PipelineState::Input { draft: Some(input) });
                Err(generation_failure(StageKind::Input, e))
            }
        }
    }

    fn check_concepts(&self, concepts: Vec<Concept>) -> Result<Vec<Concept>> {
        let expected = self.config.concept_count;
        if concepts.len() != expected {
            return Err(LeadError::generation(
                StageKind::Input,
                format!("expected {} concepts, received {}", expected, concepts.len()),
            ));
        }

        let mut seen = HashSet::new();
        for concept in &concepts {
            if is_blank(&concept.id) {
                return Err(LeadError::generation(
                    StageKind::Input,
                    "concept with blank id",
                ));
            }
            if !seen.insert(concept.id.as_str()) {
                return Err(LeadError::generation(
                    StageKind::Input,
                    format!("duplicate concept id '{}'", concept.id),
                ));
            }
        }
        Ok(concepts)
    }

    // -------------------------------------------------------------------------
    // Concepts → OutlineReview
    // -------------------------------------------------------------------------

    /// Select a concept (final for this run) and request its outline.
    #[instrument(skip(self, customization), fields(session = %self.session_id))]
    pub async fn select(
        &mut self,
        concept_id: &str,
        customization: Option<CustomizationOptions>,
    ) -> Result<StageKind> {
        let PipelineState::Concepts(stage) = &self.state else {
            return Err(LeadError::StaleSelection(format!(
                "no concept list is open (stage is {})",
                self.stage()
            )));
        };
        let Some(concept) = stage.find(concept_id).cloned() else {
            return Err(LeadError::StaleSelection(format!(
                "concept '{}' is not in the current list",
                concept_id
            )));
        };

        info!("Selected concept '{}'", concept.title);
        let result = self
            .generator
            .generate_outline(&stage.input, &concept)
            .await;

        let PipelineState::Concepts(concepts) = self.take_state() else {
            return Err(self.invalid("select"));
        };
        let selection = Selection {
            concept,
            customization,
        };
        self.finish_outline(concepts, selection, result)
    }

    fn finish_outline(
        &mut self,
        concepts: ConceptStage,
        selection: Selection,
        result: Result<Outline>,
    ) -> Result<StageKind> {
        match result {
            Ok(outline) => {
                info!("Outline ready with {} core points", outline.core_points.len());
                self.set_state(PipelineState::OutlineReview(ReviewStage {
                    concepts,
                    selection,
                    draft: outline.clone(),
                    generated: outline,
                }));
                Ok(StageKind::OutlineReview)
            }
            Err(e) => {
                warn!("Outline generation failed: {}", e);
                let err = generation_failure(StageKind::Concepts, e);
                self.set_state(PipelineState::Failed {
                    point: RetryPoint::Outline {
                        concepts,
                        selection,
                    },
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Outline review edits
    // -------------------------------------------------------------------------

    fn review_mut(&mut self, action: &'static str) -> Result<&mut ReviewStage> {
        let stage = self.stage();
        match &mut self.state {
            PipelineState::OutlineReview(review) => Ok(review),
            _ => Err(LeadError::InvalidTransition { stage, action }),
        }
    }

    pub fn edit_outline_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.review_mut("edit the outline")?.draft.title = title.into();
        Ok(())
    }

    pub fn edit_outline_introduction(&mut self, introduction: impl Into<String>) -> Result<()> {
        self.review_mut("edit the outline")?.draft.introduction = introduction.into();
        Ok(())
    }

    pub fn set_core_point(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        let draft = &mut self.review_mut("edit the outline")?.draft;
        let point = draft
            .core_points
            .get_mut(index)
            .ok_or_else(|| point_out_of_range(index))?;
        *point = text.into();
        Ok(())
    }

    pub fn add_core_point(&mut self, text: impl Into<String>) -> Result<()> {
        self.review_mut("edit the outline")?
            .draft
            .core_points
            .push(text.into());
        Ok(())
    }

    pub fn remove_core_point(&mut self, index: usize) -> Result<String> {
        let draft = &mut self.review_mut("edit the outline")?.draft;
        if index >= draft.core_points.len() {
            return Err(point_out_of_range(index));
        }
        Ok(draft.core_points.remove(index))
    }

    pub fn replace_outline(&mut self, outline: Outline) -> Result<()> {
        self.review_mut("edit the outline")?.draft = outline;
        Ok(())
    }

    /// Replace the pending customization; rejected values are not stored.
    pub fn update_customization(&mut self, customization: Option<CustomizationOptions>) -> Result<()> {
        if let Some(options) = &customization {
            options.validate()?;
        }
        let stage = self.stage();
        let selection = match &mut self.state {
            PipelineState::OutlineReview(review) => &mut review.selection,
            PipelineState::GateBlocked { approved, .. } => &mut approved.selection,
            _ => {
                return Err(LeadError::InvalidTransition {
                    stage,
                    action: "update customization",
                });
            }
        };
        selection.customization = customization;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // OutlineReview → Gate → Generating
    // -------------------------------------------------------------------------

    /// Approve the current draft outline.
    #[instrument(skip(self), fields(session = %self.session_id))]
    pub async fn approve(&mut self) -> Result<StageKind> {
        let PipelineState::OutlineReview(review) = &self.state else {
            return Err(self.not_in_review());
        };
        let outline = review.draft.clone();
        self.approve_frozen(outline).await
    }

    /// Approve with a replacement outline in one step.
    #[instrument(skip(self, outline), fields(session = %self.session_id))]
    pub async fn approve_outline(&mut self, outline: Outline) -> Result<StageKind> {
        if !matches!(self.state, PipelineState::OutlineReview(_)) {
            return Err(self.not_in_review());
        }
        self.approve_frozen(outline).await
    }

    fn not_in_review(&self) -> LeadError {
        LeadError::StaleSelection(format!(
            "no outline is under review (stage is {})",
            self.stage()
        ))
    }

    async fn approve_frozen(&mut self, outline: Outline) -> Result<StageKind> {
        outline.validate()?;
        if let PipelineState::OutlineReview(review) = &self.state
            && let Some(options) = &review.selection.customization
        {
            options.validate()?;
        }
        let outline = outline.frozen();

        let tier = self.entitlements.subscription_tier(&self.user_id).await;

        let PipelineState::OutlineReview(review) = self.take_state() else {
            return Err(self.invalid("approve"));
        };
        info!("Outline approved: '{}'", outline.title);
        let approved = ApprovedStage {
            concepts: review.concepts,
            selection: review.selection,
            generated: review.generated,
            outline,
        };
        self.pass_gate(approved, tier).await
    }

    /// Re-run the entitlement lookup after an upgrade or a failed lookup.
    #[instrument(skip(self), fields(session = %self.session_id))]
    pub async fn recheck_entitlement(&mut self) -> Result<StageKind> {
        let PipelineState::GateBlocked { approved, .. } = &self.state else {
            return Err(self.invalid("recheck entitlement"));
        };
        if let Some(options) = &approved.selection.customization {
            options.validate()?;
        }

        let tier = self.entitlements.subscription_tier(&self.user_id).await;

        let PipelineState::GateBlocked { approved, .. } = self.take_state() else {
            return Err(self.invalid("recheck entitlement"));
        };
        self.pass_gate(approved, tier).await
    }

    async fn pass_gate(
        &mut self,
        approved: ApprovedStage,
        tier: Result<SubscriptionTier>,
    ) -> Result<StageKind> {
        let tier = match tier {
            Ok(tier) => tier,
            Err(e) => {
                let message = e.to_string();
                warn!("Entitlement lookup failed for {}: {}", self.user_id, message);
                self.set_state(PipelineState::GateBlocked {
                    approved,
                    reason: GateReason::LookupFailed {
                        message: message.clone(),
                    },
                });
                return Err(LeadError::EntitlementLookup(message));
            }
        };

        if !can_proceed(tier, GatedStage::Download) {
            info!(
                "Gate blocked: {} tier, {} requires {}",
                tier,
                GatedStage::Download,
                GatedStage::Download.required_tier()
            );
            self.set_state(PipelineState::GateBlocked {
                approved,
                reason: GateReason::Tier { tier },
            });
            return Ok(StageKind::GateBlocked);
        }

        debug!("Gate passed with {} tier", tier);
        self.generate_document(approved).await
    }

    // -------------------------------------------------------------------------
    // Generating → Complete
    // -------------------------------------------------------------------------

    async fn generate_document(&mut self, approved: ApprovedStage) -> Result<StageKind> {
        self.set_state(PipelineState::Generating(approved.clone()));
        info!("Generating final document for '{}'", approved.outline.title);

        let result = self
            .generator
            .generate_final_document(approved.input(), &approved.outline)
            .await
            .and_then(|document| {
                finish_document(document, &approved.customization_or_default())
            });

        match result {
            Ok(document) => {
                info!(
                    "Document complete: {} sections",
                    document.sections.len()
                );
                self.set_state(PipelineState::Complete { approved, document });
                Ok(StageKind::Complete)
            }
            Err(e) => {
                warn!("Document generation failed: {}", e);
                let err = generation_failure(StageKind::Generating, e);
                self.set_state(PipelineState::Failed {
                    point: RetryPoint::Document(approved),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Recovery
    // -------------------------------------------------------------------------

    /// Re-issue the request that failed, from its retained data.
    #[instrument(skip(self), fields(session = %self.session_id))]
    pub async fn retry(&mut self) -> Result<StageKind> {
        let PipelineState::Failed { point, .. } = &self.state else {
            return Err(self.invalid("retry"));
        };
        info!("Retrying {} request", point.stage());

        match point {
            RetryPoint::Outline {
                concepts,
                selection,
            } => {
                let result = self
                    .generator
                    .generate_outline(&concepts.input, &selection.concept)
                    .await;
                let PipelineState::Failed {
                    point:
                        RetryPoint::Outline {
                            concepts,
                            selection,
                        },
                    ..
                } = self.take_state()
                else {
                    return Err(self.invalid("retry"));
                };
                self.finish_outline(concepts, selection, result)
            }
            RetryPoint::Document(_) => {
                let PipelineState::Failed {
                    point: RetryPoint::Document(approved),
                    ..
                } = self.take_state()
                else {
                    return Err(self.invalid("retry"));
                };
                self.generate_document(approved).await
            }
        }
    }

    /// Re-enter the previous stage, discarding the current stage's edits.
    pub fn go_back(&mut self) -> Result<StageKind> {
        let previous = match self.take_state() {
            PipelineState::Concepts(stage) => PipelineState::Input {
                draft: Some(stage.input),
            },
            PipelineState::OutlineReview(review) => PipelineState::Concepts(review.concepts),
            PipelineState::GateBlocked { approved, .. } | PipelineState::Generating(approved) => {
                PipelineState::OutlineReview(approved.into_review())
            }
            PipelineState::Failed { point, .. } => match point {
                RetryPoint::Outline { concepts, .. } => PipelineState::Concepts(concepts),
                RetryPoint::Document(approved) => {
                    PipelineState::OutlineReview(approved.into_review())
                }
            },
            current @ (PipelineState::Input { .. } | PipelineState::Complete { .. }) => {
                self.state = current;
                return Err(self.invalid("go back"));
            }
        };

        let stage = previous.kind();
        self.set_state(previous);
        Ok(stage)
    }

    /// Discard everything and start over.
    pub fn reset(&mut self) {
        info!(session = %self.session_id, "Pipeline reset");
        self.set_state(PipelineState::default());
    }
}

fn generation_failure(stage: StageKind, err: LeadError) -> LeadError {
    match err {
        LeadError::Generation { .. } => err,
        other => LeadError::generation_from(stage, other.to_string(), &other),
    }
}

fn point_out_of_range(index: usize) -> LeadError {
    ValidationError::format("corePoints", format!("no core point at index {}", index)).into()
}

/// Reject empty documents, strip blank content, and merge customization.
fn finish_document(
    document: StructuredDocument,
    options: &CustomizationOptions,
) -> Result<StructuredDocument> {
    if !document.has_content() {
        return Err(LeadError::generation(
            StageKind::Generating,
            "document has no renderable sections",
        ));
    }
    let cleaned = document.without_empty_content();
    Ok(merge(&cleaned, options)?)
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::document::{
        BlockContent, BlockRegion, PageLayout, RenderTheme, render_document,
    };
    use crate::types::ErrorKind;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn premium() -> Arc<FakeEntitlements> {
        Arc::new(FakeEntitlements::new(SubscriptionTier::Premium))
    }

    async fn in_review(
        generator: Arc<FakeGenerator>,
        entitlements: Arc<FakeEntitlements>,
    ) -> GenerationPipeline {
        let mut pipeline = pipeline(generator, entitlements);
        pipeline.submit(acme_input()).await.unwrap();
        pipeline.select("concept-2", None).await.unwrap();
        pipeline
    }

    #[tokio::test]
    async fn test_acme_scenario_reaches_complete() {
        let generator = Arc::new(FakeGenerator::new());
        let mut pipeline = pipeline(generator.clone(), premium());

        assert_eq!(pipeline.submit(acme_input()).await.unwrap(), StageKind::Concepts);
        assert_eq!(pipeline.state().concepts().unwrap().len(), 3);

        let stage = pipeline.select("concept-2", None).await.unwrap();
        assert_eq!(stage, StageKind::OutlineReview);
        assert_eq!(pipeline.state().outline().unwrap().core_points.len(), 3);

        assert_eq!(pipeline.approve().await.unwrap(), StageKind::Complete);

        let document = pipeline.document().unwrap();
        assert_eq!(document.sections.len(), 3);
        assert!(document.sections.iter().all(|s| !s.is_blank()));
        assert!(document.branding.is_some());

        let rendered = render_document(document, &RenderTheme::default(), &PageLayout::default());
        let mut section_regions: Vec<usize> = rendered
            .blocks()
            .filter_map(|b| match b.region {
                BlockRegion::Section(index) => Some(index),
                _ => None,
            })
            .collect();
        section_regions.dedup();
        assert_eq!(section_regions, vec![0, 1, 2]);

        let cta_blocks = rendered
            .blocks()
            .filter(|b| matches!(b.content, BlockContent::CallToAction { .. }))
            .count();
        assert_eq!(cta_blocks, 1);
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_field_without_calling_generator() {
        let generator = Arc::new(FakeGenerator::new());
        FakeGenerator::set(&generator.fail_concepts, true);
        let mut pipeline = pipeline(generator, premium());

        let input = CampaignInput {
            brand_name: " ".to_string(),
            ..acme_input()
        };
        let err = pipeline.submit(input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field(), Some("brandName"));
        assert_eq!(pipeline.stage(), StageKind::Input);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_draft() {
        let generator = Arc::new(FakeGenerator::new());
        FakeGenerator::set(&generator.fail_concepts, true);
        let mut pipeline = pipeline(generator, premium());

        let err = pipeline.submit(acme_input()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GenerationFailure);
        assert!(err.is_recoverable());
        assert_eq!(pipeline.stage(), StageKind::Input);
        assert_eq!(pipeline.state().input(), Some(&acme_input()));
    }

    #[tokio::test]
    async fn test_submit_rejects_wrong_concept_count() {
        let generator = Arc::new(FakeGenerator {
            concept_count: 2,
            ..FakeGenerator::new()
        });
        let mut pipeline = pipeline(generator, premium());

        let err = pipeline.submit(acme_input()).await.unwrap_err();
        assert!(matches!(err, LeadError::Generation { .. }));
        assert_eq!(pipeline.stage(), StageKind::Input);
    }

    #[tokio::test]
    async fn test_concept_count_follows_config() {
        let generator = Arc::new(FakeGenerator {
            concept_count: 5,
            ..FakeGenerator::new()
        });
        let mut pipeline = pipeline(generator, premium())
            .with_config(PipelineConfig { concept_count: 5 });

        assert_eq!(pipeline.submit(acme_input()).await.unwrap(), StageKind::Concepts);
    }

    #[tokio::test]
    async fn test_foreign_concept_is_stale() {
        let generator = Arc::new(FakeGenerator::new());
        let mut pipeline = pipeline(generator.clone(), premium());
        pipeline.submit(acme_input()).await.unwrap();

        let err = pipeline.select("concept-9", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StaleSelection);
        assert_eq!(pipeline.stage(), StageKind::Concepts);
        assert_eq!(generator.outline_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_select_outside_concepts_is_stale() {
        let mut pipeline = pipeline(Arc::new(FakeGenerator::new()), premium());
        let err = pipeline.select("concept-1", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StaleSelection);
    }

    #[tokio::test]
    async fn test_go_back_from_review_discards_edits_keeps_concepts() {
        let mut pipeline = in_review(Arc::new(FakeGenerator::new()), premium()).await;
        let concepts_before = pipeline.state().concepts().unwrap().to_vec();

        pipeline.edit_outline_title("My own title").unwrap();
        pipeline.add_core_point("Extra").unwrap();

        assert_eq!(pipeline.go_back().unwrap(), StageKind::Concepts);
        assert_eq!(pipeline.state().concepts().unwrap(), concepts_before.as_slice());
        assert!(pipeline.state().outline().is_none());

        pipeline.select("concept-1", None).await.unwrap();
        assert_eq!(pipeline.state().outline(), Some(&outline()));
    }

    #[tokio::test]
    async fn test_go_back_chain_and_terminal_stages() {
        let mut pipeline = pipeline(Arc::new(FakeGenerator::new()), premium());
        assert!(matches!(
            pipeline.go_back(),
            Err(LeadError::InvalidTransition { .. })
        ));

        pipeline.submit(acme_input()).await.unwrap();
        assert_eq!(pipeline.go_back().unwrap(), StageKind::Input);
        assert_eq!(pipeline.state().input(), Some(&acme_input()));

        pipeline.reset();
        assert_eq!(pipeline.state(), &PipelineState::Input { draft: None });
    }

    #[tokio::test]
    async fn test_review_edits_flow_into_generation() {
        let generator = Arc::new(FakeGenerator::new());
        let mut pipeline = in_review(generator.clone(), premium()).await;

        pipeline.edit_outline_title("  Keep Them Coming Back ").unwrap();
        pipeline.set_core_point(0, "Compare welcome offers").unwrap();
        assert_eq!(pipeline.remove_core_point(2).unwrap(), "Use save-the-member scripts");
        assert!(pipeline.set_core_point(7, "nope").is_err());

        pipeline.approve().await.unwrap();
        let sent = generator.last_outline.lock().unwrap().clone().unwrap();
        assert_eq!(sent.title, "Keep Them Coming Back");
        assert_eq!(sent.core_points.len(), 2);
        assert_eq!(sent.core_points[0], "Compare welcome offers");
    }

    #[tokio::test]
    async fn test_incomplete_outline_blocks_approval() {
        let entitlements = premium();
        let mut pipeline = in_review(Arc::new(FakeGenerator::new()), entitlements.clone()).await;

        pipeline.edit_outline_introduction("").unwrap();
        let err = pipeline.approve().await.unwrap_err();
        assert_eq!(err.field(), Some("introduction"));
        assert_eq!(pipeline.stage(), StageKind::OutlineReview);
        assert_eq!(entitlements.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_customization_blocks_approval() {
        let mut pipeline = pipeline(Arc::new(FakeGenerator::new()), premium());
        pipeline.submit(acme_input()).await.unwrap();

        let options = CustomizationOptions {
            booking_url: Some("calendly".to_string()),
            ..Default::default()
        };
        pipeline.select("concept-1", Some(options)).await.unwrap();

        let err = pipeline.approve().await.unwrap_err();
        assert_eq!(err.field(), Some("bookingUrl"));
        assert_eq!(pipeline.stage(), StageKind::OutlineReview);

        let fixed = CustomizationOptions {
            booking_url: Some("https://cal.example.com/acme".to_string()),
            ..Default::default()
        };
        pipeline.update_customization(Some(fixed)).unwrap();
        assert_eq!(pipeline.approve().await.unwrap(), StageKind::Complete);
        assert_eq!(
            pipeline.document().unwrap().call_to_action.action_url.as_deref(),
            Some("https://cal.example.com/acme")
        );
    }

    #[tokio::test]
    async fn test_free_tier_parks_in_gate_until_upgrade() {
        let entitlements = Arc::new(FakeEntitlements::new(SubscriptionTier::Free));
        let generator = Arc::new(FakeGenerator::new());
        let mut pipeline = in_review(generator.clone(), entitlements.clone()).await;

        assert_eq!(pipeline.approve().await.unwrap(), StageKind::GateBlocked);
        assert!(matches!(
            pipeline.state(),
            PipelineState::GateBlocked {
                reason: GateReason::Tier {
                    tier: SubscriptionTier::Free
                },
                ..
            }
        ));
        assert_eq!(generator.document_calls.load(Ordering::SeqCst), 0);

        entitlements.set_tier(SubscriptionTier::Premium);
        assert_eq!(pipeline.recheck_entitlement().await.unwrap(), StageKind::Complete);
        assert_eq!(entitlements.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lookup_failure_never_allows() {
        let entitlements = Arc::new(FakeEntitlements::failing());
        let generator = Arc::new(FakeGenerator::new());
        let mut pipeline = in_review(generator.clone(), entitlements).await;

        let err = pipeline.approve().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EntitlementLookupFailure);
        assert!(matches!(
            pipeline.state(),
            PipelineState::GateBlocked {
                reason: GateReason::LookupFailed { .. },
                ..
            }
        ));
        assert_eq!(generator.document_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gate_go_back_restores_approved_outline() {
        let entitlements = Arc::new(FakeEntitlements::new(SubscriptionTier::Free));
        let mut pipeline = in_review(Arc::new(FakeGenerator::new()), entitlements).await;

        pipeline.edit_outline_title("Edited").unwrap();
        pipeline.approve().await.unwrap();

        assert_eq!(pipeline.go_back().unwrap(), StageKind::OutlineReview);
        assert_eq!(pipeline.state().outline().unwrap().title, "Edited");
    }

    #[tokio::test]
    async fn test_approve_outline_freezes_replacement() {
        let entitlements = Arc::new(FakeEntitlements::new(SubscriptionTier::Free));
        let mut pipeline = in_review(Arc::new(FakeGenerator::new()), entitlements).await;

        let replacement = Outline {
            title: "  Win Back Regulars  ".to_string(),
            introduction: " Small shops live on repeat visits. ".to_string(),
            core_points: vec![
                " Loyalty punch cards ".to_string(),
                "   ".to_string(),
                "Seasonal bundles".to_string(),
                String::new(),
            ],
        };
        let stage = pipeline.approve_outline(replacement).await.unwrap();
        assert_eq!(stage, StageKind::GateBlocked);

        let expected = Outline {
            title: "Win Back Regulars".to_string(),
            introduction: "Small shops live on repeat visits.".to_string(),
            core_points: vec![
                "Loyalty punch cards".to_string(),
                "Seasonal bundles".to_string(),
            ],
        };
        let PipelineState::GateBlocked { approved, .. } = pipeline.state() else {
            panic!("expected gate, got {}", pipeline.stage());
        };
        assert_eq!(approved.outline, expected);

        assert_eq!(pipeline.go_back().unwrap(), StageKind::OutlineReview);
        assert_eq!(pipeline.state().outline(), Some(&expected));
    }

    #[tokio::test]
    async fn test_invalid_replacement_stays_in_review() {
        let entitlements = premium();
        let mut pipeline = in_review(Arc::new(FakeGenerator::new()), entitlements.clone()).await;

        let replacement = Outline {
            title: "   ".to_string(),
            ..outline()
        };
        let err = pipeline.approve_outline(replacement).await.unwrap_err();
        assert_eq!(err.field(), Some("title"));
        assert_eq!(pipeline.stage(), StageKind::OutlineReview);
        assert_eq!(pipeline.state().outline(), Some(&outline()));
        assert_eq!(entitlements.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_replace_outline_swaps_draft() {
        let generator = Arc::new(FakeGenerator::new());
        let mut pipeline = in_review(generator.clone(), premium()).await;

        let replacement = Outline {
            title: "Counter Conversations".to_string(),
            introduction: "What to say at the register.".to_string(),
            core_points: vec!["Greet regulars by name".to_string()],
        };
        pipeline.replace_outline(replacement.clone()).unwrap();
        assert_eq!(pipeline.state().outline(), Some(&replacement));

        assert_eq!(pipeline.approve().await.unwrap(), StageKind::Complete);
        let sent = generator.last_outline.lock().unwrap().clone().unwrap();
        assert_eq!(sent, replacement);

        assert!(matches!(
            pipeline.replace_outline(outline()),
            Err(LeadError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_outline_failure_then_retry() {
        let generator = Arc::new(FakeGenerator::new());
        FakeGenerator::set(&generator.fail_outline, true);
        let mut pipeline = pipeline(generator.clone(), premium());
        pipeline.submit(acme_input()).await.unwrap();

        let err = pipeline.select("concept-3", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GenerationFailure);
        match pipeline.state() {
            PipelineState::Failed { point, .. } => assert_eq!(point.stage(), StageKind::Concepts),
            other => panic!("unexpected state {:?}", other.kind()),
        }

        FakeGenerator::set(&generator.fail_outline, false);
        assert_eq!(pipeline.retry().await.unwrap(), StageKind::OutlineReview);
        assert_eq!(generator.outline_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_document_failure_keeps_outline_and_retry_succeeds() {
        let generator = Arc::new(FakeGenerator::new());
        FakeGenerator::set(&generator.fail_document, true);
        let mut pipeline = in_review(generator.clone(), premium()).await;
        pipeline.edit_outline_title("Frozen title").unwrap();

        let err = pipeline.approve().await.unwrap_err();
        assert!(matches!(
            err,
            LeadError::Generation {
                stage: StageKind::Generating,
                ..
            }
        ));
        assert_eq!(pipeline.stage(), StageKind::Failed);
        assert_eq!(pipeline.state().outline().unwrap().title, "Frozen title");

        FakeGenerator::set(&generator.fail_document, false);
        assert_eq!(pipeline.retry().await.unwrap(), StageKind::Complete);
        let sent = generator.last_outline.lock().unwrap().clone().unwrap();
        assert_eq!(sent.title, "Frozen title");
    }

    #[tokio::test]
    async fn test_failed_go_back_returns_to_origin() {
        let generator = Arc::new(FakeGenerator::new());
        FakeGenerator::set(&generator.fail_outline, true);
        let mut pipeline = pipeline(generator, premium());
        pipeline.submit(acme_input()).await.unwrap();
        pipeline.select("concept-1", None).await.unwrap_err();

        assert_eq!(pipeline.go_back().unwrap(), StageKind::Concepts);
        assert_eq!(pipeline.state().concepts().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_document_is_generation_failure() {
        let generator = Arc::new(FakeGenerator::new());
        FakeGenerator::set(&generator.empty_document, true);
        let mut pipeline = in_review(generator, premium()).await;

        let err = pipeline.approve().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GenerationFailure);
        assert_eq!(pipeline.stage(), StageKind::Failed);
        assert!(pipeline.document().is_none());
    }

    #[tokio::test]
    async fn test_complete_cannot_go_back_and_retry_needs_failure() {
        let mut pipeline = in_review(Arc::new(FakeGenerator::new()), premium()).await;
        assert!(matches!(
            pipeline.retry().await,
            Err(LeadError::InvalidTransition { .. })
        ));

        pipeline.approve().await.unwrap();
        assert!(pipeline.go_back().is_err());
        assert_eq!(pipeline.stage(), StageKind::Complete);

        let err = pipeline.approve().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StaleSelection);
    }

    #[tokio::test]
    async fn test_subscribe_observes_stage_changes() {
        let mut pipeline = pipeline(Arc::new(FakeGenerator::new()), premium());
        let mut rx = pipeline.subscribe();
        assert_eq!(*rx.borrow(), StageKind::Input);

        pipeline.submit(acme_input()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), StageKind::Concepts);
    }

    #[test]
    fn test_finish_document_uses_defaults_when_uncustomized() {
        let document = document_for(&outline());
        let finished = finish_document(document, &CustomizationOptions::default()).unwrap();
        assert_eq!(finished.sections.len(), 3);
        assert_eq!(
            finished.branding.unwrap().primary_color,
            crate::constants::branding::DEFAULT_PRIMARY_COLOR
        );
    }
}
