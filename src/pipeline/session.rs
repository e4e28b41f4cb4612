//! Shared session handle
//!
//! UI handles share one pipeline. A transition attempted while another is
//! still running is rejected with `Busy`, never queued.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::debug;

use super::model::{CampaignInput, Outline};
use super::state::{PipelineState, StageKind};
use super::GenerationPipeline;
use crate::document::{CustomizationOptions, StructuredDocument};
use crate::types::{LeadError, Result, SessionId};

#[derive(Clone)]
pub struct PipelineSession {
    id: SessionId,
    inner: Arc<Mutex<GenerationPipeline>>,
    stage_rx: watch::Receiver<StageKind>,
}

impl PipelineSession {
    pub fn new(pipeline: GenerationPipeline) -> Self {
        Self {
            id: pipeline.session_id().clone(),
            stage_rx: pipeline.subscribe(),
            inner: Arc::new(Mutex::new(pipeline)),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    fn acquire(&self) -> Result<MutexGuard<'_, GenerationPipeline>> {
        self.inner.try_lock().map_err(|_| {
            debug!(session = %self.id, "Rejected transition: pipeline busy");
            LeadError::Busy
        })
    }

    /// Current stage, readable even while a transition is running
    pub fn stage(&self) -> StageKind {
        *self.stage_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<StageKind> {
        self.stage_rx.clone()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Result<PipelineState> {
        Ok(self.acquire()?.state().clone())
    }

    pub fn document(&self) -> Result<Option<StructuredDocument>> {
        Ok(self.acquire()?.document().cloned())
    }

    pub async fn submit(&self, input: CampaignInput) -> Result<StageKind> {
        self.acquire()?.submit(input).await
    }

    pub async fn select(
        &self,
        concept_id: &str,
        customization: Option<CustomizationOptions>,
    ) -> Result<StageKind> {
        self.acquire()?.select(concept_id, customization).await
    }

    pub async fn approve(&self) -> Result<StageKind> {
        self.acquire()?.approve().await
    }

    pub async fn approve_outline(&self, outline: Outline) -> Result<StageKind> {
        self.acquire()?.approve_outline(outline).await
    }

    pub async fn recheck_entitlement(&self) -> Result<StageKind> {
        self.acquire()?.recheck_entitlement().await
    }

    pub async fn retry(&self) -> Result<StageKind> {
        self.acquire()?.retry().await
    }

    pub fn update_customization(&self, customization: Option<CustomizationOptions>) -> Result<()> {
        self.acquire()?.update_customization(customization)
    }

    /// Apply review edits while holding the lock once
    pub fn edit<T>(&self, f: impl FnOnce(&mut GenerationPipeline) -> Result<T>) -> Result<T> {
        let mut guard = self.acquire()?;
        f(&mut guard)
    }

    pub fn go_back(&self) -> Result<StageKind> {
        self.acquire()?.go_back()
    }

    pub fn reset(&self) -> Result<()> {
        self.acquire()?.reset();
        Ok(())
    }
}
