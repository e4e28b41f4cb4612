//! Collaborator Contracts
//!
//! The pipeline does no I/O itself. Content generation, entitlement lookup
//! and persistence sit behind these traits so the surrounding application
//! (and tests) choose the implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::gate::SubscriptionTier;
use super::model::{CampaignInput, Concept, Outline};
use crate::document::StructuredDocument;
use crate::types::{Result, UserId};

// =============================================================================
// Traits
// =============================================================================

/// External content-generation service
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_concepts(&self, input: &CampaignInput) -> Result<Vec<Concept>>;

    async fn generate_outline(&self, input: &CampaignInput, concept: &Concept) -> Result<Outline>;

    async fn generate_final_document(
        &self,
        input: &CampaignInput,
        outline: &Outline,
    ) -> Result<StructuredDocument>;
}

/// Source of truth for a user's subscription tier
#[async_trait]
pub trait EntitlementSource: Send + Sync {
    async fn subscription_tier(&self, user_id: &UserId) -> Result<SubscriptionTier>;
}

/// Persistence for finished documents
///
/// Called by the application once a pipeline reaches `Complete`.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn persist_document(
        &self,
        input: &CampaignInput,
        document: &StructuredDocument,
    ) -> Result<CampaignRecord>;
}

pub type SharedGenerator = Arc<dyn ContentGenerator>;
pub type SharedEntitlements = Arc<dyn EntitlementSource>;

/// Reference to a persisted campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    pub id: Uuid,
    pub brand_name: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Static Entitlements
// =============================================================================

/// Fixed tier with optional per-user overrides
#[derive(Debug, Clone, Default)]
pub struct StaticEntitlements {
    default_tier: SubscriptionTier,
    overrides: HashMap<UserId, SubscriptionTier>,
}

impl StaticEntitlements {
    pub fn new(default_tier: SubscriptionTier) -> Self {
        Self {
            default_tier,
            overrides: HashMap::new(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<UserId>, tier: SubscriptionTier) -> Self {
        self.overrides.insert(user_id.into(), tier);
        self
    }
}

#[async_trait]
impl EntitlementSource for StaticEntitlements {
    async fn subscription_tier(&self, user_id: &UserId) -> Result<SubscriptionTier> {
        let tier = self
            .overrides
            .get(user_id)
            .copied()
            .unwrap_or(self.default_tier);
        debug!("Entitlement for {}: {}", user_id, tier);
        Ok(tier)
    }
}

// =============================================================================
// JSON File Sink
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredCampaign<'a> {
    #[serde(flatten)]
    record: &'a CampaignRecord,
    input: &'a CampaignInput,
    document: &'a StructuredDocument,
}

/// Writes each finished document to `<dir>/<record id>.json`
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, record: &CampaignRecord) -> PathBuf {
        self.dir.join(format!("{}.json", record.id))
    }
}

#[async_trait]
impl DocumentSink for JsonFileSink {
    async fn persist_document(
        &self,
        input: &CampaignInput,
        document: &StructuredDocument,
    ) -> Result<CampaignRecord> {
        let record = CampaignRecord {
            id: Uuid::new_v4(),
            brand_name: input.brand_name.clone(),
            title: document.title_page.title.clone(),
            created_at: Utc::now(),
        };

        let stored = StoredCampaign {
            record: &record,
            input,
            document,
        };
        let json = serde_json::to_vec_pretty(&stored)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&record);
        tokio::fs::write(&path, json).await?;

        info!("Persisted campaign {} to {}", record.id, path.display());
        Ok(record)
    }
}
