//! LLM-backed content generator
//!
//! Implements the pipeline's [`ContentGenerator`] contract on top of an
//! [`LlmProvider`]: build the stage prompt, call the provider under a
//! timeout, parse the reply into the typed model.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::prompt::{StagePrompts, StageSchemas};
use super::provider::SharedProvider;
use super::timeout::with_timeout;
use super::validation::parse_response;
use crate::constants::{network as net_constants, pipeline as pipeline_constants};
use crate::document::StructuredDocument;
use crate::pipeline::{CampaignInput, Concept, ContentGenerator, Outline, StageKind};
use crate::types::{LeadError, Result};

#[derive(Deserialize)]
struct ConceptList {
    concepts: Vec<Concept>,
}

pub struct LlmContentGenerator {
    provider: SharedProvider,
    timeout: Duration,
    concept_count: usize,
}

impl LlmContentGenerator {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
            concept_count: pipeline_constants::DEFAULT_CONCEPT_COUNT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concept_count(mut self, count: usize) -> Self {
        self.concept_count = count;
        self
    }

    async fn call(
        &self,
        stage: StageKind,
        operation: &str,
        prompt: String,
        schema: Value,
    ) -> Result<Value> {
        debug!(
            "{}: calling {} ({}), prompt {} chars",
            operation,
            self.provider.name(),
            self.provider.model(),
            prompt.len()
        );

        let response = with_timeout(
            self.timeout,
            self.provider.generate(&prompt, &schema),
            operation,
        )
        .await
        .map_err(|e| LeadError::generation_from(stage, format!("{} failed: {}", operation, e), &e))?;

        info!(
            "{} finished in {}ms ({} tokens)",
            operation,
            response.elapsed_ms,
            response.usage.total()
        );
        Ok(response.content)
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn generate_concepts(&self, input: &CampaignInput) -> Result<Vec<Concept>> {
        let prompt = StagePrompts::concepts(input, self.concept_count);
        let schema = StageSchemas::concepts_schema(self.concept_count);
        let content = self
            .call(StageKind::Input, "concept generation", prompt, schema)
            .await?;

        let list: ConceptList = parse_response(content, "concept list")
            .map_err(|e| LeadError::generation_from(StageKind::Input, e.to_string(), &e))?;
        Ok(list.concepts)
    }

    async fn generate_outline(&self, input: &CampaignInput, concept: &Concept) -> Result<Outline> {
        let prompt = StagePrompts::outline(input, concept);
        let content = self
            .call(
                StageKind::Concepts,
                "outline generation",
                prompt,
                StageSchemas::outline_schema(),
            )
            .await?;

        parse_response(content, "outline")
            .map_err(|e| LeadError::generation_from(StageKind::Concepts, e.to_string(), &e))
    }

    async fn generate_final_document(
        &self,
        input: &CampaignInput,
        outline: &Outline,
    ) -> Result<StructuredDocument> {
        let prompt = StagePrompts::document(input, outline);
        let content = self
            .call(
                StageKind::Generating,
                "document generation",
                prompt,
                StageSchemas::document_schema(),
            )
            .await?;

        parse_response(content, "document")
            .map_err(|e| LeadError::generation_from(StageKind::Generating, e.to_string(), &e))
    }
}
