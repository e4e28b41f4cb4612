//! Generate Command
//!
//! Runs one campaign through the pipeline non-interactively:
//! submit input, pick a concept, optionally retitle the outline, approve,
//! then render and save the finished document.
//!
//! Usage:
//!   leadmagnet generate campaign.json [--concept 2 | --concept-id ID]
//!       [--customization branding.json] [--tier premium] [-o guide.md]

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::ai::{LlmContentGenerator, create_provider};
use crate::cli::ui::Output;
use crate::cli::util::{load_config, read_json, theme_for, write_or_print};
use crate::config::Config;
use crate::document::{CustomizationOptions, IconSet, render_document};
use crate::pipeline::{
    CampaignInput, Concept, DocumentSink, GateReason, GenerationPipeline, JsonFileSink,
    PipelineState, StageKind, StaticEntitlements, SubscriptionTier,
};
use crate::types::{ErrorKind, LeadError, Result, UserId, ValidationError};

/// Which generated concept to develop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConceptChoice {
    /// 1-based position in the generated list
    Position(usize),
    Id(String),
}

impl Default for ConceptChoice {
    fn default() -> Self {
        Self::Position(1)
    }
}

impl ConceptChoice {
    fn resolve(&self, concepts: &[Concept]) -> Result<String> {
        let found = match self {
            Self::Position(n) => n.checked_sub(1).and_then(|i| concepts.get(i)),
            Self::Id(id) => concepts.iter().find(|c| &c.id == id),
        };
        found.map(|c| c.id.clone()).ok_or_else(|| {
            LeadError::from(ValidationError::format(
                "concept",
                format!("{:?} does not match any of {} concepts", self, concepts.len()),
            ))
        })
    }
}

/// Generate run options (consolidated parameters)
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub input: PathBuf,
    pub concept: ConceptChoice,
    pub customization: Option<PathBuf>,
    /// Overrides `entitlement.default_tier`
    pub tier: Option<SubscriptionTier>,
    pub user: String,
    /// Replace the generated outline title before approving
    pub title: Option<String>,
    /// Retries for failed generation or entitlement lookups
    pub retries: u32,
    pub output: Option<PathBuf>,
    pub icons: Option<IconSet>,
    pub save: bool,
    pub config: Option<PathBuf>,
    pub quiet: bool,
}

/// Everything the pipeline needs for one run, already loaded
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: CampaignInput,
    pub concept: ConceptChoice,
    pub customization: Option<CustomizationOptions>,
    pub title: Option<String>,
    pub retries: u32,
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    let config = load_config(options.config.as_deref())?;
    let out = if options.quiet {
        Output::quiet()
    } else {
        Output::new()
    };

    let request = RunRequest {
        input: read_json(&options.input).await?,
        concept: options.concept.clone(),
        customization: match &options.customization {
            Some(path) => Some(read_json(path).await?),
            None => None,
        },
        title: options.title.clone(),
        retries: options.retries,
    };

    let mut pipeline = build_pipeline(&config, &options)?;
    let printer = StagePrinter::spawn(pipeline.subscribe(), out);

    let result = drive(&mut pipeline, &request, &out).await;
    printer.finish().await;

    match result? {
        StageKind::Complete => finish(&config, &options, &pipeline, &out).await,
        StageKind::GateBlocked => {
            out.warning(&format!(
                "Outline approved, but downloading requires the {} tier.",
                SubscriptionTier::Premium
            ));
            out.info("Upgrade, then run the command again with the same input.");
            Ok(())
        }
        other => {
            warn!("Run stopped in stage {}", other);
            Ok(())
        }
    }
}

fn build_pipeline(config: &Config, options: &GenerateOptions) -> Result<GenerationPipeline> {
    let provider = create_provider(&config.llm.provider_config())?;
    let generator = LlmContentGenerator::new(provider)
        .with_timeout(config.llm.timeout())
        .with_concept_count(config.pipeline.concept_count);
    let tier = options.tier.unwrap_or(config.entitlement.default_tier);

    info!(
        "Generating with {} ({}), tier {}",
        config.llm.provider, config.llm.model, tier
    );

    Ok(GenerationPipeline::new(
        Arc::new(generator),
        Arc::new(StaticEntitlements::new(tier)),
        UserId::from(options.user.as_str()),
    )
    .with_config(config.pipeline.clone()))
}

/// Prints stage changes as they are published
pub struct StagePrinter {
    done: oneshot::Sender<()>,
    task: JoinHandle<Vec<StageKind>>,
}

impl StagePrinter {
    pub fn spawn(mut stages: watch::Receiver<StageKind>, out: Output) -> Self {
        let (done, mut done_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut seen = Vec::new();
            loop {
                tokio::select! {
                    biased;
                    changed = stages.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let stage = *stages.borrow_and_update();
                        out.stage(stage);
                        seen.push(stage);
                    }
                    _ = &mut done_rx => {
                        // Flush a change published after the last wakeup
                        if stages.has_changed().unwrap_or(false) {
                            let stage = *stages.borrow_and_update();
                            out.stage(stage);
                            seen.push(stage);
                        }
                        break;
                    }
                }
            }
            seen
        });
        Self { done, task }
    }

    /// Stop watching once the final stage has been printed; returns the stages shown.
    pub async fn finish(self) -> Vec<StageKind> {
        let _ = self.done.send(());
        self.task.await.unwrap_or_default()
    }
}

/// Walk the pipeline from input to a terminal or gated stage.
pub async fn drive(
    pipeline: &mut GenerationPipeline,
    request: &RunRequest,
    out: &Output,
) -> Result<StageKind> {
    submit_with_retries(pipeline, request, out).await?;

    let concepts = pipeline.state().concepts().unwrap_or_default().to_vec();
    out.section("Concepts");
    for (i, concept) in concepts.iter().enumerate() {
        out.item(&format!("{}.", i + 1), &concept.title);
    }

    let concept_id = request.concept.resolve(&concepts)?;
    let selected = pipeline
        .select(&concept_id, request.customization.clone())
        .await;
    with_retries(pipeline, selected, request.retries, out).await?;

    if let Some(title) = &request.title {
        pipeline.edit_outline_title(title.clone())?;
    }
    if let Some(outline) = pipeline.state().outline() {
        out.section(&format!("Outline: {}", outline.title));
        for point in &outline.core_points {
            out.item("-", point);
        }
    }

    let approved = pipeline.approve().await;
    with_retries(pipeline, approved, request.retries, out).await
}

/// Submit, re-issuing failed concept requests up to `retries` times.
///
/// A failed submit leaves the pipeline in `Input`, so it is simply repeated.
async fn submit_with_retries(
    pipeline: &mut GenerationPipeline,
    request: &RunRequest,
    out: &Output,
) -> Result<StageKind> {
    let mut attempts = 0;
    loop {
        match pipeline.submit(request.input.clone()).await {
            Err(err)
                if attempts < request.retries
                    && err.kind() == ErrorKind::GenerationFailure
                    && err.is_retryable() =>
            {
                attempts += 1;
                out.warning(&format!("{} (retry {}/{})", err, attempts, request.retries));
            }
            result => return result,
        }
    }
}

/// Re-issue failed requests up to `retries` times.
///
/// Failures whose provider category cannot change on repeat (auth, bad
/// request) are returned immediately.
async fn with_retries(
    pipeline: &mut GenerationPipeline,
    first: Result<StageKind>,
    retries: u32,
    out: &Output,
) -> Result<StageKind> {
    let mut result = first;
    let mut attempts = 0;

    while let Err(err) = &result {
        if attempts >= retries || !err.is_retryable() {
            break;
        }
        let lookup_failed = matches!(
            pipeline.state(),
            PipelineState::GateBlocked {
                reason: GateReason::LookupFailed { .. },
                ..
            }
        );
        if pipeline.stage() != StageKind::Failed && !lookup_failed {
            break;
        }

        attempts += 1;
        out.warning(&format!("{} (retry {}/{})", err, attempts, retries));
        result = if lookup_failed {
            pipeline.recheck_entitlement().await
        } else {
            pipeline.retry().await
        };
    }

    result
}

async fn finish(
    config: &Config,
    options: &GenerateOptions,
    pipeline: &GenerationPipeline,
    out: &Output,
) -> Result<()> {
    let (Some(input), Some(document)) = (pipeline.state().input(), pipeline.document()) else {
        return Err(LeadError::InvalidTransition {
            stage: pipeline.stage(),
            action: "render",
        });
    };

    let theme = theme_for(config, document, options.icons);
    let rendered = render_document(document, &theme, &config.render.page_layout());
    write_or_print(options.output.as_deref(), &rendered.to_markdown()).await?;

    out.success(&format!(
        "Rendered \"{}\": {} sections, {} pages",
        document.title_page.title,
        document.sections.len(),
        rendered.pages.len()
    ));
    out.item("fingerprint", &rendered.fingerprint());

    if options.save {
        let sink = JsonFileSink::new(&config.storage.campaigns_dir);
        let record = sink.persist_document(input, document).await?;
        out.success(&format!(
            "Saved campaign {} to {}",
            record.id,
            sink.path_for(&record).display()
        ));
    }

    Ok(())
}
