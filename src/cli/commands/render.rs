//! Render Command
//!
//! Render saved structured documents to Markdown, optionally applying a
//! customization file first.
//!
//! Usage:
//!   leadmagnet render doc.json [more.json ...] [--customization branding.json]
//!       [--icons ascii] [--out-dir rendered/] [--format markdown|json]

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::cli::ui::Output;
use crate::cli::util::{load_config, read_json, theme_for, write_or_print};
use crate::config::Config;
use crate::document::{
    CustomizationOptions, IconSet, RenderedDocument, StructuredDocument, merge, render_document,
};
use crate::types::{LeadError, Result};

/// Files rendered concurrently
const RENDER_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Markdown,
    Json,
}

impl RenderFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Invalid format '{}'. Valid values: markdown, json",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub documents: Vec<PathBuf>,
    pub customization: Option<PathBuf>,
    pub icons: Option<IconSet>,
    pub format: RenderFormat,
    /// Write `<stem>.<ext>` per input here instead of printing
    pub out_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn run(options: RenderOptions) -> Result<()> {
    let config = load_config(options.config.as_deref())?;
    let out = Output::new();

    let customization: Option<CustomizationOptions> = match &options.customization {
        Some(path) => {
            let customization: CustomizationOptions = read_json(path).await?;
            customization.validate()?;
            Some(customization)
        }
        None => None,
    };

    let config_ref = &config;
    let customization_ref = customization.as_ref();
    let icons = options.icons;
    let results: Vec<(PathBuf, Result<RenderedDocument>)> = stream::iter(options.documents.clone())
        .map(move |path| async move {
            let result = render_file(&path, config_ref, customization_ref, icons).await;
            (path, result)
        })
        .buffered(RENDER_CONCURRENCY)
        .collect()
        .await;

    let mut failures = 0;
    let mut first_error: Option<LeadError> = None;
    for (path, result) in results {
        match result {
            Ok(rendered) => {
                let text = format_output(&rendered, options.format)?;
                let target = options
                    .out_dir
                    .as_ref()
                    .map(|dir| output_path(dir, &path, options.format));
                write_or_print(target.as_deref(), &text).await?;
                if let Some(target) = target {
                    out.success(&format!("{} -> {}", path.display(), target.display()));
                }
                out.item("fingerprint", &rendered.fingerprint());
            }
            Err(e) => {
                failures += 1;
                out.error(&format!("{}: {}", path.display(), e));
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(err) => {
            warn!(
                "{} of {} documents failed to render",
                failures,
                options.documents.len()
            );
            Err(err)
        }
        None => Ok(()),
    }
}

async fn render_file(
    path: &Path,
    config: &Config,
    customization: Option<&CustomizationOptions>,
    icons: Option<IconSet>,
) -> Result<RenderedDocument> {
    debug!("Rendering {}", path.display());
    let document: StructuredDocument = read_json(path).await?;
    render_with(&document, config, customization, icons)
}

/// Merge (when customized) and render one document.
pub fn render_with(
    document: &StructuredDocument,
    config: &Config,
    customization: Option<&CustomizationOptions>,
    icons: Option<IconSet>,
) -> Result<RenderedDocument> {
    let document = match customization {
        Some(options) => merge(document, options)?,
        None => document.clone(),
    };
    let theme = theme_for(config, &document, icons);
    let rendered = render_document(&document, &theme, &config.render.page_layout());
    info!(
        "Rendered \"{}\" into {} pages",
        document.title_page.title,
        rendered.pages.len()
    );
    Ok(rendered)
}

fn format_output(rendered: &RenderedDocument, format: RenderFormat) -> Result<String> {
    match format {
        RenderFormat::Markdown => Ok(rendered.to_markdown()),
        RenderFormat::Json => Ok(serde_json::to_string_pretty(rendered)?),
    }
}

fn output_path(dir: &Path, input: &Path, format: RenderFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    dir.join(format!("{}.{}", stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockRegion, Branding};
    use crate::pipeline::testing::{document_for, outline};
    use crate::types::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_render_with_customization_uses_its_branding() {
        let config = Config::default();
        let customization = CustomizationOptions {
            primary_color: "#112233".to_string(),
            booking_url: Some("https://acme.example/book".to_string()),
            ..Default::default()
        };

        let rendered = render_with(
            &document_for(&outline()),
            &config,
            Some(&customization),
            Some(IconSet::Ascii),
        )
        .unwrap();
        assert_eq!(rendered.theme.primary_color, "#112233");
        assert_eq!(rendered.theme.icons, IconSet::Ascii);
        assert!(rendered.to_markdown().contains("https://acme.example/book"));
    }

    #[test]
    fn test_render_without_customization_uses_config_branding() {
        let mut config = Config::default();
        config.branding.primary_color = "#000000".to_string();

        let rendered = render_with(&document_for(&outline()), &config, None, None).unwrap();
        assert_eq!(rendered.theme.primary_color, "#000000");
        assert_eq!(
            rendered
                .blocks()
                .filter(|b| b.region == BlockRegion::CallToAction)
                .count(),
            1
        );
    }

    #[test]
    fn test_document_branding_wins_over_config() {
        let mut document = document_for(&outline());
        document.branding = Some(Branding {
            primary_color: "#ABCDEF".to_string(),
            secondary_color: "#FEDCBA".to_string(),
            font_family: "Georgia".to_string(),
            logo_data_uri: None,
            website_url: None,
            support_email: None,
        });

        let rendered = render_with(&document, &Config::default(), None, None).unwrap();
        assert_eq!(rendered.theme.font_family, "Georgia");
    }

    #[test]
    fn test_output_path_uses_stem() {
        let path = output_path(Path::new("out"), Path::new("docs/guide.json"), RenderFormat::Markdown);
        assert_eq!(path, PathBuf::from("out/guide.md"));
        assert_eq!("JSON".parse::<RenderFormat>().unwrap(), RenderFormat::Json);
        assert!("pdf".parse::<RenderFormat>().is_err());
    }

    #[tokio::test]
    async fn test_run_writes_each_document() {
        let temp_dir = TempDir::new().unwrap();
        let doc_path = temp_dir.path().join("guide.json");
        let json = serde_json::to_string(&document_for(&outline())).unwrap();
        tokio::fs::write(&doc_path, json).await.unwrap();
        let config_path = temp_dir.path().join("config.toml");
        tokio::fs::write(&config_path, "[render]\nicons = \"none\"\n")
            .await
            .unwrap();
        let out_dir = temp_dir.path().join("rendered");

        run(RenderOptions {
            documents: vec![doc_path],
            out_dir: Some(out_dir.clone()),
            config: Some(config_path),
            ..Default::default()
        })
        .await
        .unwrap();

        let markdown = tokio::fs::read_to_string(out_dir.join("guide.md")).await.unwrap();
        assert!(markdown.starts_with("# The Retention Playbook"));
    }

    #[tokio::test]
    async fn test_run_reports_unreadable_documents() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        tokio::fs::write(&config_path, "").await.unwrap();

        let err = run(RenderOptions {
            documents: vec![temp_dir.path().join("missing.json")],
            out_dir: Some(temp_dir.path().to_path_buf()),
            config: Some(config_path),
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, LeadError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Environment);
    }

    #[tokio::test]
    async fn test_run_returns_first_failure_and_renders_the_rest() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.json");
        let json = serde_json::to_string(&document_for(&outline())).unwrap();
        tokio::fs::write(&good, json).await.unwrap();
        let broken = temp_dir.path().join("broken.json");
        tokio::fs::write(&broken, "{\"titlePage\": 3}").await.unwrap();
        let config_path = temp_dir.path().join("config.toml");
        tokio::fs::write(&config_path, "").await.unwrap();
        let out_dir = temp_dir.path().join("rendered");

        let err = run(RenderOptions {
            documents: vec![good, broken, temp_dir.path().join("missing.json")],
            out_dir: Some(out_dir.clone()),
            config: Some(config_path),
            ..Default::default()
        })
        .await
        .unwrap_err();

        assert!(matches!(err, LeadError::Json(_)));
        assert!(out_dir.join("good.md").exists());
    }
}
