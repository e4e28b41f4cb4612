use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadmagnet::cli::commands::generate::{ConceptChoice, GenerateOptions};
use leadmagnet::cli::commands::render::{RenderFormat, RenderOptions};
use leadmagnet::document::IconSet;
use leadmagnet::pipeline::SubscriptionTier;

/// Parse subscription tier from string
fn parse_tier(s: &str) -> Result<SubscriptionTier, String> {
    s.parse::<SubscriptionTier>()
        .map_err(|_| format!("Invalid tier '{}'. Valid values: free, premium", s))
}

/// Parse icon set from string
fn parse_icons(s: &str) -> Result<IconSet, String> {
    match s.to_lowercase().as_str() {
        "emoji" => Ok(IconSet::Emoji),
        "ascii" => Ok(IconSet::Ascii),
        "none" => Ok(IconSet::None),
        _ => Err(format!(
            "Invalid icon set '{}'. Valid values: emoji, ascii, none",
            s
        )),
    }
}

#[derive(Parser)]
#[command(name = "leadmagnet")]
#[command(
    version,
    about = "Guided AI generation of multi-section lead magnet documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the global/project chain
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a lead magnet from a campaign input file
    Generate {
        #[arg(help = "Campaign input JSON")]
        input: PathBuf,
        #[arg(
            long,
            default_value = "1",
            conflicts_with = "concept_id",
            help = "Concept to develop, by 1-based position"
        )]
        concept: usize,
        #[arg(long, help = "Concept to develop, by id")]
        concept_id: Option<String>,
        #[arg(long, help = "Customization JSON (branding and call to action)")]
        customization: Option<PathBuf>,
        #[arg(long, value_parser = parse_tier, env = "LEADMAGNET_TIER", help = "Subscription tier: free, premium")]
        tier: Option<SubscriptionTier>,
        #[arg(long, default_value = "local", help = "User id for the entitlement lookup")]
        user: String,
        #[arg(long, help = "Replace the outline title before approving")]
        title: Option<String>,
        #[arg(long, default_value = "0", help = "Retries for failed generation steps")]
        retries: u32,
        #[arg(long, short, help = "Write Markdown here instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long, value_parser = parse_icons, help = "Icon set: emoji, ascii, none")]
        icons: Option<IconSet>,
        #[arg(long = "no-save", help = "Do not persist the finished campaign")]
        no_save: bool,
    },

    /// Render structured document JSON files
    Render {
        #[arg(required = true, help = "Document JSON files")]
        documents: Vec<PathBuf>,
        #[arg(long, help = "Customization JSON to merge before rendering")]
        customization: Option<PathBuf>,
        #[arg(long, value_parser = parse_icons, help = "Icon set: emoji, ascii, none")]
        icons: Option<IconSet>,
        #[arg(
            short = 'f',
            long,
            default_value = "markdown",
            help = "Output format: markdown, json"
        )]
        format: RenderFormat,
        #[arg(long, help = "Write one file per document into this directory")]
        out_dir: Option<PathBuf>,
    },

    /// Validate a customization file
    CheckBranding {
        #[arg(help = "Customization JSON")]
        file: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        #[arg(long, short, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mleadmagnet encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Default hook prints the backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            input,
            concept,
            concept_id,
            customization,
            tier,
            user,
            title,
            retries,
            output,
            icons,
            no_save,
        } => {
            let options = GenerateOptions {
                input,
                concept: match concept_id {
                    Some(id) => ConceptChoice::Id(id),
                    None => ConceptChoice::Position(concept),
                },
                customization,
                tier,
                user,
                title,
                retries,
                output,
                icons,
                save: !no_save,
                config: cli.config,
                quiet: cli.quiet,
            };
            let rt = Runtime::new()?;
            rt.block_on(leadmagnet::cli::commands::generate::run(options))?;
        }
        Commands::Render {
            documents,
            customization,
            icons,
            format,
            out_dir,
        } => {
            let options = RenderOptions {
                documents,
                customization,
                icons,
                format,
                out_dir,
                config: cli.config,
            };
            let rt = Runtime::new()?;
            rt.block_on(leadmagnet::cli::commands::render::run(options))?;
        }
        Commands::CheckBranding { file, format } => {
            let rt = Runtime::new()?;
            rt.block_on(leadmagnet::cli::commands::branding::run(&file, &format))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                leadmagnet::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                leadmagnet::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    leadmagnet::cli::commands::config::init_global(force)?;
                } else {
                    leadmagnet::cli::commands::config::init_project(force)?;
                }
            }
        },
    }

    Ok(())
}
