//! GramConnect operator CLI
//!
//! The `gram` command runs the report pipeline pieces by hand, against the
//! live services or on saved model output.
//!
//! ## Commands
//!
//! - `enrich`: run the full pipeline on one description (and photo)
//! - `extract`: run extraction and normalization on raw model text
//! - `transcribe`: transcribe a voice note into an Indic script
//! - `reports`: list stored reports

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gram_ai::{
    GeminiClient, GenerativeModel, GoogleTranslateClient, Media, ModelAnalyzer, TranslateConfig,
};
use gram_core::{
    extract_object, normalize, PipelineConfig, RawReport, ReportPipeline, Script, SubmitterId,
    Transcriber,
};
use gram_store::{
    mime_for_extension, FsPhotoStore, NewReport, PhotoStore, ReportStore, SurrealReportStore,
};
use serde::Serialize;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "gram")]
#[command(author = "GramConnect Developers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GramConnect report pipeline tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Pipeline config file (TOML, `[pipeline]` table)
    #[arg(long, global = true, env = "GRAM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the enrichment pipeline once and print the outcome
    Enrich {
        /// Report description, in any language
        #[arg(short, long)]
        description: String,

        /// Photo to attach
        #[arg(short, long)]
        photo: Option<PathBuf>,

        /// Photo MIME type (guessed from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,

        /// Submitter recorded with the report
        #[arg(long, default_value = "cli")]
        submitter: String,

        /// Also store the report (and photo) like the daemon would
        #[arg(long)]
        save: bool,
    },

    /// Extract and normalize raw model output (stdin by default)
    Extract {
        /// File holding the raw model text
        file: Option<PathBuf>,
    },

    /// Transcribe a voice note
    Transcribe {
        /// Audio file
        #[arg(short, long)]
        audio: PathBuf,

        /// Audio MIME type
        #[arg(long, default_value = "audio/webm")]
        mime: String,

        /// Target script or language (devanagari, bengali, tamil, hindi, ...)
        #[arg(long, default_value = "devanagari")]
        script: String,
    },

    /// List stored reports, newest first
    Reports {
        /// Only reports carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Maximum number of reports to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    gram_core::telemetry::init_tracing(cli.json, level);

    let config =
        PipelineConfig::load(cli.config.as_deref()).context("Failed to load pipeline config")?;

    match cli.command {
        Commands::Enrich {
            description,
            photo,
            mime,
            submitter,
            save,
        } => {
            cmd_enrich(
                config,
                &description,
                photo.as_deref(),
                mime.as_deref(),
                &submitter,
                save,
            )
            .await
        }
        Commands::Extract { file } => cmd_extract(&config, file.as_deref()),
        Commands::Transcribe {
            audio,
            mime,
            script,
        } => cmd_transcribe(&config, &audio, &mime, &script).await,
        Commands::Reports { tag, limit } => cmd_reports(tag.as_deref(), limit).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// MIME type from a file extension; `None` for unknown extensions.
fn infer_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match mime_for_extension(&ext) {
        "application/octet-stream" => None,
        mime => Some(mime),
    }
}

fn read_photo(path: &Path, mime: Option<&str>) -> Result<Media> {
    let mime = match mime {
        Some(mime) => mime,
        None => infer_mime(path)
            .with_context(|| format!("Cannot guess MIME type of {:?}; pass --mime", path))?,
    };
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    if bytes.is_empty() {
        bail!("Photo {:?} is empty", path);
    }
    Ok(Media::new(mime, bytes))
}

fn live_model() -> Result<Arc<dyn GenerativeModel>> {
    let client = GeminiClient::from_env().context("Failed to build Gemini client")?;
    Ok(Arc::new(client))
}

async fn cmd_enrich(
    config: PipelineConfig,
    description: &str,
    photo: Option<&Path>,
    mime: Option<&str>,
    submitter: &str,
    save: bool,
) -> Result<()> {
    let photo = photo.map(|p| read_photo(p, mime)).transpose()?;
    let submitter = SubmitterId::new(submitter)?;
    let report = RawReport::new(submitter.clone(), description, photo)?;

    let translator = Arc::new(
        GoogleTranslateClient::new(TranslateConfig::from_env())
            .context("Failed to build translate client")?,
    );
    let analyzer = Arc::new(ModelAnalyzer::new(live_model()?));
    let pipeline = ReportPipeline::new(translator, analyzer, config);

    let run = pipeline.run_traced(&report).await;
    print_json(&run)?;

    if save {
        let photo_ref = match report.photo() {
            Some(photo) => Some(
                FsPhotoStore::from_env()?
                    .put(photo)
                    .await
                    .context("Failed to store photo")?,
            ),
            None => None,
        };
        let store = SurrealReportStore::from_env()
            .await
            .context("Failed to connect to report database")?;
        let record = store
            .insert(NewReport::from_outcome(&submitter, &run.outcome, photo_ref))
            .await
            .context("Failed to save report")?;
        info!(report_id = %record.report_id, "report saved");
        eprintln!("Saved report {}", record.report_id);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ExtractReport {
    found: bool,
    explanation: Option<String>,
    tags: Option<String>,
    issues: Vec<String>,
}

fn extract_report(raw: &str, max_tags_len: usize) -> ExtractReport {
    match extract_object(raw) {
        Some(object) => {
            let normalized = normalize(&object, max_tags_len);
            ExtractReport {
                found: true,
                explanation: normalized.explanation,
                tags: normalized.tags.map(|t| t.into_string()),
                issues: normalized.issues.iter().map(|e| e.to_string()).collect(),
            }
        }
        None => ExtractReport {
            found: false,
            explanation: None,
            tags: None,
            issues: Vec::new(),
        },
    }
}

fn cmd_extract(config: &PipelineConfig, file: Option<&Path>) -> Result<()> {
    let raw = match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    print_json(&extract_report(&raw, config.max_tags_len))
}

async fn cmd_transcribe(
    config: &PipelineConfig,
    audio: &Path,
    mime: &str,
    script: &str,
) -> Result<()> {
    let script: Script = script.parse()?;
    let bytes = std::fs::read(audio).with_context(|| format!("Failed to read {:?}", audio))?;
    let encoded = Media::new(mime, bytes).to_base64();

    let transcriber = Transcriber::new(live_model()?, config.transcribe_timeout());
    let transcription = transcriber.transcribe(&encoded, mime, script).await?;
    print_json(&transcription)
}

async fn cmd_reports(tag: Option<&str>, limit: usize) -> Result<()> {
    let store = SurrealReportStore::from_env()
        .await
        .context("Failed to connect to report database")?;
    let records = match tag {
        Some(tag) => store.list_by_tag(tag, limit).await?,
        None => store.list(limit).await?,
    };

    if records.is_empty() {
        println!("No reports found.");
        return Ok(());
    }
    for record in records {
        println!("report {}", record.report_id);
        println!("From:   {}", record.submitter_id);
        println!("Date:   {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
        if let Some(tags) = &record.tags {
            println!("Tags:   {}", tags);
        }
        if let Some(photo) = &record.photo_ref {
            println!("Photo:  {}", photo);
        }
        println!();
        println!("    {}", record.description);
        println!();
    }
    Ok(())
}
