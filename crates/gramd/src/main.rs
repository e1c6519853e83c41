use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gram_ai::{
    GeminiClient, GenerativeModel, GoogleTranslateClient, ModelAnalyzer, TranslateConfig,
};
use gram_core::telemetry::init_tracing;
use gram_core::{PipelineConfig, ReportPipeline, Transcriber};
use gram_store::{DbConfig, FsPhotoStore, SurrealReportStore};
use gramd::{build_router, AppState};
use tracing::{info, Level};

#[derive(Debug, Parser)]
#[command(name = "gramd", about = "GramConnect report intake daemon", version)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "GRAMD_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Pipeline config file (TOML, `[pipeline]` table)
    #[arg(long, env = "GRAM_CONFIG")]
    config: Option<PathBuf>,

    /// Report database URL (mem://, surrealkv://path, ws://host:port)
    #[arg(long, env = "GRAM_DB_URL", default_value = gram_store::DEFAULT_DB_URL)]
    db_url: String,

    /// Directory for uploaded photos
    #[arg(long, env = "GRAM_UPLOADS_DIR", default_value = ".gramconnect/uploads")]
    uploads_dir: PathBuf,

    /// Emit JSON log lines
    #[arg(long, env = "GRAM_LOG_JSON")]
    log_json: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_json, args.log_level);

    let config = PipelineConfig::load(args.config.as_deref()).context("loading pipeline config")?;

    let model: Arc<dyn GenerativeModel> =
        Arc::new(GeminiClient::from_env().context("building Gemini client")?);
    let translator = Arc::new(
        GoogleTranslateClient::new(TranslateConfig::from_env())
            .context("building translate client")?,
    );
    let analyzer = Arc::new(ModelAnalyzer::new(model.clone()));

    let transcriber = Transcriber::new(model, config.transcribe_timeout());
    let pipeline = ReportPipeline::new(translator, analyzer, config);

    let mut db_config = DbConfig::from_env();
    db_config.url = args.db_url;
    let reports = SurrealReportStore::connect(db_config)
        .await
        .context("connecting to report database")?;
    let photos = FsPhotoStore::new(&args.uploads_dir)
        .with_context(|| format!("creating uploads dir {}", args.uploads_dir.display()))?;

    let state = AppState::new(pipeline, Arc::new(reports), Arc::new(photos), transcriber);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!("gramd listening on http://{}", args.bind);
    info!("Health check: http://{}/health", args.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
