use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::{Parser, ValueEnum};
use miette::IntoDiagnostic;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use taxonomy_transformer::api::router;
use taxonomy_transformer::config::{Config, ConfigLoader, ResolvedConfig};
use taxonomy_transformer::error::TransformerError;
use taxonomy_transformer::health::HealthSettings;
use taxonomy_transformer::index::build_index;
use taxonomy_transformer::service::TaxonomyService;
use taxonomy_transformer::tme::TmeHttpClient;

#[derive(Parser)]
#[command(name = "taxonomy-transformer")]
#[command(about = "A RESTful API for transforming TME taxonomy terms to canonical JSON")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Log line format
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<TransformerError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &TransformerError) -> u8 {
    match error {
        TransformerError::InvalidConfig(_) => 2,
        TransformerError::TmeHttp(_)
        | TransformerError::TmeStatus { .. }
        | TransformerError::TmeParse(_) => 3,
        _ => 1,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_target(false).init(),
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let resolved = ConfigLoader::resolve_config(cli.config)?;
    let client = TmeHttpClient::new(resolved.source.clone())?;
    let service = Arc::new(TaxonomyService::new());

    spawn_index_build(client, Arc::clone(&service), &resolved).into_diagnostic()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    runtime.block_on(serve(resolved, service))?;
    Ok(())
}

/// Builds the index on its own thread and publishes the outcome once. The
/// server answers 503 on query routes until then.
fn spawn_index_build(
    client: TmeHttpClient,
    service: Arc<TaxonomyService>,
    resolved: &ResolvedConfig,
) -> std::io::Result<()> {
    let taxonomy = resolved.taxonomy.clone();
    let options = resolved.build.clone();
    thread::Builder::new()
        .name("index-build".to_string())
        .spawn(move || {
            let outcome = build_index(&client, &taxonomy, &options);
            match &outcome {
                Ok(index) => info!(entities = index.len(), "index published"),
                Err(err) => {
                    error!(error = %err, "error while building index, service is not ready")
                }
            }
            service.publish(outcome);
        })?;
    Ok(())
}

async fn serve(
    resolved: ResolvedConfig,
    service: Arc<TaxonomyService>,
) -> Result<(), TransformerError> {
    let health = HealthSettings {
        kind: resolved.taxonomy.kind,
        panic_guide: resolved.panic_guide,
    };
    let app = router(service, health);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", resolved.port))
        .await
        .map_err(|err| TransformerError::Server(format!("bind port {}: {err}", resolved.port)))?;
    info!(port = resolved.port, kind = %resolved.taxonomy.kind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| TransformerError::Server(err.to_string()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
