mod config;
mod provider;
mod registry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use catalchemy_core::{EntityKind, Error as CoreError, entity_json_schema};
use catalchemy_generate::{
    BrandGuide, CatalogPipeline, CsvExporter, GenerationError, plan_catalog,
};
use config::{ConfigError, Settings};
use provider::OpenAiClient;
use registry::{RunContext, init_run_logging, start_run, write_report};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "catalchemy", version, about = "Catalchemy catalog generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a full catalog and export it as CSV.
    Generate(GenerateArgs),
    /// Print the entity quantities for a product target.
    Plan(PlanArgs),
    /// Print the JSON Schema of one entity kind.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of products to generate.
    #[arg(long, default_value_t = 10_000)]
    products: u64,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    out: PathBuf,
    /// Markdown brand guide used as shared prompt context.
    #[arg(long, default_value = "docs/brand_guide.md")]
    brand_guide: PathBuf,
    /// Seed for ids and parent selection. Drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Token budget above which the brand guide is summarized.
    #[arg(long)]
    context_tokens: Option<usize>,
    /// Optional TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[arg(long)]
    products: u64,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// brand, collection, product or review.
    kind: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Plan(args) => run_plan(args),
        Command::Schema(args) => run_schema(args),
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        products,
        out,
        brand_guide,
        seed,
        context_tokens,
        config,
    } = args;

    let mut settings = Settings::load(config.as_deref())?;
    settings.apply_env()?;
    if seed.is_some() {
        settings.seed = seed;
    }
    if let Some(tokens) = context_tokens {
        settings.context_tokens = tokens;
    }
    let seed = settings.resolve_seed(rand::random);

    // Fail before anything lands on disk.
    let plan = plan_catalog(products)?;
    let api_key = settings.require_api_key()?.to_string();
    if !brand_guide.is_file() {
        return Err(CliError::InvalidConfig(format!(
            "brand guide not found at {}",
            brand_guide.display()
        )));
    }

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir: out,
        products,
        plan,
        brand_guide: brand_guide.clone(),
        settings: settings.clone(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    let client = Arc::new(OpenAiClient::new(
        settings.model.clone(),
        api_key,
        settings.base_url.clone(),
    )?);
    tracing::info!(event = "run_started", run_id = %run_id, model = client.model(), products, seed);

    let timer = Instant::now();
    let context = BrandGuide::new(&brand_guide)
        .with_summarizer(client.clone(), settings.context_tokens);
    let exporter = CsvExporter::new(&run_paths.run_root);
    let pipeline = CatalogPipeline::new(
        client,
        Arc::new(context),
        Arc::new(exporter),
        settings.pipeline_options(),
    )
    .with_run_id(run_id.clone());

    let result = match pipeline.run(products).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(event = "run_finished", status = "failed", code = err.code(), error = %err);
            return Err(err.into());
        }
    };

    write_report(&run_paths, &result.report)?;
    tracing::info!(event = "report_written", path = %run_paths.report_path.display());

    for stage in &result.report.stages {
        println!(
            "{:<12} requested={:<6} generated={:<6} retries={:<4} renames={}",
            stage.kind.table_name(),
            stage.requested,
            stage.generated,
            stage.retries,
            stage.renames.len()
        );
    }
    println!("warnings: {}", result.report.warnings.len());
    println!("run: {}", run_paths.run_root.display());

    tracing::info!(
        event = "run_finished",
        status = "success",
        stage = %result.stage,
        duration_ms = timer.elapsed().as_millis() as u64
    );

    Ok(())
}

fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let plan = plan_catalog(args.products)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn run_schema(args: SchemaArgs) -> Result<(), CliError> {
    let kind: EntityKind = args.kind.parse()?;
    let schema = entity_json_schema(kind);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
