mod config;
mod emailer;
mod errors;
mod llm_client;
mod loader;
mod models;
mod pipeline;
mod scoring;
mod usage;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, PipelineConfig};
use crate::emailer::EmailDecisionGate;
use crate::errors::PipelineError;
use crate::llm_client::OpenAiClient;
use crate::loader::{enumerate_documents, FsDocumentLoader};
use crate::models::role::RoleDefinition;
use crate::pipeline::orchestrator::{write_report, BatchOrchestrator};
use crate::pipeline::worker::ExtractionWorker;
use crate::usage::UsageMeter;

#[derive(Parser)]
#[command(name = "cvpipe")]
#[command(about = "Resume extraction and outreach email pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract structured candidate records from a directory of resumes
    Parse {
        /// Directory containing .pdf / .docx / .txt resumes
        #[arg(long)]
        input: PathBuf,
        /// Output JSON file for records and run statistics
        #[arg(long, default_value = "parsed_resumes.json")]
        output: PathBuf,
        #[arg(long, default_value_t = 10)]
        batch_size: usize,
        #[arg(long, default_value_t = 3)]
        workers: usize,
        /// Pause between chunks in seconds; 0 disables pacing
        #[arg(long, default_value_t = 5)]
        pacing_secs: u64,
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
    },
    /// Generate personalized outreach emails for parsed candidates
    Email {
        /// Parsed resumes file produced by `parse`
        #[arg(long)]
        resumes: PathBuf,
        /// Role definition JSON file
        #[arg(long)]
        role: PathBuf,
        #[arg(long, default_value = "emails")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvpipe v{}", env!("CARGO_PKG_VERSION"));
    let client = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_api_base.clone(),
        config.openai_model.clone(),
    ));

    match cli.command {
        Command::Parse {
            input,
            output,
            batch_size,
            workers,
            pacing_secs,
            max_retries,
        } => {
            let pipeline_config = PipelineConfig {
                batch_size,
                worker_count: workers,
                max_retries,
                pacing: Duration::from_secs(pacing_secs),
            };
            run_parse(client, &input, &output, pipeline_config).await
        }
        Command::Email {
            resumes,
            role,
            output_dir,
        } => run_email(client, &resumes, &role, &output_dir).await,
    }
}

async fn run_parse(
    client: Arc<OpenAiClient>,
    input: &PathBuf,
    output: &PathBuf,
    pipeline_config: PipelineConfig,
) -> Result<()> {
    let documents = enumerate_documents(input)?;
    info!(
        "Found {} supported files in {}",
        documents.len(),
        input.display()
    );
    if documents.is_empty() {
        return Err(PipelineError::NoDocuments(input.clone()).into());
    }

    let meter = Arc::new(UsageMeter::new());
    let worker = ExtractionWorker::new(
        Arc::new(FsDocumentLoader),
        client,
        Arc::clone(&meter),
        pipeline_config.max_retries,
    );
    let orchestrator = BatchOrchestrator::new(worker, Arc::clone(&meter), pipeline_config);

    let (results, statistics) = orchestrator.run(&documents).await;
    write_report(output, &results, &statistics)?;

    info!(
        "Parsed {} resumes: {} successful, {} failed, {} tokens used",
        statistics.total_processed,
        statistics.successful,
        statistics.failed,
        statistics.api_usage.total_tokens
    );
    Ok(())
}

async fn run_email(
    client: Arc<OpenAiClient>,
    resumes: &PathBuf,
    role_path: &PathBuf,
    output_dir: &PathBuf,
) -> Result<()> {
    let role = RoleDefinition::from_file(role_path)?;
    info!("Generating outreach emails for '{}' at {}", role.title, role.company);

    let gate = EmailDecisionGate::new(client);
    let output = emailer::process_batch(&gate, resumes, &role, output_dir).await?;
    info!("Email run report written to {}", output.display());
    Ok(())
}
