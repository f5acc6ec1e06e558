mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use clausewise_ai::{
    AnalysisClient, AnalysisReply, GatedClient, GeminiClient, GeminiConfig, PromptBuilder,
    normalize, select_view,
};
use clausewise_core::UploadLimits;
use clausewise_extract::extract_from_bytes;
use clausewise_server::{AppState, Pipeline};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clausewise")]
#[command(about = "Contract PDF extraction and analysis")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "CLAUSEWISE_HOST", default_value = "127.0.0.1")]
        host: String,
        #[arg(long, env = "CLAUSEWISE_PORT", default_value_t = 3000)]
        port: u16,
        #[command(flatten)]
        upload: UploadArgs,
        #[command(flatten)]
        prompt: PromptArgs,
    },

    /// Print the text extracted from a PDF
    Extract {
        path: PathBuf,
        #[command(flatten)]
        upload: UploadArgs,
    },

    /// Print the analysis request that would be sent for a PDF
    Prompt {
        path: PathBuf,
        #[command(flatten)]
        upload: UploadArgs,
        #[command(flatten)]
        prompt: PromptArgs,
    },

    /// Extract and analyze a PDF, then print the result
    Analyze {
        path: PathBuf,
        /// Print the record and view as JSON instead of a card
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        upload: UploadArgs,
        #[command(flatten)]
        prompt: PromptArgs,
    },

    /// Normalize a saved analysis reply and print the result
    Normalize {
        /// File holding the raw reply text
        path: PathBuf,
        /// Print the record and view as JSON instead of a card
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct UploadArgs {
    /// Maximum upload size in MB
    #[arg(long, env = "CLAUSEWISE_MAX_UPLOAD_MB", default_value_t = 10)]
    max_upload_mb: usize,
}

impl UploadArgs {
    fn limits(&self) -> UploadLimits {
        UploadLimits::from_megabytes(self.max_upload_mb)
    }
}

#[derive(Args)]
struct PromptArgs {
    /// Truncate contract text sent for analysis to this many characters
    #[arg(long)]
    max_chars: Option<usize>,
}

impl PromptArgs {
    fn builder(&self) -> PromptBuilder {
        PromptBuilder {
            max_text_chars: self.max_chars,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    tracing::debug!("clausewise v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve {
            host,
            port,
            upload,
            prompt,
        } => {
            let pipeline = pipeline(&upload, &prompt)?;
            clausewise_server::serve(AppState::new(pipeline), &host, port).await
        }
        Command::Extract { path, upload } => {
            let bytes = read_file(&path)?;
            let text = extract_from_bytes(bytes, None, &upload.limits())
                .with_context(|| format!("extracting text from {}", path.display()))?;
            println!("{}", text.as_str());
            Ok(())
        }
        Command::Prompt {
            path,
            upload,
            prompt,
        } => {
            let bytes = read_file(&path)?;
            let text = extract_from_bytes(bytes, None, &upload.limits())
                .with_context(|| format!("extracting text from {}", path.display()))?;
            let request = prompt.builder().build(&text);
            if request.is_truncated() {
                tracing::info!(chars = text.char_count(), "contract text truncated");
            }
            println!("{}", request.prompt());
            Ok(())
        }
        Command::Analyze {
            path,
            json,
            upload,
            prompt,
        } => {
            let pipeline = pipeline(&upload, &prompt)?;
            let doc = pipeline.accept(read_file(&path)?, None)?;
            let doc = match path.file_name() {
                Some(name) => doc.with_file_name(name.to_string_lossy()),
                None => doc,
            };
            let analysis = pipeline
                .run(doc)
                .await
                .with_context(|| format!("analyzing {}", path.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                display::print_contract_card(&analysis.record, &analysis.view);
            }
            Ok(())
        }
        Command::Normalize { path, json } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let record = normalize(&AnalysisReply::new(raw))
                .with_context(|| format!("normalizing reply in {}", path.display()))?;
            let view = select_view(&record);
            if json {
                let out = serde_json::json!({ "record": record, "view": view });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                display::print_contract_card(&record, &view);
            }
            Ok(())
        }
    }
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn pipeline(upload: &UploadArgs, prompt: &PromptArgs) -> anyhow::Result<Pipeline> {
    let config = GeminiConfig::from_env();
    tracing::debug!(?config, "analysis client configuration");
    let client = GeminiClient::new(&config).context("configuring the Gemini client")?;
    let client: Arc<dyn AnalysisClient> = match config.max_concurrency {
        Some(limit) => Arc::new(GatedClient::new(client, limit)),
        None => Arc::new(client),
    };
    Ok(Pipeline::new(client)
        .with_limits(upload.limits())
        .with_prompt_builder(prompt.builder()))
}
