//! CLI binary for bp-vision.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `AnalyzerConfig`, then either serves HTTP or analyses local
//! files once.

use anyhow::{Context, Result};
use bp_vision::{serve, Analyzer, AnalyzerConfig, Report, Upload, Variant};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the single-image form on $PORT (default 5000)
  bp-vision serve

  # Serve the multi-image form on port 8080
  bp-vision serve --variant multi --port 8080

  # Analyse local photos without starting a server
  bp-vision analyze morning.jpg
  bp-vision analyze morning.jpg evening.jpg --check

  # Use another provider through edgequake-llm
  bp-vision --provider openai --model gpt-4.1-mini analyze reading.png

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY        Google Gemini API key (default backend)
  PORT                  HTTP port for `serve` (default 5000)
  BP_VISION_MODEL       Model ID (default gemini-1.5-flash)
  BP_VISION_PROVIDER    edgequake-llm provider name (openai, anthropic, ollama, …)
  OPENAI_API_KEY        Read by edgequake-llm when --provider openai
  ANTHROPIC_API_KEY     Read by edgequake-llm when --provider anthropic
  RUST_LOG              Log filter, overrides --verbose
"#;

/// Read blood-pressure monitor photos with a Vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "bp-vision",
    version,
    about = "Read blood-pressure monitor photos with a Vision LLM and return JSON",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "BP_VISION_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Model ID passed to the provider.
    #[arg(long, global = true, env = "BP_VISION_MODEL", default_value = bp_vision::config::DEFAULT_MODEL)]
    model: String,

    /// edgequake-llm provider name; omit for native Gemini.
    #[arg(long, global = true, env = "BP_VISION_PROVIDER")]
    provider: Option<String>,

    /// Gemini API key.
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Sampling temperature (0.0–2.0). Model default when unset.
    #[arg(long, global = true, env = "BP_VISION_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max output tokens. Model default when unset.
    #[arg(long, global = true, env = "BP_VISION_MAX_TOKENS")]
    max_tokens: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload form and POST /analyze.
    Serve {
        /// Which pipeline POST /analyze runs.
        #[arg(long, env = "BP_VISION_VARIANT", value_enum, default_value = "single")]
        variant: VariantArg,

        /// Interface to bind.
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to bind.
        #[arg(short, long, env = "PORT", default_value_t = bp_vision::config::DEFAULT_PORT)]
        port: u16,

        /// Largest accepted request body in MiB.
        #[arg(long, env = "BP_VISION_MAX_UPLOAD_MB", default_value_t = 16)]
        max_upload_mb: usize,
    },

    /// Analyse local image files and print the JSON envelope.
    Analyze {
        /// Image files, in reading order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Force a pipeline; default is single for one file, multi otherwise.
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// Warn when the model text does not match the requested schema.
        #[arg(long)]
        check: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum VariantArg {
    Single,
    Multi,
}

impl From<VariantArg> for Variant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Single => Variant::Single,
            VariantArg::Multi => Variant::Multi,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            variant,
            ref host,
            port,
            max_upload_mb,
        } => {
            let config = build_config(&cli.model)?
                .variant(variant.into())
                .host(host.clone())
                .port(port)
                .max_upload_bytes(max_upload_mb.saturating_mul(1024 * 1024))
                .build()
                .context("Invalid configuration")?;
            serve(&config).await.context("Server failed")?;
        }
        Command::Analyze {
            ref files,
            variant,
            check,
        } => {
            let variant = variant.map(Variant::from).unwrap_or(if files.len() > 1 {
                Variant::Multi
            } else {
                Variant::Single
            });
            let config = build_config(&cli.model)?
                .variant(variant)
                .build()
                .context("Invalid configuration")?;
            run_analyze(&config, files, check).await?;
        }
    }

    Ok(())
}

fn build_config(args: &ModelArgs) -> Result<bp_vision::AnalyzerConfigBuilder> {
    let mut builder = AnalyzerConfig::builder().model(args.model.clone());
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref key) = args.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(t) = args.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = args.max_tokens {
        builder = builder.max_tokens(n);
    }
    Ok(builder)
}

async fn run_analyze(config: &AnalyzerConfig, files: &[PathBuf], check: bool) -> Result<()> {
    let uploads = files
        .iter()
        .map(Upload::from_path)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read input files")?;

    let analyzer = Analyzer::from_config(config).context("Model is not configured")?;
    let envelope = analyzer
        .analyze(config.variant, uploads)
        .await
        .context("Analysis failed")?;

    if check {
        if let Some(text) = envelope.result_text() {
            match Report::parse(config.variant, text) {
                Ok(report) => {
                    for (i, reading) in report.readings().iter().enumerate() {
                        eprintln!(
                            "reading {}: {}/{} mmHg, pulse {}",
                            i + 1,
                            fmt_value(reading.systolic),
                            fmt_value(reading.diastolic),
                            fmt_value(reading.pulse)
                        );
                    }
                }
                Err(e) => warn!("Model output does not match the {} schema: {}", config.variant, e),
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn fmt_value(v: Option<u32>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string())
}
