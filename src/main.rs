use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use logfwd_gen::compiler::{self, Element, graph, ids};
use logfwd_gen::config::CompilerConfig;
use logfwd_gen::render;
use logfwd_gen::spec::{Forwarder, ForwarderSpec, Secrets};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "logfwd-gen")]
#[command(about = "Log forwarder pipeline compiler", long_about = None)]
struct Cli {
    /// Log filter (overrides the config file; RUST_LOG overrides both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a forwarder into collector configuration.
    Compile {
        /// Forwarder specification (JSON).
        #[arg(long)]
        spec: String,

        /// Secrets keyed by output name (JSON).
        #[arg(long)]
        secrets: Option<String>,

        /// Generator configuration (TOML).
        #[arg(long)]
        config: Option<String>,

        /// Output file; stdout when absent.
        #[arg(short = 'o', long)]
        out: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Toml)]
        format: Format,
    },

    /// Validate and compile without writing anything.
    Check {
        #[arg(long)]
        spec: String,

        #[arg(long)]
        secrets: Option<String>,

        #[arg(long)]
        config: Option<String>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Toml,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Compile {
            spec,
            secrets,
            config,
            out,
            format,
        } => {
            let config = load_config(config.as_deref())?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.log.level))?;

            let elements = build(&spec, secrets.as_deref(), &config)?;
            let rendered = match format {
                Format::Toml => render::to_toml(&elements)?,
                Format::Json => render::to_json(&elements)?,
            };

            match out {
                Some(out) => {
                    std::fs::write(&out, rendered).with_context(|| format!("writing {}", out))?;
                    eprintln!("Wrote {}", out);
                }
                None => print!("{}", rendered),
            }
        }
        Commands::Check {
            spec,
            secrets,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.log.level))?;

            let elements = build(&spec, secrets.as_deref(), &config)?;
            println!("{}: {} components OK", spec, elements.len());
        }
    }

    Ok(())
}

/// Load + validate the forwarder, compile it, and verify the resulting graph.
fn build(spec: &str, secrets: Option<&str>, config: &CompilerConfig) -> Result<Vec<Element>> {
    // 1) Parse + validate the forwarder.
    let raw: ForwarderSpec = read_json(spec)?;
    let forwarder: Forwarder = raw
        .validate_and_build()
        .with_context(|| format!("invalid forwarder spec {}", spec))?;

    // 2) Secrets are optional; without them only the fallback-free paths apply.
    let secrets: Secrets = match secrets {
        Some(path) => read_json(path)?,
        None => Secrets::new(),
    };
    debug!(secrets = secrets.len(), "loaded secrets");

    // 3) Compile.
    let elements = compiler::compile(&forwarder, &secrets, &config.generator);

    // 4) Verify before anything is written.
    graph::verify(&elements, &ids::raw_sources(&forwarder))
        .context("compiled graph failed verification")?;
    info!(spec, components = elements.len(), "compiled forwarder");

    Ok(elements)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path))
}

fn load_config(path: Option<&str>) -> Result<CompilerConfig> {
    match path {
        Some(path) => Ok(CompilerConfig::from_file(Path::new(path))?),
        None => Ok(CompilerConfig::default()),
    }
}

/// Initialize logging to stderr; RUST_LOG wins over `level`.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();

    Ok(())
}
