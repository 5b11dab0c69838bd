use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use resumen_ingest::{ExtractOptions, StatementImporter, StatementUpload, TextExtractor};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

mod config;
mod render;
mod state;

use render::OutputFormat;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("RESUMEN_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "resumen", version = VERSION, about = "Read expense lines out of Argentine credit-card statement PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement PDF into expense lines
    Parse {
        file: PathBuf,

        /// Output format (default: from config, else table)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Rule set TOML (default: ~/.resumen/rules.toml if present)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Reject files larger than this many bytes
        #[arg(long)]
        max_bytes: Option<usize>,

        /// Only scan raw bytes; do not render content streams
        #[arg(long)]
        raw_only: bool,
    },

    /// Print the text recovered from a PDF, before interpretation
    ExtractText {
        file: PathBuf,

        #[arg(long)]
        raw_only: bool,
    },

    /// Manage the statement rule set
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },

    /// Manage ~/.resumen/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Write the built-in rules to ~/.resumen/rules.toml
    Init,

    /// Print the effective rules as TOML
    Show {
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml
    Init,

    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Parse {
            file,
            format,
            rules,
            max_bytes,
            raw_only,
        } => {
            let cfg = config::load_config()?;
            let rules = config::load_rules(rules.as_deref(), &cfg)?;
            let options = extract_options(raw_only || cfg.raw_only);
            let importer = StatementImporter::new(rules, options)?
                .with_max_upload_bytes(max_bytes.unwrap_or(cfg.max_upload_bytes));

            let bytes = read_file(&file)?;
            let filename = file_name(&file);
            let result = importer
                .import_upload(StatementUpload {
                    filename: &filename,
                    bytes: &bytes,
                })
                .map_err(|e| {
                    log::debug!("{} failed: {}", filename, e.kind());
                    let msg = e.user_message();
                    anyhow::Error::new(e).context(msg)
                })?;

            let mut stdout = std::io::stdout().lock();
            render::render(&mut stdout, &result, format.unwrap_or(cfg.output))?;
            stdout.flush()?;
        }

        Command::ExtractText { file, raw_only } => {
            let extractor = TextExtractor::new(extract_options(raw_only))?;
            let bytes = read_file(&file)?;
            let text = extractor
                .extract(&bytes)
                .with_context(|| format!("extracting text from {}", file.display()))?;
            println!("{}", text);
        }

        Command::Rules { command } => match command {
            RulesCommand::Init => config::init_rules()?,
            RulesCommand::Show { rules } => {
                let cfg = config::load_config()?;
                let rules = config::load_rules(rules.as_deref(), &cfg)?;
                print!("{}", config::rules_to_toml(&rules)?);
            }
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn extract_options(raw_only: bool) -> ExtractOptions {
    if raw_only {
        ExtractOptions::raw_only()
    } else {
        ExtractOptions::default()
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
