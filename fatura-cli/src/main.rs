//! fatura CLI: card statement text in, spending breakdown out
//!
//! Usage:
//!   pdftotext statement.pdf statement.txt
//!   fatura parse  --pages statement.txt
//!   fatura report --pages statement.txt --knowledge categories.csv

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fatura_core::Transaction;
use fatura_finance::{FallbackClassifier, KnowledgeBase, categorize_spending, summarize};
use fatura_ingest::{IssuerProfile, StatementParser, split_pages};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod report;
mod state;

use config::{Config, UnresolvedPolicy};
use report::{Report, render_transactions};

#[derive(Parser, Debug)]
#[command(name = "fatura", version, about = "Credit-card statement parser and spending report")]
struct Cli {
    /// Config file (default: ~/.fatura/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct StatementArgs {
    /// Extracted statement text, pages separated by form feeds ("-" for stdin)
    #[arg(long)]
    pages: PathBuf,

    /// Issuer profile name (default from config)
    #[arg(long)]
    profile: Option<String>,

    /// Override the profile's number of leading pages to skip
    #[arg(long)]
    skip: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse statement text and list every transaction, payments included
    Parse {
        #[command(flatten)]
        statement: StatementArgs,
    },

    /// Parse, categorize with the merchant knowledge base, and summarize
    Report {
        #[command(flatten)]
        statement: StatementArgs,

        /// Merchant categories CSV (merchant,category,subcategory)
        #[arg(long)]
        knowledge: Option<PathBuf>,

        /// Subcategories listed per category
        #[arg(long)]
        top: Option<usize>,

        /// What to do with merchants the knowledge base does not know
        #[arg(long, value_enum)]
        unresolved: Option<UnresolvedPolicy>,
    },

    /// List available issuer profiles
    Profiles,

    /// Manage ~/.fatura/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Parse { statement } => {
            let txns = parse_statement(&cfg, &statement)?;
            if statement.json {
                println!("{}", serde_json::to_string_pretty(&txns)?);
            } else {
                print!("{}", render_transactions(&txns));
            }
        }

        Command::Report {
            statement,
            knowledge,
            top,
            unresolved,
        } => {
            let txns = parse_statement(&cfg, &statement)?;

            let kb = match knowledge.or_else(|| cfg.statement.knowledge_base.clone()) {
                Some(path) => KnowledgeBase::from_path(&path)
                    .with_context(|| format!("loading knowledge base {}", path.display()))?,
                None => {
                    info!("no knowledge base given; every merchant is unresolved");
                    KnowledgeBase::new()
                }
            };

            let categorization = match unresolved.unwrap_or(cfg.report.unresolved) {
                UnresolvedPolicy::Other => categorize_spending(&txns, &FallbackClassifier::other(kb)),
                UnresolvedPolicy::Skip => categorize_spending(&txns, &kb),
            };

            let summary = summarize(&categorization.categorized)?;
            let report = Report::new(
                &summary,
                top.unwrap_or(cfg.report.top),
                &categorization.unresolved,
            );

            if statement.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }

        Command::Profiles => {
            for p in cfg.all_profiles() {
                println!(
                    "{:<12} skip={} payment={:?} reversal={:?}",
                    p.name, p.skip_leading_pages, p.payment_marker, p.reversal_marker
                );
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => print!("{}", toml::to_string_pretty(&cfg)?),
        },
    }

    Ok(())
}

fn parse_statement(cfg: &Config, args: &StatementArgs) -> Result<Vec<Transaction>> {
    let mut profile: IssuerProfile =
        cfg.profile(args.profile.as_deref().unwrap_or(&cfg.statement.profile))?;
    if let Some(skip) = args.skip {
        profile = profile.with_skip_leading_pages(skip);
    }

    let text = read_text(&args.pages)?;
    let pages = split_pages(&text);

    let parser = StatementParser::new(profile)?;
    let txns = parser
        .parse(&pages)
        .with_context(|| format!("parsing {}", args.pages.display()))?;

    info!(
        "Parsed {} transactions from {} ({} pages)",
        txns.len(),
        args.pages.display(),
        pages.len()
    );
    Ok(txns)
}

fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut s = String::new();
        std::io::stdin()
            .read_to_string(&mut s)
            .context("reading stdin")?;
        return Ok(s);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
