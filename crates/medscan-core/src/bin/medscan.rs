//! MedScan command line interface
//!
//! ```bash
//! # Load a JSON catalog into a catalog database
//! medscan import --catalog medications.json --db medscan.db
//!
//! # Match OCR engine output files against the catalog
//! medscan scan --catalog medscan.db page1.json page2.json
//!
//! # Match raw text, then show interactions for the best match
//! medscan scan --catalog medications.json --text "Doliprane 1000 comprimés" --select 1
//!
//! # Interactions for an ingredient
//! medscan interactions --catalog medscan.db --ingredient Paracetamol
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use medscan_core::catalog::{load_json_catalog, CatalogSource};
use medscan_core::config::{ScanConfig, DEFAULT_LOG_FILTER};
use medscan_core::{Database, InteractionLookup, MatchReport, MedicationRecord, ScanError, Scanner};
use medscan_ocr::parse_engine_output;

#[derive(Parser)]
#[command(name = "medscan")]
#[command(version)]
#[command(about = "Identify medications from OCR text and look up drug interactions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON)
    #[arg(long, short, global = true, env = "MEDSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the contents of a catalog database with a JSON catalog
    Import {
        /// JSON array of catalog records
        #[arg(long)]
        catalog: PathBuf,

        /// Catalog database to write (created if missing)
        #[arg(long)]
        db: PathBuf,
    },

    /// Match recognized text against the catalog
    Scan {
        /// Catalog: `.json` record array or catalog database
        #[arg(long)]
        catalog: PathBuf,

        /// Raw recognized text (repeatable)
        #[arg(long)]
        text: Vec<String>,

        /// OCR engine output files
        files: Vec<PathBuf>,

        /// Show every candidate instead of the summary
        #[arg(long)]
        all: bool,

        /// Look up interactions for the Nth ranked candidate (1-based)
        #[arg(long)]
        select: Option<usize>,
    },

    /// Look up interactions for a catalog record or an ingredient
    Interactions {
        /// Catalog: `.json` record array or catalog database
        #[arg(long, required_unless_present = "ingredient")]
        catalog: Option<PathBuf>,

        /// Record name to look up in the catalog
        #[arg(long, conflicts_with = "ingredient", requires = "catalog")]
        name: Option<String>,

        /// Active ingredient to look up directly
        #[arg(long)]
        ingredient: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let format = cli.format;
    let config = ScanConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Import { catalog, db } => cmd_import(&catalog, &db),
        Commands::Scan {
            catalog,
            text,
            files,
            all,
            select,
        } => {
            let scanner = Scanner::from_config(&config, load_catalog_or_empty(&catalog))?;
            cmd_scan(&scanner, &text, &files, all, select, format)
        }
        Commands::Interactions {
            catalog,
            name,
            ingredient,
        } => {
            let records = catalog.as_deref().map(load_catalog_or_empty).unwrap_or_default();
            let scanner = Scanner::from_config(&config, records)?;
            cmd_interactions(&scanner, name.as_deref(), ingredient.as_deref(), format)
        }
    }
}

fn cmd_import(catalog: &Path, db_path: &Path) -> Result<ExitCode> {
    let records = load_json_catalog(catalog)
        .with_context(|| format!("reading catalog {}", catalog.display()))?;
    let mut db = Database::open(db_path)
        .with_context(|| format!("opening catalog database {}", db_path.display()))?;
    let count = db.replace_catalog(&records)?;

    println!("Imported {} records into {}", count, db_path.display());
    Ok(ExitCode::SUCCESS)
}

/// A failed load is reported and the run continues with no catalog.
fn load_catalog_or_empty(path: &Path) -> Vec<MedicationRecord> {
    match CatalogSource::from_path(path).load() {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "catalog load failed");
            Vec::new()
        }
    }
}

fn cmd_scan(
    scanner: &Scanner,
    texts: &[String],
    files: &[PathBuf],
    all: bool,
    select: Option<usize>,
    format: OutputFormat,
) -> Result<ExitCode> {
    if texts.is_empty() && files.is_empty() {
        bail!("nothing to scan: pass --text or OCR output files");
    }

    let mut inputs: Vec<(String, Result<String>)> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| (format!("--text #{}", i + 1), Ok(t.clone())))
        .collect();
    for file in files {
        inputs.push((file.display().to_string(), read_ocr_output(file)));
    }

    let mut failures = 0;
    for (label, text) in inputs {
        let text = match text {
            Ok(text) => text,
            Err(e) => {
                eprintln!("{}: {:#}", label, e);
                failures += 1;
                continue;
            }
        };

        let report = match scanner.match_text(&text) {
            Ok(report) => report,
            Err(ScanError::CatalogUnavailable) => {
                bail!("medication catalog is unavailable");
            }
            Err(e) => {
                eprintln!("{}: {}", label, e);
                failures += 1;
                continue;
            }
        };

        let shown = if all {
            report.all()
        } else {
            report.top(scanner.summary_size())
        };
        let selected = select.and_then(|n| shown.get(n.wrapping_sub(1)));
        if select.is_some() && selected.is_none() {
            warn!(input = %label, "selected candidate is not in the list");
        }
        let lookup = selected.map(|c| scanner.interactions_for(c.record));

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "input": label,
                    "recognized_text": report.recognized_text,
                    "features": report.features,
                    "candidates": shown,
                    "selected": selected.map(|c| c.record),
                    "interactions": lookup,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!("== {}", label);
                print_report(&report, shown.len());
                if let (Some(candidate), Some(lookup)) = (selected, &lookup) {
                    print_record_details(candidate.record);
                    print_interactions(lookup);
                }
            }
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_ocr_output(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading OCR output {}", path.display()))?;
    let detections = parse_engine_output(&raw).context("parsing OCR output")?;
    Ok(medscan_ocr::recognized_text(&detections))
}

fn cmd_interactions(
    scanner: &Scanner,
    name: Option<&str>,
    ingredient: Option<&str>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let lookup = match (name, ingredient) {
        (_, Some(ingredient)) => scanner.lookup_interactions(ingredient),
        (Some(name), None) => {
            let record = scanner
                .find_record(name)
                .with_context(|| format!("no catalog record named {:?}", name))?;
            if record.primary_ingredient().is_none() {
                bail!("record {:?} has no active ingredient", record.name);
            }
            scanner.interactions_for(record)
        }
        (None, None) => bail!("pass --name or --ingredient"),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lookup)?),
        OutputFormat::Text => print_interactions(&lookup),
    }

    Ok(if lookup.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(report: &MatchReport<'_>, shown: usize) {
    println!("Recognized: {}", report.recognized_text);
    if report.is_empty() {
        println!("No matching medication found.");
        return;
    }

    for (i, candidate) in report.candidates.iter().take(shown).enumerate() {
        let record = candidate.record;
        println!(
            "{:>2}. {} {} {}  score {:.1} (name {}, dosage {}){}",
            i + 1,
            record.name,
            record.dosage,
            record.form,
            candidate.total_score,
            candidate.name_score,
            candidate.dosage_score,
            candidate
                .matched_form
                .as_deref()
                .map(|f| format!(" [form: {}]", f))
                .unwrap_or_default(),
        );
    }
    if shown < report.candidates.len() {
        println!("    ... {} more (use --all)", report.candidates.len() - shown);
    }
}

fn print_record_details(record: &MedicationRecord) {
    println!("Selected medication:");
    for (label, value) in record.labeled_fields() {
        println!("  {:<20} {}", format!("{}:", label), value);
    }
}

fn print_interactions(lookup: &InteractionLookup) {
    if let Some(warning) = &lookup.warning {
        println!("Interaction lookup for {} failed: {}", lookup.ingredient, warning);
        return;
    }
    if lookup.entries.is_empty() {
        println!("No known interactions for {}.", lookup.ingredient);
        return;
    }

    println!(
        "Interactions for {}{}:",
        lookup.ingredient,
        if lookup.cached { " (cached)" } else { "" }
    );
    for entry in &lookup.entries {
        println!("  - {}", entry);
    }
}
