//! upc-tool - command-line host for the UPC normalizer
//!
//! Subcommands:
//! - `check-digit` / `validate` - GS1 check digit math
//! - `normalize` - one raw UPC or a CSV batch under a brand policy
//! - `audit` - check a stored UPC against a brand policy
//! - `planogram` - parse an OCR text dump into product rows

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use upc_normalizer::{
    audit_product_upc, compute_check_digit, load_records, normalize_batch, normalize_upc,
    validate_gs1, write_accepted_csv, BrandCatalog, BrandUpcConfig, PlanogramParser,
};

/// UPC normalization and planogram parsing tool
#[derive(Parser, Debug)]
#[command(name = "upc-tool", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the GS1 check digit for an 11-digit payload
    CheckDigit { digits: String },

    /// Check a 12-digit UPC-A against its check digit
    Validate { code: String },

    /// Normalize a raw UPC (or a CSV of them) under a brand policy
    Normalize {
        #[command(flatten)]
        brand: BrandArgs,

        /// CSV file with an `upc,name` header
        #[arg(short, long, conflicts_with = "upc")]
        input: Option<PathBuf>,

        /// Single raw UPC
        #[arg(required_unless_present = "input")]
        upc: Option<String>,

        /// Product display name, for prefix overrides
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Audit a stored UPC against a brand policy
    Audit {
        #[command(flatten)]
        brand: BrandArgs,

        #[arg(short, long)]
        upc: String,

        #[arg(short, long)]
        name: Option<String>,
    },

    /// Parse a planogram OCR text dump
    Planogram {
        file: PathBuf,

        /// Fail on repeated UPCs
        #[arg(long)]
        unique_upcs: bool,

        /// Fail on repeated locations
        #[arg(long)]
        unique_locations: bool,

        /// Print JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct BrandArgs {
    /// Path to the brand catalog JSON file
    #[arg(long, env = "UPC_BRANDS_FILE", default_value = "config/brands.json")]
    brands: PathBuf,

    /// Brand name in the catalog
    #[arg(short, long)]
    brand: String,
}

impl BrandArgs {
    fn load(&self) -> Result<BrandUpcConfig> {
        let catalog = BrandCatalog::from_file(&self.brands)?;
        let config = catalog
            .get(&self.brand)
            .cloned()
            .ok_or_else(|| {
                let known: Vec<&str> = catalog.names().collect();
                anyhow!(
                    "Brand {:?} not found in {} (known brands: {})",
                    self.brand,
                    self.brands.display(),
                    known.join(", ")
                )
            })?;

        if let Err(issues) = config.validate() {
            for issue in issues {
                warn!(brand = %self.brand, "{}", issue);
            }
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    // RUST_LOG overrides, default INFO; logs go to stderr so stdout stays data
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::CheckDigit { digits } => {
            let check = compute_check_digit(&digits)?;
            println!("{}", check);
        }
        Command::Validate { code } => {
            println!("{}", if validate_gs1(&code) { "valid" } else { "invalid" });
        }
        Command::Normalize {
            brand,
            input,
            upc,
            name,
        } => {
            let config = brand.load()?;
            match (input, upc) {
                (Some(path), _) => run_batch(&path, &config)?,
                (None, Some(raw)) => {
                    let normalized = normalize_upc(&raw, name.as_deref(), &config)
                        .with_context(|| format!("Could not normalize UPC {:?}", raw))?;
                    println!("{}", normalized);
                }
                (None, None) => bail!("Either a UPC or --input is required"),
            }
        }
        Command::Audit { brand, upc, name } => {
            let config = brand.load()?;
            match audit_product_upc(upc.trim(), name.as_deref(), &config) {
                Ok(()) => println!("ok"),
                Err(violations) => {
                    for violation in &violations {
                        println!("{}", violation);
                    }
                    bail!("{} policy violation(s) for UPC {}", violations.len(), upc);
                }
            }
        }
        Command::Planogram {
            file,
            unique_upcs,
            unique_locations,
            json,
        } => {
            let parser = PlanogramParser::new()
                .with_unique_upcs(unique_upcs)
                .with_unique_locations(unique_locations);
            run_planogram(&file, &parser, json)?;
        }
    }

    Ok(())
}

fn run_batch(path: &Path, config: &BrandUpcConfig) -> Result<()> {
    let records = load_records(path)?;
    info!(records = records.len(), path = %path.display(), "loaded raw UPC records");

    let report = normalize_batch(&records, config);
    write_accepted_csv(&report, io::stdout().lock())?;

    info!(run_id = %report.run_id, "{}", report.summary.summary());
    Ok(())
}

fn run_planogram(path: &Path, parser: &PlanogramParser, json: bool) -> Result<()> {
    let parse = parser.parse_file(path)?;

    if json {
        let out = serde_json::to_string_pretty(&parse).context("Failed to serialize planogram")?;
        println!("{}", out);
        return Ok(());
    }

    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    wtr.write_record(["location", "upc", "name"])?;
    for product in &parse.products {
        wtr.write_record([&product.location, &product.upc, &product.product_name])?;
    }
    wtr.flush()?;

    if !parse.rejected.is_empty() {
        warn!(count = parse.rejected.len(), "planogram lines were not parsed");
    }

    Ok(())
}
