use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use compute::Sales;
use data::{PRODUCTS_FILE, PRODUCTS_REPORT_FILE, SALES_DIR, SALES_REPORT_FILE, SELLERS_FILE};
use generate::{generate, Fixture};
use rand::{rngs::StdRng, SeedableRng};
use read::{load_references, scan_sales_dir};
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{error, info};
use write::{
    product_ranking, salesperson_ranking, write_product_report, write_salesperson_report,
};

mod compute;
mod data;
mod generate;
mod logging;
mod read;
mod write;

/// Sales reports from flat seller, product and sales files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute both reports (the default)
    Report(ReportArgs),
    /// Make up a random set of input files
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
struct ReportArgs {
    /// Salesperson registry: docType;docNumber;firstName;lastName
    #[arg(long, default_value = SELLERS_FILE)]
    sellers: PathBuf,
    /// Product registry: productId;productName;price
    #[arg(long, default_value = PRODUCTS_FILE)]
    products: PathBuf,
    /// Folder holding one sales file per salesperson
    #[arg(long, default_value = SALES_DIR)]
    sales_dir: PathBuf,
    /// Where to write the sales-by-salesperson report
    #[arg(long, default_value = SALES_REPORT_FILE)]
    sales_report: PathBuf,
    /// Where to write the sales-by-product report
    #[arg(long, default_value = PRODUCTS_REPORT_FILE)]
    products_report: PathBuf,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            sellers: SELLERS_FILE.into(),
            products: PRODUCTS_FILE.into(),
            sales_dir: SALES_DIR.into(),
            sales_report: SALES_REPORT_FILE.into(),
            products_report: PRODUCTS_REPORT_FILE.into(),
        }
    }
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    /// Folder receiving the registries and the sales folder
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    #[arg(long, default_value_t = 10)]
    sellers: usize,
    #[arg(long, default_value_t = 15)]
    products: usize,
    #[arg(long, default_value_t = 30)]
    sales_per_seller: usize,
    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn save(path: &Path, contents: &[u8]) -> Result<(), anyhow::Error> {
    fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

/// The whole batch: references, then every sales file, then both reports.
/// Reports are rendered in memory and only written once everything else
/// succeeded, so a failed run leaves existing report files alone. Writing the
/// second file can still fail after the first one was replaced.
fn run_report(args: &ReportArgs) -> Result<(), anyhow::Error> {
    let references = load_references(&args.sellers, &args.products)?;
    let mut sales = Sales::new(&references.products);
    scan_sales_dir(&args.sales_dir, &mut sales)?;

    let mut by_salesperson = Vec::new();
    write_salesperson_report(
        &mut by_salesperson,
        &salesperson_ranking(&sales.revenue, &references.salespeople),
    )?;
    let mut by_product = Vec::new();
    write_product_report(
        &mut by_product,
        &product_ranking(&sales.quantities, &references.products),
    )?;

    save(&args.sales_report, &by_salesperson)?;
    save(&args.products_report, &by_product)?;
    Ok(())
}

fn run_generate(args: &GenerateArgs) -> Result<(), anyhow::Error> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let fixture = Fixture {
        sellers: args.sellers,
        products: args.products,
        sales_per_seller: args.sales_per_seller,
    };
    generate(&args.out_dir, fixture, &mut rng)
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    let (result, done) = match cli.command {
        Some(Command::Generate(args)) => (run_generate(&args), "Files generated successfully."),
        Some(Command::Report(args)) => (run_report(&args), "Reports generated successfully."),
        None => (
            run_report(&ReportArgs::default()),
            "Reports generated successfully.",
        ),
    };
    match result {
        Ok(()) => {
            println!("{done}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("run aborted: {e:#}");
            ExitCode::FAILURE
        }
    }
}
