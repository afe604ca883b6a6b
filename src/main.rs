use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wpsql::config::{parse_column_value, ExtractOptions};
use wpsql::dumpfile::DumpFile;
use wpsql::extract::{check_distinct_outputs, Extraction};
use wpsql::schema::Table;
use wpsql::stats::ExtractionStats;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "wpsql")]
#[command(about = "Extract rows from Wikipedia SQL table dumps into CSV files")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one or more dump files into CSV
    Extract(ExtractArgs),
    /// List supported tables and their columns
    Tables,
}

#[derive(Args)]
struct ExtractArgs {
    /// Dump files named WIKI-YYYYMMDD-TABLE.sql[.gz|.bz2]
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for CSV files
    #[arg(short, long)]
    output: PathBuf,

    /// JSON file with keep_columns, allowlists, blocklists, batch_size, max_statements
    #[arg(long)]
    filters: Option<PathBuf>,

    /// Columns to write, in output order (default: all)
    #[arg(long, value_delimiter = ',')]
    keep: Option<Vec<String>>,

    /// Keep only rows whose COLUMN equals VALUE (repeatable)
    #[arg(long, value_name = "COLUMN=VALUE", value_parser = parse_column_value)]
    allow: Vec<(String, String)>,

    /// Drop rows whose COLUMN equals VALUE (repeatable)
    #[arg(long, value_name = "COLUMN=VALUE", value_parser = parse_column_value)]
    block: Vec<(String, String)>,

    /// Rows buffered per CSV write
    #[arg(long)]
    batch_size: Option<usize>,

    /// Stop after this many INSERT statements per file
    #[arg(long)]
    max_statements: Option<u64>,

    /// Number of files extracted concurrently (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Disable progress spinners
    #[arg(long)]
    no_progress: bool,
}

fn build_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let mut options = match &args.filters {
        Some(path) => ExtractOptions::from_json_file(path)?,
        None => ExtractOptions::default(),
    };
    if let Some(keep) = &args.keep {
        options.keep_columns = Some(keep.clone());
    }
    options.allow(&args.allow);
    options.block(&args.block);
    if let Some(batch_size) = args.batch_size {
        options.batch_size = batch_size;
    }
    if args.max_statements.is_some() {
        options.max_statements = args.max_statements;
    }
    Ok(options)
}

fn make_spinner(mp: &MultiProgress, label: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = mp.add(ProgressBar::new_spinner());
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {prefix} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(200));
    pb
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let options = build_options(&args)?;

    // every file is validated before any of them is read
    let extractions = args
        .inputs
        .iter()
        .map(|input| {
            let dump = DumpFile::new(input)
                .with_context(|| format!("Cannot extract {:?}", input))?;
            Extraction::prepare(dump, &options)
        })
        .collect::<Result<Vec<_>>>()?;
    check_distinct_outputs(&extractions, &args.output)?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {:?}", args.output))?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .thread_name(|i| format!("wpsql-extract-{}", i))
        .build()
        .context("Failed to build worker pool")?;

    let start = Instant::now();
    let totals = ExtractionStats::new();
    let mp = MultiProgress::new();
    let show_progress = !args.no_progress;

    pool.install(|| {
        extractions.par_iter().try_for_each(|extraction| -> Result<()> {
            let label = extraction.dump.name.basename.clone();
            let pb = make_spinner(&mp, &label, show_progress);
            let (path, stats) = extraction.to_csv(&args.output, pb)?;
            totals.absorb(&stats);
            info!(
                output = %path.display(),
                matched = stats.rows_matched,
                written = stats.rows_written,
                "File complete"
            );
            Ok(())
        })
    })?;

    let elapsed = start.elapsed();
    println!();
    println!("=== Summary ===");
    println!("Total time:         {:.2}s", elapsed.as_secs_f64());
    println!("Files processed:    {}", totals.files());
    println!("Lines read:         {}", totals.lines());
    println!("INSERT statements:  {}", totals.statements());
    println!("Rows matched:       {}", totals.matched());
    println!("Rows written:       {}", totals.written());
    println!("Rows filtered out:  {}", totals.dropped());
    println!("Unmatched spans:    {}", totals.unmatched());

    Ok(())
}

fn run_tables() -> Result<()> {
    for table in Table::ALL {
        println!("{}", table);
        for column in table.schema().columns {
            let mut flags = Vec::new();
            if column.nullable {
                flags.push("nullable");
            }
            if column.unquote {
                flags.push("unquote");
            }
            if column.unescape {
                flags.push("unescape");
            }
            println!("  {:<22} {}", column.name, flags.join(" "));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Tables => run_tables(),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
