//! Shoplens CLI - Analyze e-commerce transaction CSV exports
//!
//! # Commands
//!
//! ```bash
//! shoplens analyze data.csv               # Console report + all output files
//! shoplens derive data.csv -o out.csv     # Processed table only
//! shoplens describe data.csv              # Descriptive statistics and outliers
//! shoplens correlations data.csv --top 5  # Correlation matrix and top pairs
//! shoplens serve                          # Start HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use shoplens::config::AnalysisConfig;
use shoplens::pipeline::{analyze_csv, derive_csv, write_run, AnalyzeOptions};
use shoplens::report::console::{ConsoleReport, CorrelationReport, DescribeReport};
use shoplens::report::write_processed_csv;
use shoplens::LOG_BROADCASTER;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "shoplens")]
#[command(about = "Derive and aggregate e-commerce transaction CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full run: console report, processed CSV, summary, findings and dashboard JSON
    Analyze {
        /// Input CSV file
        input: PathBuf,

        /// Output directory (default: SHOPLENS_OUTPUT_DIR or ./output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip schema validation of the output documents
        #[arg(long)]
        no_validate: bool,

        /// Don't echo pipeline logs to stderr
        #[arg(short, long)]
        quiet: bool,
    },

    /// Write the processed table (original + derived columns)
    Derive {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show descriptive statistics, outliers and value counts
    Describe {
        /// Input CSV file
        input: PathBuf,
    },

    /// Show the correlation matrix and the strongest pairs
    Correlations {
        /// Input CSV file
        input: PathBuf,

        /// Number of pairs to show
        #[arg(long, default_value = "3")]
        top: usize,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: SHOPLENS_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AnalysisConfig::from_env();

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            no_validate,
            quiet,
        } => cmd_analyze(&input, output, no_validate, quiet, config),

        Commands::Derive { input, output } => cmd_derive(&input, output.as_deref()),

        Commands::Describe { input } => cmd_describe(&input),

        Commands::Correlations { input, top } => cmd_correlations(&input, top),

        Commands::Serve { port } => cmd_serve(port, config).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_analyze(
    input: &Path,
    output: Option<PathBuf>,
    no_validate: bool,
    quiet: bool,
    mut config: AnalysisConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if quiet {
        LOG_BROADCASTER.set_echo(false);
    }
    if let Some(dir) = output {
        config.output_dir = dir;
    }

    eprintln!("📄 Processing: {}", input.display());

    let options = AnalyzeOptions {
        skip_validation: no_validate,
    };
    let run = analyze_csv(input, &options)?;

    println!("{}", ConsoleReport(&run));

    let paths = write_run(&run, &config)?;
    eprintln!("💾 Outputs written:");
    for path in [&paths.processed_csv, &paths.summary_json, &paths.findings_json, &paths.dashboard_json] {
        eprintln!("   {}", path.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_derive(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Deriving: {}", input.display());

    let (csv_info, source, table) = derive_csv(input)?;
    eprintln!("   {} rows, {} columns in", csv_info.row_count, csv_info.headers.len());

    match output {
        Some(p) => {
            write_processed_csv(BufWriter::new(File::create(p)?), &source, &table)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            write_processed_csv(io::stdout().lock(), &source, &table)?;
        }
    }

    Ok(())
}

fn cmd_describe(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Describing: {}", input.display());

    let run = analyze_csv(input, &AnalyzeOptions::default())?;
    println!("{}", DescribeReport(&run.aggregates));

    Ok(())
}

fn cmd_correlations(input: &Path, top: usize) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Correlating: {}", input.display());

    let run = analyze_csv(input, &AnalyzeOptions::default())?;
    println!(
        "{}",
        CorrelationReport {
            matrix: &run.aggregates.correlation,
            top,
        }
    );

    Ok(())
}

async fn cmd_serve(port: Option<u16>, mut config: AnalysisConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port {
        config.port = port;
    }
    shoplens::server::start_server(config).await
}
