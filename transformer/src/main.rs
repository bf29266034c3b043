//! Custform CLI - Transform customer CSV files to JSON
//!
//! ```bash
//! custform                                   # input.csv -> output.json
//! custform -i customers.csv -o customers.json
//! custform -i customers.csv -c data/countries.json --quiet
//! ```

use clap::Parser;
use custform::logs::{log_info, log_info_indent, log_success, LOG_BROADCASTER};
use custform::{run, TransformOptions, DEFAULT_COUNTRIES_PATH};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "custform", version)]
#[command(about = "Transform CSV data to JSON format with data validation and cleaning", long_about = None)]
struct Cli {
    /// Input CSV file path
    #[arg(short, long, default_value = "input.csv")]
    input: PathBuf,

    /// Output JSON file path
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Country reference file (JSON object of code -> name)
    #[arg(short, long, default_value = DEFAULT_COUNTRIES_PATH)]
    countries: PathBuf,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    LOG_BROADCASTER.set_quiet(cli.quiet);

    let options = TransformOptions {
        input: cli.input,
        output: cli.output,
        countries: cli.countries,
    };

    if let Err(e) = cmd_transform(&options) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_transform(options: &TransformOptions) -> Result<(), Box<dyn std::error::Error>> {
    log_info("📄 CSV to JSON Data Transformer");
    log_info_indent(format!("Input file: {}", options.input.display()), 1);
    log_info_indent(format!("Output file: {}", options.output.display()), 1);
    log_info_indent(format!("Countries: {}", options.countries.display()), 1);

    let summary = run(options)?;

    log_success(format!(
        "Data transformation completed successfully! {} records written, {} rows skipped",
        summary.processed, summary.errors
    ));
    log_info(format!("💾 Output written to: {}", options.output.display()));

    Ok(())
}
