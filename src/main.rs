//! Staffdiff CLI - compare two employee-records exports
//!
//! # Main Commands
//!
//! ```bash
//! staffdiff compare old.csv new.csv    # Run a comparison, print the report
//! staffdiff serve                      # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! staffdiff parse input.csv            # Just parse a file to JSON rows
//! ```

use clap::{Parser, Subcommand};
use staffdiff::{
    compare_files, diffs_to_csv_bom, filter, load_file, rows_to_csv_bom, to_csv_bom,
    CompareOptions, ValueFilter,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "staffdiff")]
#[command(about = "Compare two employee-records exports and report changes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare an OLD and a NEW export
    Compare {
        /// OLD snapshot file
        old: PathBuf,

        /// NEW snapshot file
        new: PathBuf,

        /// Write the difference report as CSV (UTF-8 with BOM)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write removed employees (full OLD rows) as CSV
        #[arg(short, long)]
        removed: Option<PathBuf>,

        /// Only report differences for this field
        #[arg(short, long)]
        field: Option<String>,

        /// With --field: only rows whose OLD value equals this string
        #[arg(short, long)]
        value: Option<String>,

        /// Additional excluded header substrings (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Treat this field as a structured prefix field
        #[arg(long)]
        prefix_field: Option<String>,

        /// Characters to strip from the NEW side of --prefix-field
        #[arg(long, default_value = "3")]
        strip: usize,

        /// Print only the summary, not the difference rows
        #[arg(long)]
        summary_only: bool,
    },

    /// Parse a file and output its JSON rows
    Parse {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: STAFFDIFF_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare {
            old,
            new,
            output,
            removed,
            field,
            value,
            exclude,
            prefix_field,
            strip,
            summary_only,
        } => cmd_compare(
            &old,
            &new,
            output.as_deref(),
            removed.as_deref(),
            field.as_deref(),
            value.as_deref(),
            &exclude,
            prefix_field.as_deref(),
            strip,
            summary_only,
        ),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_compare(
    old: &Path,
    new: &Path,
    output: Option<&Path>,
    removed: Option<&Path>,
    field: Option<&str>,
    value: Option<&str>,
    exclude: &[String],
    prefix_field: Option<&str>,
    strip: usize,
    summary_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = CompareOptions::default();
    options
        .excluded_substrings
        .extend(exclude.iter().cloned());
    if let Some(pf) = prefix_field {
        options.prefix_fields.insert(pf.to_string(), strip);
    }

    let result = compare_files(old, new, &options)?;

    eprintln!("\nSummary:");
    eprintln!("   Differences:       {}", result.report.rows.len());
    eprintln!("   Employees changed: {}", result.report.changed_count);
    eprintln!("   Removed:           {}", result.old_only.len());
    eprintln!("   Added:             {}", result.new_only.len());
    for (f, count) in &result.report.per_field_counts {
        eprintln!("     {} : {}", f, count);
    }
    if !result.duplicate_keys.is_empty() {
        eprintln!(
            "   Duplicated name keys (cross-product pairs): {}",
            result.duplicate_keys.join(", ")
        );
    }

    // Field/value filter applies to both the printed rows and the export.
    let csv_bytes = match field {
        Some(f) => {
            let value_filter = match value {
                Some(v) => ValueFilter::OldValue(v.to_string()),
                None => ValueFilter::All,
            };
            let rows = filter(&result.report, f, &value_filter);
            eprintln!("   Matching rows for '{}': {}", f, rows.len());
            if !summary_only {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            diffs_to_csv_bom(&rows)?
        }
        None => {
            if !summary_only {
                println!("{}", serde_json::to_string_pretty(&result.report.rows)?);
            }
            to_csv_bom(&result.report)?
        }
    };

    if let Some(path) = output {
        fs::write(path, &csv_bytes)?;
        eprintln!("Report written to: {}", path.display());
    }

    if let Some(path) = removed {
        let bytes = rows_to_csv_bom(&result.old_info.headers, &result.old_only)?;
        fs::write(path, &bytes)?;
        eprintln!("Removed employees written to: {}", path.display());
    }

    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing: {}", input.display());

    let dataset = load_file(input)?;
    eprintln!("   Encoding: {}", dataset.encoding);
    eprintln!(
        "   Delimiter: '{}'",
        match dataset.delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        }
    );
    eprintln!("   Columns: {}", dataset.headers.join(", "));
    eprintln!("Parsed {} rows", dataset.row_count());

    let json = serde_json::to_string_pretty(&dataset.rows)?;
    match output {
        Some(p) => {
            fs::write(p, json)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let port = port
        .or_else(|| {
            std::env::var("STAFFDIFF_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
        })
        .unwrap_or(3000);
    staffdiff::server::start_server(port).await
}
