// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use registrant_chart::{load_csv, logging, render_svg, summarize, PipelineSummary};

#[derive(Parser, Debug)]
#[command(
    name = "registrant-chart",
    version,
    about = "Bar chart of event registrants per main discipline"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print row counts and the sorted discipline buckets
    Summary {
        /// Registrants CSV (header row required)
        csv: PathBuf,

        /// Print buckets as JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },
    /// Render the bar chart as an SVG file
    Chart {
        /// Registrants CSV (header row required)
        csv: PathBuf,

        /// Output file
        #[arg(long, short, default_value = "chart.svg")]
        out: PathBuf,
    },
    /// Interactive terminal view
    Tui {
        /// Registrants CSV (header row required)
        csv: PathBuf,
    },
}

fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Summary { csv, json } => run_summary(&csv, json)?,
        Command::Chart { csv, out } => run_chart(&csv, &out)?,
        Command::Tui { csv } => run_ui_mode(&csv)?,
    }

    Ok(())
}

fn load_summary(csv_path: &Path) -> Result<PipelineSummary> {
    let registrants = load_csv(csv_path)?;
    Ok(summarize(&registrants))
}

fn run_summary(csv_path: &Path, json: bool) -> Result<()> {
    let summary = load_summary(csv_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary.buckets)?);
        return Ok(());
    }

    println!("📊 Registrants per discipline");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Rows read:          {}", summary.total_rows);
    println!("✓ Complete:           {}", summary.complete_rows);
    println!("✓ Excluded:           {}", summary.excluded_rows);
    println!("  Invalid last_access: {}", summary.invalid_dates);
    println!("  Invalid idnumber:    {}", summary.invalid_idnumbers);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for bucket in &summary.buckets {
        println!("{:>6}  {}", bucket.users_total, bucket.label());
    }

    Ok(())
}

fn run_chart(csv_path: &Path, out: &Path) -> Result<()> {
    println!("📂 Loading CSV...");
    let summary = load_summary(csv_path)?;
    println!("✓ {}", summary.summary());

    let svg = render_svg(&summary.buckets)?;
    fs::write(out, svg).with_context(|| format!("Failed to write chart to {}", out.display()))?;
    println!("✅ Chart written to {}", out.display());

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(csv_path: &Path) -> Result<()> {
    println!("🖥️  Loading registrants...\n");

    let summary = load_summary(csv_path)?;
    println!("✓ {}\n", summary.summary());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(summary);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_csv_path: &Path) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or render a file: registrant-chart chart <csv> --out chart.svg");
    std::process::exit(1);
}
