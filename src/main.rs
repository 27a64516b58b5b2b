//! Persona: Customer Segmentation CLI Tool
//!
//! Loads purchase records, profiles them, builds the customer segment table
//! and classifies new customers interactively.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use polars::prelude::DataType;

use persona::cli::{Cli, Commands, LookupSession, TerminalPrompter};
use persona::pipeline::{
    build_segment_table, load_dataset_with_progress, profile_dataset, summarize_segments,
    Classifier, ProfileConfig, RawEntry, SegmentError, SegmentTable, PRICE,
};
use persona::report::{
    display_lookup, display_profile, display_segments, export_segment_table, load_segment_table,
    ExportMetadata,
};
use persona::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_error, print_info, print_step_header, print_success,
};

/// Keys shown in the segment table before truncating
const SEGMENT_ROWS_SHOWN: usize = 20;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Lookup {
                table,
                country,
                source,
                sex,
                age,
            } => run_lookup(
                table,
                country.as_deref(),
                source.as_deref(),
                sex.as_deref(),
                age.as_deref(),
            ),
        };
    }

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        input,
        cli.export.as_deref(),
        cli.cat_threshold,
        cli.weighting,
    );

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, cli.infer_schema_length)?;
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);
    print_step_time(step_start);

    // Step 2: Profile
    print_step_header(2, "Profile Columns");
    let step_start = Instant::now();
    let config = ProfileConfig {
        categorical_threshold: cli.cat_threshold,
        histograms: cli.histograms,
    };
    let profile = profile_dataset(&df, &config)?;
    display_profile(&profile);
    print_step_time(step_start);

    // Step 3: Aggregate and segment
    print_step_header(3, "Aggregate & Segment");
    let step_start = Instant::now();
    let spinner = create_spinner("Building customer keys...");
    let table = match build_segment_table(&df, cli.weighting) {
        Ok(table) => table,
        Err(e) => {
            finish_with_warning(&spinner, "Segmentation failed");
            if report_segment_error(&e) {
                anyhow::bail!("Segmentation failed");
            }
            return Err(e);
        }
    };
    finish_with_success(&spinner, "Segment table built");

    let unpriced = df
        .column(PRICE)?
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .filter(|price| price.map_or(true, f64::is_nan))
        .count();
    if unpriced > 0 {
        print_info(&format!(
            "Ignored {} record(s) without a {} value",
            unpriced, PRICE
        ));
    }
    print_count("customer key(s)", table.len(), Some(&format!("from {} records", rows)));
    display_segments(&table, &summarize_segments(&table), Some(SEGMENT_ROWS_SHOWN));
    print_step_time(step_start);

    // Step 4: Export
    if let Some(export_path) = &cli.export {
        print_step_header(4, "Export Segment Table");
        let metadata = ExportMetadata::new(
            &input.display().to_string(),
            cli.weighting,
            cli.cat_threshold,
        );
        export_segment_table(&table, metadata, export_path)?;
        print_success(&format!("Saved to {}", export_path.display()));
    }

    // Interactive lookup
    if cli.no_confirm {
        print_info("Skipping new customer lookup (--no-confirm)");
    } else {
        print_step_header(5, "New Customer Lookup");
        run_interactive(&table)?;
    }

    print_completion();
    Ok(())
}

/// Classify against an exported table, once with flags or interactively
fn run_lookup(
    table_path: &Path,
    country: Option<&str>,
    source: Option<&str>,
    sex: Option<&str>,
    age: Option<&str>,
) -> Result<()> {
    let export = load_segment_table(table_path)?;
    let table = export.table;
    print_info(&format!(
        "Loaded {} customer key(s) from {}",
        table.len(),
        table_path.display()
    ));

    match (country, source, sex, age) {
        (Some(country), Some(source), Some(sex), Some(age)) => {
            let classifier = Classifier::new(&table);
            let entry = RawEntry {
                country: country.to_string(),
                source: source.to_string(),
                sex: sex.to_string(),
                age: age.to_string(),
            };
            let outcome = classifier
                .parse_entry(&entry)
                .and_then(|query| classifier.classify(&query))
                .inspect_err(report_lookup_error)?;
            display_lookup(&outcome);
            Ok(())
        }
        (None, None, None, None) => run_interactive(&table),
        _ => anyhow::bail!(
            "Provide all of --country, --source, --sex and --age for a one-shot lookup, or none for interactive mode"
        ),
    }
}

fn run_interactive(table: &SegmentTable) -> Result<()> {
    let mut session = LookupSession::new(Classifier::new(table), TerminalPrompter);
    let outcomes = session.run(display_lookup)?;
    println!();
    print_info(&format!("Good-bye. {} lookup(s) made.", outcomes.len()));
    Ok(())
}

fn report_lookup_error(error: &SegmentError) {
    print_error(&format!("{}: {}", error.kind(), error));
}

/// Print a segmentation error with its kind; false if it is not a `SegmentError`
fn report_segment_error(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<SegmentError>() {
        Some(e) => {
            report_lookup_error(e);
            true
        }
        None => false,
    }
}

fn print_step_time(start: Instant) {
    println!(
        "    {}",
        style(format!("⏱  {:.2}s", start.elapsed().as_secs_f64())).dim()
    );
}

