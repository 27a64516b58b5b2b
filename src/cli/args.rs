//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::Weighting;

/// Persona - Segment customers by country, device, sex and age from purchase records
#[derive(Parser, Debug)]
#[command(name = "persona")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input CSV with PRICE, SOURCE, SEX, COUNTRY and AGE columns
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Distinct-value threshold below which a numeric column is profiled as categorical
    #[arg(long, default_value = "5", value_parser = validate_cat_threshold)]
    pub cat_threshold: usize,

    /// Show a text histogram for each numerical column
    #[arg(long, default_value = "false")]
    pub histograms: bool,

    /// How per-age group means are combined into one customer key.
    /// Options: "mean-of-means" (default) or "record-weighted"
    #[arg(long, default_value = "mean-of-means")]
    pub weighting: Weighting,

    /// Write the segment table (with its age buckets) to this JSON file
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Skip the interactive new-customer lookup after the report
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference.
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify customers against a previously exported segment table
    Lookup {
        /// Segment table JSON written with --export
        #[arg(short, long)]
        table: PathBuf,

        /// Country code (e.g. bra, usa)
        #[arg(long)]
        country: Option<String>,

        /// Device source: android | ios
        #[arg(long)]
        source: Option<String>,

        /// Sex: male | female
        #[arg(long)]
        sex: Option<String>,

        /// Age in years
        #[arg(long, allow_hyphen_values = true)]
        age: Option<String>,
    },
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }
}

/// Validator for cat_threshold parameter
fn validate_cat_threshold(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid whole number", s))?;

    if value == 0 {
        Err("cat_threshold must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
