//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;

use persona::cli::{Field, Prompter};
use persona::pipeline::SegmentError;
use polars::prelude::*;
use tempfile::TempDir;

pub const COUNTRIES: [&str; 3] = ["bra", "usa", "tur"];
pub const SOURCES: [&str; 2] = ["android", "ios"];
pub const SEXES: [&str; 2] = ["male", "female"];
pub const AGES: [i64; 6] = [15, 20, 25, 35, 50, 66];

/// Create a purchase table with 60 distinct customer keys.
///
/// Every `(country, source, sex, age)` group holds two records priced
/// `p - 5` and `p + 5`, where `p = 10 + 2 * group_index`. Ages 50 and 66
/// share the top bucket, so that key's mean-of-means is `p(50) + 3`.
/// All key means are distinct and the oldest customer is 66.
pub fn create_persona_dataframe() -> DataFrame {
    let mut prices: Vec<i64> = Vec::new();
    let mut sources: Vec<&str> = Vec::new();
    let mut sexes: Vec<&str> = Vec::new();
    let mut countries: Vec<&str> = Vec::new();
    let mut ages: Vec<i64> = Vec::new();

    let mut group_index = 0i64;
    for country in COUNTRIES {
        for source in SOURCES {
            for sex in SEXES {
                for age in AGES {
                    let p = 10 + 2 * group_index;
                    for price in [p - 5, p + 5] {
                        prices.push(price);
                        sources.push(source);
                        sexes.push(sex);
                        countries.push(country);
                        ages.push(age);
                    }
                    group_index += 1;
                }
            }
        }
    }

    df! {
        "PRICE" => prices,
        "SOURCE" => sources,
        "SEX" => sexes,
        "COUNTRY" => countries,
        "AGE" => ages,
    }
    .unwrap()
}

/// Create a larger random purchase table for stress tests
pub fn create_random_dataframe(rows: usize, seed: u64) -> DataFrame {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let prices: Vec<f64> = (0..rows).map(|_| rng.gen_range(9.0..60.0)).collect();
    let sources: Vec<&str> = (0..rows).map(|_| SOURCES[rng.gen_range(0..2)]).collect();
    let sexes: Vec<&str> = (0..rows).map(|_| SEXES[rng.gen_range(0..2)]).collect();
    let countries: Vec<&str> = (0..rows).map(|_| COUNTRIES[rng.gen_range(0..3)]).collect();
    let mut ages: Vec<i64> = (0..rows).map(|_| rng.gen_range(15..=66)).collect();
    if let Some(first) = ages.first_mut() {
        *first = 66;
    }

    df! {
        "PRICE" => prices,
        "SOURCE" => sources,
        "SEX" => sexes,
        "COUNTRY" => countries,
        "AGE" => ages,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("persona.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary CSV file from raw lines
pub fn create_raw_csv(lines: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("raw.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }

    (temp_dir, csv_path)
}

/// Prompter that replays scripted answers.
///
/// `y`/`n` answer the new-entry question; every other answer feeds a field.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<Field>,
    pub rejections: Vec<SegmentError>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self) -> anyhow::Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm_new_entry(&mut self) -> anyhow::Result<bool> {
        Ok(self.next()? == "y")
    }

    fn ask(&mut self, field: Field, _hint: &str) -> anyhow::Result<String> {
        self.asked.push(field);
        self.next()
    }

    fn reject(&mut self, error: &SegmentError) {
        self.rejections.push(error.clone());
    }
}
