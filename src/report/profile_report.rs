//! Console rendering of a dataset profile

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{ColumnDetail, ColumnProfile, DatasetProfile, HistogramBin, NumericSummary};
use crate::utils::{print_count, print_indented, print_section};

/// Widest histogram bar, in characters
const BAR_WIDTH: usize = 40;

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Shape, column types and null counts
pub fn overview_table(profile: &DatasetProfile) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
        Cell::new("Kind").add_attribute(Attribute::Bold),
        Cell::new("Distinct").add_attribute(Attribute::Bold),
        Cell::new("NaN").add_attribute(Attribute::Bold),
    ]);

    for column in &profile.column_profiles {
        table.add_row(vec![
            Cell::new(&column.name),
            Cell::new(&column.dtype),
            Cell::new(column.kind),
            Cell::new(column.distinct).set_alignment(CellAlignment::Right),
            Cell::new(column.null_count)
                .set_alignment(CellAlignment::Right)
                .fg(if column.null_count > 0 {
                    Color::Red
                } else {
                    Color::White
                }),
        ]);
    }

    table
}

/// Value counts and ratios of one categorical column
pub fn category_table(column: &ColumnProfile) -> Option<Table> {
    let ColumnDetail::Categorical { values } = &column.detail else {
        return None;
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new(&column.name).add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
        Cell::new("Ratio").add_attribute(Attribute::Bold),
    ]);
    for value in values {
        table.add_row(vec![
            Cell::new(&value.value),
            Cell::new(value.count).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}%", value.ratio)).set_alignment(CellAlignment::Right),
        ]);
    }

    Some(table)
}

/// Count/mean/std/min/max of one numerical column
pub fn numeric_table(name: &str, summary: &NumericSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new(name).add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Count"), Cell::new(summary.count)]);
    table.add_row(vec![Cell::new("Mean"), Cell::new(fmt_opt(summary.mean))]);
    table.add_row(vec![Cell::new("Std"), Cell::new(fmt_opt(summary.std))]);
    table.add_row(vec![Cell::new("Min"), Cell::new(fmt_opt(summary.min))]);
    table.add_row(vec![Cell::new("Max"), Cell::new(fmt_opt(summary.max))]);
    table
}

/// Text bars for a histogram, one line per bin
pub fn render_histogram(bins: &[HistogramBin]) -> String {
    let peak = bins.iter().map(|b| b.count).max().unwrap_or(0);
    bins.iter()
        .map(|bin| {
            let width = if peak == 0 {
                0
            } else {
                (bin.count * BAR_WIDTH).div_ceil(peak)
            };
            format!(
                "{:>10.2} - {:<10.2} │{} {}",
                bin.lower,
                bin.upper,
                "█".repeat(width),
                bin.count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the full profile report
pub fn display_profile(profile: &DatasetProfile) {
    print_section("Overview");
    println!("      Number of Records:   {}", style(profile.rows).yellow());
    println!("      Number of Variables: {}", style(profile.columns).yellow());
    println!();
    print_indented(&overview_table(profile).to_string(), 4);

    print_section(&format!("First {} Records", profile.head.height()));
    print_indented(&profile.head.to_string(), 4);
    print_section(&format!("Last {} Records", profile.tail.height()));
    print_indented(&profile.tail.to_string(), 4);

    let categorical = profile.categorical_columns();
    let numerical = profile.numerical_columns();
    println!();
    print_count("categorical variable(s)", categorical.len(), None);
    print_count("numerical variable(s)", numerical.len(), None);

    for column in &profile.column_profiles {
        match &column.detail {
            ColumnDetail::Categorical { .. } => {
                if let Some(table) = category_table(column) {
                    print_section(&format!("{} Summary", column.name));
                    print_indented(&table.to_string(), 4);
                }
            }
            ColumnDetail::Numerical(summary) => {
                print_section(&format!("{} Summary", column.name));
                print_indented(&numeric_table(&column.name, summary).to_string(), 4);
                if let Some(bins) = &summary.histogram {
                    println!();
                    print_indented(&render_histogram(bins), 6);
                }
            }
        }
    }
}
