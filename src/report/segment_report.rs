//! Console rendering of the segment table and lookup results

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{LookupOutcome, Segment, SegmentSummary, SegmentTable};
use crate::utils::{print_indented, print_info, print_section};

fn segment_color(segment: Segment) -> Color {
    match segment {
        Segment::Low => Color::Red,
        Segment::LowMid => Color::DarkYellow,
        Segment::Mid => Color::Yellow,
        Segment::HighMid => Color::Cyan,
        Segment::High => Color::Green,
    }
}

/// Customer keys sorted by mean price, highest first.
///
/// `limit` caps the number of rows shown; `None` shows every key.
pub fn segment_table(table: &SegmentTable, limit: Option<usize>) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL_CONDENSED);
    out.set_header(vec![
        Cell::new("Customer Key").add_attribute(Attribute::Bold),
        Cell::new("Mean Price").add_attribute(Attribute::Bold),
        Cell::new("Segment").add_attribute(Attribute::Bold),
    ]);

    let rows = table.rows_by_price();
    let shown = limit.unwrap_or(rows.len());
    for (key, row) in rows.iter().take(shown) {
        out.add_row(vec![
            Cell::new(key),
            Cell::new(format!("{:.4}", row.mean_price)).set_alignment(CellAlignment::Right),
            Cell::new(row.segment).fg(segment_color(row.segment)),
        ]);
    }

    out
}

/// Key count and price statistics per segment
pub fn summary_table(summaries: &[SegmentSummary]) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL_CONDENSED);
    out.set_header(vec![
        Cell::new("Segment").add_attribute(Attribute::Bold),
        Cell::new("Keys").add_attribute(Attribute::Bold),
        Cell::new("Mean").add_attribute(Attribute::Bold),
        Cell::new("Min").add_attribute(Attribute::Bold),
        Cell::new("Max").add_attribute(Attribute::Bold),
        Cell::new("Sum").add_attribute(Attribute::Bold),
    ]);

    for summary in summaries {
        out.add_row(vec![
            Cell::new(summary.segment)
                .fg(segment_color(summary.segment))
                .add_attribute(Attribute::Bold),
            Cell::new(summary.keys).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", summary.mean)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", summary.min)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", summary.max)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", summary.sum)).set_alignment(CellAlignment::Right),
        ]);
    }

    out
}

/// Print the segment table and per-segment summary
pub fn display_segments(table: &SegmentTable, summaries: &[SegmentSummary], limit: Option<usize>) {
    print_section("Customer Segments");
    println!(
        "      Age buckets: {}",
        style(table.age_buckets().labels().join(", ")).dim()
    );
    println!();
    print_indented(&segment_table(table, limit).to_string(), 4);
    if let Some(limit) = limit.filter(|l| *l < table.len()) {
        print_info(&format!(
            "Showing top {} of {} keys by mean price",
            limit,
            table.len()
        ));
    }

    print_section("Segment Summary");
    print_indented(&summary_table(summaries).to_string(), 4);
}

/// Print the result of one new-customer lookup
pub fn display_lookup(outcome: &LookupOutcome) {
    println!();
    println!(
        "    {} {}",
        style("👤").cyan(),
        style("NEW CUSTOMER INFO").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    match &outcome.row {
        Some(row) => {
            let mut out = Table::new();
            out.load_preset(UTF8_FULL_CONDENSED);
            out.set_header(vec!["Customer Key", "Mean Price", "Segment"]);
            out.add_row(vec![
                Cell::new(&outcome.key),
                Cell::new(format!("{:.4}", row.mean_price)),
                Cell::new(row.segment)
                    .fg(segment_color(row.segment))
                    .add_attribute(Attribute::Bold),
            ]);
            print_indented(&out.to_string(), 4);
        }
        None => print_info(&format!(
            "No matching customer for {}",
            style(&outcome.key).yellow()
        )),
    }
}
