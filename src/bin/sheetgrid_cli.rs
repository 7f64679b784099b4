//! CLI tool for sheetgrid - lays out a grid scenario and outputs JSON
//!
//! Usage:
//!   sheetgrid_cli <scenario.json>              # Output JSON to stdout
//!   sheetgrid_cli <scenario.json> -o out.json  # Output JSON to file
//!   sheetgrid_cli -                            # Read the scenario from stdin
//!
//! A scenario looks like:
//!
//! ```json
//! { "options": { "rowHeaders": true }, "rows": 1000, "columns": 26,
//!   "width": 800, "height": 600, "scale": 2, "originRow": 10,
//!   "columnSizes": { "B": 180 }, "rowSizes": { "12": 40 } }
//! ```

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use sheetgrid::cell_ref::col_label;
use sheetgrid::layout::{GridViewport, Rect, Span, VisibleLayout};
use sheetgrid::render::{compute_scrollbars, selection_geometry, Scrollbars};
use sheetgrid::types::lenient::{row_size_map, size_map};
use sheetgrid::{GridOptions, Selection};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Scenario {
    options: GridOptions,
    rows: u32,
    columns: u32,
    column_sizes: serde_json::Value,
    row_sizes: serde_json::Value,
    /// CSS pixels.
    width: f64,
    height: f64,
    scale: f64,
    origin_row: i64,
    origin_col: i64,
    selection: Option<Selection>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            options: GridOptions::default(),
            rows: sheetgrid::layout::DEFAULT_TOTAL_ROWS,
            columns: sheetgrid::layout::DEFAULT_TOTAL_COLUMNS,
            column_sizes: serde_json::Value::Null,
            row_sizes: serde_json::Value::Null,
            width: 800.0,
            height: 600.0,
            scale: 1.0,
            origin_row: 0,
            origin_col: 0,
            selection: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpanReport {
    label: String,
    index: u32,
    start: f64,
    size: f64,
    line: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    surface: Rect,
    visible_columns: Vec<SpanReport>,
    visible_rows: Vec<SpanReport>,
    scrollbars: Scrollbars,
    selection_area: Option<Rect>,
}

fn span_report(span: &Span, label: String) -> SpanReport {
    SpanReport {
        label,
        index: span.index,
        start: span.start,
        size: span.size,
        line: span.line,
    }
}

fn run(scenario: Scenario) -> Report {
    let options = scenario.options.sanitized();
    let mut vp = GridViewport::new(&options);
    vp.set_extent(scenario.rows, scenario.columns);
    vp.col_sizes = size_map(&scenario.column_sizes);
    vp.row_sizes = row_size_map(&scenario.row_sizes);
    vp.resize(
        (scenario.width * scenario.scale).floor(),
        (scenario.height * scenario.scale).floor(),
        scenario.scale,
    );
    vp.set_origin_row(scenario.origin_row);
    vp.set_origin_col(scenario.origin_col);

    let layout = VisibleLayout::compute(&vp);
    let selection = scenario.selection.map(Selection::normalized).unwrap_or_default();
    let selection_area = selection_geometry(&selection, &layout, options.sel_mode, vp.width)
        .map(|geo| geo.area);

    Report {
        surface: Rect::new(0.0, 0.0, vp.width, vp.height),
        visible_columns: layout
            .columns
            .iter()
            .map(|s| span_report(s, col_label(s.index)))
            .collect(),
        visible_rows: layout
            .rows
            .iter()
            .map(|s| span_report(s, s.index.to_string()))
            .collect(),
        scrollbars: compute_scrollbars(&vp, &layout),
        selection_area,
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: sheetgrid_cli <scenario.json|-> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    // Read scenario
    let input = if input_path == "-" {
        let mut buf = String::new();
        match io::stdin().read_to_string(&mut buf) {
            Ok(_) => buf,
            Err(e) => {
                eprintln!("Error reading stdin: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match fs::read_to_string(input_path) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Error reading {}: {}", input_path, e);
                std::process::exit(1);
            }
        }
    };

    let scenario: Scenario = match serde_json::from_str(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error parsing scenario: {}", e);
            std::process::exit(1);
        }
    };

    let json = match serde_json::to_string_pretty(&run(scenario)) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
