//! `.print tran` table output.
//!
//! ```text
//! Index   time            v(1)            v(2)
//! --------------------------------------------------------------------------------
//! 0       0.000000e+00    5.000000e+00    2.500000e+00
//! 1       1.000000e-05    5.000000e+00    2.500000e+00
//! ```
//!
//! Long runs repeat the header on every page, and wide prints are split into
//! several tables that share the `Index` and `time` columns. Rows are keyed by
//! their index so both cases merge into one series.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{parse_voltage_name, tokenizer, DecodedSeries};
use crate::circuit::NodeId;

struct Row {
    time: f64,
    values: BTreeMap<NodeId, f64>,
}

/// Decode every table in `output`.
pub fn parse(output: &str) -> Option<DecodedSeries> {
    let mut columns: Option<Vec<Option<NodeId>>> = None;
    let mut nodes: BTreeSet<NodeId> = BTreeSet::new();
    let mut rows: BTreeMap<usize, Row> = BTreeMap::new();
    let mut dropped = 0usize;

    for line in output.lines() {
        let line = line.trim();
        if let Some(header) = parse_header(line) {
            nodes.extend(header.iter().flatten().copied());
            columns = Some(header);
            continue;
        }
        let Some(columns) = columns.as_ref() else {
            continue;
        };
        if line.is_empty() || (line.starts_with('-') && line.chars().all(|c| c == '-')) {
            continue;
        }

        let Some((index, time, values)) = parse_row(line, columns.len()) else {
            dropped += 1;
            continue;
        };
        let row = rows.entry(index).or_insert_with(|| Row {
            time,
            values: BTreeMap::new(),
        });
        for (column, value) in columns.iter().zip(values) {
            if let Some(node) = column {
                row.values.insert(*node, value);
            }
        }
    }

    if rows.is_empty() || nodes.is_empty() {
        return None;
    }

    let mut series = DecodedSeries::with_nodes(nodes.iter().copied());
    let mut last_time = f64::NEG_INFINITY;
    for row in rows.into_values() {
        let complete = nodes.iter().all(|n| row.values.contains_key(n));
        if !complete || row.time < last_time {
            dropped += 1;
            continue;
        }
        last_time = row.time;
        series.push(row.time, &row.values);
    }

    debug!(points = series.len(), dropped, "decoded tabular output");
    Some(series)
}

/// `Index time <col>…`: the node of each data column, `None` for columns
/// that are not node voltages.
fn parse_header(line: &str) -> Option<Vec<Option<NodeId>>> {
    let mut tokens = line.split_whitespace();
    if !tokens.next()?.eq_ignore_ascii_case("index") || !tokens.next()?.eq_ignore_ascii_case("time") {
        return None;
    }
    let columns: Vec<Option<NodeId>> = tokens.map(parse_voltage_name).collect();
    if columns.is_empty() {
        None
    } else {
        Some(columns)
    }
}

/// Index, time and exactly `width` values, or `None`.
///
/// The run-together tokenizer only sees rows with a chunk that is not a
/// number on its own. A row of clean chunks with the wrong count is dropped.
fn parse_row(line: &str, width: usize) -> Option<(usize, f64, Vec<f64>)> {
    let chunks: Vec<&str> = line.split_whitespace().collect();
    let delimited = chunks.split_first().and_then(|(index, rest)| {
        let index = index.parse().ok()?;
        let values = rest.iter().map(|t| t.parse().ok()).collect::<Option<Vec<f64>>>()?;
        Some((index, values))
    });

    let (index, mut values) = match delimited {
        Some(row) => row,
        None => tokenizer::split_row(line)?,
    };
    if values.len() != width + 1 {
        return None;
    }
    let time = values.remove(0);
    Some((index, time, values))
}
