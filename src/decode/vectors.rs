//! Variable-block output (ASCII rawfile layout).
//!
//! ```text
//! Variables:
//!         0       time    time
//!         1       v(1)    voltage
//!         2       v(2)    voltage
//! Values:
//!  0      0.000000000000000e+00
//!         5.000000000000000e+00
//!         2.500000000000000e+00
//! ```
//!
//! The column order comes from the `Variables:` section. A point is an index
//! followed by one value per variable, either on one line or spread over
//! several. When the output holds several plots, the longest transient wins.

use tracing::debug;

use super::{parse_voltage_name, DecodedSeries};
use crate::circuit::NodeId;

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Outside,
    Variables,
    Values,
}

#[derive(Default)]
struct Block {
    time_column: Option<usize>,
    node_columns: Vec<(usize, NodeId)>,
    width: usize,
    points: Vec<Vec<f64>>,
    current: Vec<f64>,
    in_point: bool,
}

impl Block {
    /// `<column> <name> [<type>]`
    fn add_variable(&mut self, line: &str) {
        let mut parts = line.split_whitespace();
        let (Some(column), Some(name)) = (parts.next(), parts.next()) else {
            return;
        };
        let Ok(column) = column.parse::<usize>() else {
            return;
        };
        self.width = self.width.max(column + 1);

        if name.eq_ignore_ascii_case("time") {
            self.time_column = Some(column);
        } else if let Some(node) = parse_voltage_name(name).or_else(|| bare_node(name)) {
            self.node_columns.push((column, node));
        }
    }

    /// One untrimmed line of the `Values:` section.
    ///
    /// A line that is not tab-indented and opens with an integer starts a
    /// new point, abandoning any point still short of values.
    fn add_values(&mut self, raw: &str) {
        let mut tokens = raw.split_whitespace().peekable();
        let starts_point = !raw.starts_with('\t')
            && tokens.peek().is_some_and(|t| t.parse::<usize>().is_ok());
        if starts_point {
            if self.in_point {
                debug!(values = self.current.len(), width = self.width, "incomplete point dropped");
                self.current.clear();
            }
            tokens.next();
            self.in_point = true;
        } else if !self.in_point {
            return;
        }

        for token in tokens {
            match token.parse::<f64>() {
                Ok(value) => self.current.push(value),
                Err(_) => {
                    self.current.clear();
                    self.in_point = false;
                    return;
                }
            }
        }

        if self.current.len() >= self.width {
            if self.current.len() == self.width {
                self.points.push(std::mem::take(&mut self.current));
            } else {
                self.current.clear();
            }
            self.in_point = false;
        }
    }

    fn into_series(self) -> Option<DecodedSeries> {
        let time_column = self.time_column?;
        if self.node_columns.is_empty() || self.points.is_empty() {
            return None;
        }

        let mut series = DecodedSeries::with_nodes(self.node_columns.iter().map(|(_, n)| *n));
        let mut last_time = f64::NEG_INFINITY;
        for point in &self.points {
            let time = point[time_column];
            if time < last_time {
                continue;
            }
            last_time = time;
            let values = self
                .node_columns
                .iter()
                .map(|(column, node)| (*node, point[*column]))
                .collect();
            series.push(time, &values);
        }
        Some(series)
    }
}

/// Node voltages named by a bare index ("1") in some rawfiles.
fn bare_node(name: &str) -> Option<NodeId> {
    name.parse::<usize>().ok().filter(|i| *i != 0).map(NodeId)
}

fn keep_longest(finished: Option<Block>, best: &mut Option<DecodedSeries>) {
    if let Some(series) = finished.and_then(Block::into_series) {
        if best.as_ref().map_or(true, |b| series.len() > b.len()) {
            *best = Some(series);
        }
    }
}

/// Decode the longest transient plot in `output`.
pub fn parse(output: &str) -> Option<DecodedSeries> {
    let mut best: Option<DecodedSeries> = None;
    let mut block: Option<Block> = None;
    let mut section = Section::Outside;

    for raw in output.lines() {
        let line = raw.trim();
        if let Some(rest) = line.strip_prefix("Variables:") {
            keep_longest(block.take(), &mut best);
            let mut fresh = Block::default();
            fresh.add_variable(rest);
            block = Some(fresh);
            section = Section::Variables;
            continue;
        }
        if let Some(rest) = line.strip_prefix("Values:") {
            if let Some(block) = block.as_mut() {
                section = Section::Values;
                block.add_values(rest);
            }
            continue;
        }
        if line.starts_with("Binary:") {
            section = Section::Outside;
            continue;
        }

        match (section, block.as_mut()) {
            (Section::Variables, Some(block)) => block.add_variable(line),
            (Section::Values, Some(block)) => block.add_values(raw),
            _ => {}
        }
    }
    keep_longest(block.take(), &mut best);

    if let Some(series) = &best {
        debug!(points = series.len(), nodes = series.voltages.len(), "decoded variable block");
    }
    best
}
