//! Ohm's-law answer for the single source + single resistor deck.
//!
//! Used only when the engine output holds nothing usable. It recognizes
//! exactly one topology and refuses everything else.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::circuit::NodeId;
use crate::config::DEFAULT_TRAN_STOP;
use crate::decode::{DecodedSeries, OperatingPoint};
use crate::error::{NetdeckError, Result};
use crate::quantity::parse_quantity;

/// Result of the analytic solve.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticSolution {
    /// Two samples, at t = 0 and at the transient stop time
    pub series: DecodedSeries,
    /// Node voltages plus resistor and source currents
    pub operating_point: OperatingPoint,
    /// Resistor current (amperes)
    pub current: f64,
}

struct Source {
    name: String,
    pos: NodeId,
    neg: NodeId,
    volts: f64,
}

struct Resistor {
    name: String,
    a: NodeId,
    b: NodeId,
    ohms: f64,
}

/// Solve `deck` if it is one DC source with one resistor across it.
pub fn solve(deck: &str) -> Result<AnalyticSolution> {
    let mut sources = Vec::new();
    let mut resistors = Vec::new();
    let mut others = 0usize;
    let mut tstop = DEFAULT_TRAN_STOP;

    for line in deck.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('*') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens[0].eq_ignore_ascii_case(".tran") {
            if let Some(stop) = tokens.get(2) {
                tstop = parse_quantity(stop, DEFAULT_TRAN_STOP);
            }
            continue;
        }
        if line.starts_with('.') {
            continue;
        }
        match tokens[0].chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('V') => sources.push(parse_source(&tokens)?),
            Some('R') => resistors.push(parse_resistor(&tokens)?),
            _ => others += 1,
        }
    }

    if sources.len() != 1 || resistors.len() != 1 || others != 0 {
        return Err(NetdeckError::fallback_unavailable(format!(
            "only a lone source and resistor can be solved analytically \
             ({} sources, {} resistors, {} other devices)",
            sources.len(),
            resistors.len(),
            others
        )));
    }
    let (source, resistor) = (&sources[0], &resistors[0]);

    let across = (resistor.a == source.pos && resistor.b == source.neg)
        || (resistor.a == source.neg && resistor.b == source.pos);
    if !across || source.pos == source.neg {
        return Err(NetdeckError::fallback_unavailable(
            "resistor is not connected across the source",
        ));
    }

    let current = source.volts / resistor.ohms;
    debug!(volts = source.volts, ohms = resistor.ohms, current, "analytic solve");

    // Node potentials with the negative terminal as reference unless it is ground.
    let mut voltages = BTreeMap::new();
    if source.neg.is_ground() {
        voltages.insert(source.pos, source.volts);
    } else if source.pos.is_ground() {
        voltages.insert(source.neg, -source.volts);
    } else {
        voltages.insert(source.pos, source.volts);
        voltages.insert(source.neg, 0.0);
    }

    let mut series = DecodedSeries::with_nodes(voltages.keys().copied());
    series.push(0.0, &voltages);
    series.push(tstop, &voltages);

    let mut currents = BTreeMap::new();
    currents.insert(resistor.name.to_ascii_lowercase(), current);
    // The engine reports source current flowing into the positive terminal.
    currents.insert(source.name.to_ascii_lowercase(), -current);

    info!(current, "analytic fallback used");
    Ok(AnalyticSolution {
        series,
        operating_point: OperatingPoint { voltages, currents },
        current,
    })
}

fn node(token: Option<&&str>) -> Result<NodeId> {
    token
        .and_then(|t| t.parse::<usize>().ok())
        .map(NodeId)
        .ok_or_else(|| NetdeckError::fallback_unavailable("device line has unreadable nodes"))
}

/// `V<name> <+> <-> [DC] <value>`
fn parse_source(tokens: &[&str]) -> Result<Source> {
    let value = match tokens.get(3) {
        Some(t) if t.eq_ignore_ascii_case("dc") => tokens.get(4),
        other => other,
    };
    let volts = value.map(|v| parse_quantity(v, f64::NAN)).unwrap_or(f64::NAN);
    if !volts.is_finite() {
        return Err(NetdeckError::fallback_unavailable("source has no DC value"));
    }
    Ok(Source {
        name: tokens[0].to_string(),
        pos: node(tokens.get(1))?,
        neg: node(tokens.get(2))?,
        volts,
    })
}

/// `R<name> <a> <b> <value>`
fn parse_resistor(tokens: &[&str]) -> Result<Resistor> {
    let ohms = tokens.get(3).map(|v| parse_quantity(v, f64::NAN)).unwrap_or(f64::NAN);
    if !(ohms.is_finite() && ohms > 0.0) {
        return Err(NetdeckError::fallback_unavailable("resistor has no usable resistance"));
    }
    Ok(Resistor {
        name: tokens[0].to_string(),
        a: node(tokens.get(1))?,
        b: node(tokens.get(2))?,
        ohms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LONE: &str = "\
* lone resistor
V1 1 0 DC 5
R1 1 0 1k
* device models
.model D1N4148 D(Is=2.52n)
.options reltol=1e-3
.op
.tran 10u 20m
.print tran v(1)
.end
";

    #[test]
    fn test_five_volts_one_kilohm() {
        let solution = solve(LONE).unwrap();
        assert_relative_eq!(solution.current, 0.005);
        assert_eq!(solution.series.time[0], 0.0);
        assert_relative_eq!(solution.series.time[1], 20e-3);
        assert_eq!(solution.series.voltages[&NodeId(1)], vec![5.0, 5.0]);
        assert_relative_eq!(solution.operating_point.currents["r1"], 0.005);
        assert_relative_eq!(solution.operating_point.currents["v1"], -0.005);
    }

    #[test]
    fn test_reversed_source() {
        let solution = solve("VBAT 0 2 9\nRLOAD 2 0 4.5k\n.end\n").unwrap();
        assert_relative_eq!(solution.current, 2e-3);
        assert_eq!(solution.operating_point.voltages[&NodeId(2)], -9.0);
        // No .tran line: default stop time.
        assert_eq!(solution.series.time[1], DEFAULT_TRAN_STOP);
    }

    #[test]
    fn test_other_topologies_are_refused() {
        let cases = [
            "V1 1 0 DC 5\nR1 1 2 1k\nR2 2 0 1k\n",
            "V1 1 0 DC 5\nR1 1 0 1k\nC1 1 0 1u\n",
            "V1 1 0 DC 5\nR1 1 2 1k\n",
            "R1 1 0 1k\n",
            "V1 1 0 DC 5\nR1 1 0 0\n",
            "",
        ];
        for deck in cases {
            assert!(
                matches!(solve(deck), Err(NetdeckError::FallbackUnavailable { .. })),
                "{deck:?}"
            );
        }
    }
}
