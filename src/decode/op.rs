//! Operating-point lines.
//!
//! Recognized forms, one per line:
//!
//! ```text
//! v(2) = 2.500000e+00
//! V(1)                             5.000000e+00
//! i(v1) = -5.000000e-03
//! v1#branch                        -5.00000e-03
//! ```

use super::{parse_voltage_name, OperatingPoint};

/// Collect every operating-point line in `output`.
///
/// Later lines overwrite earlier ones for the same key.
pub fn parse(output: &str) -> OperatingPoint {
    let mut op = OperatingPoint::default();
    for line in output.lines() {
        let tokens: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == '=')
            .filter(|t| !t.is_empty())
            .collect();
        let [name, value] = tokens[..] else {
            continue;
        };
        let Some(value) = value.parse::<f64>().ok().filter(|v| v.is_finite()) else {
            continue;
        };

        if let Some(node) = parse_voltage_name(name) {
            op.voltages.insert(node, value);
        } else if let Some(device) = branch_device(name) {
            op.currents.insert(device, value);
        }
    }
    op
}

/// Lowercase device name from `i(<dev>)` or `<dev>#branch`.
fn branch_device(name: &str) -> Option<String> {
    let lower = name.to_ascii_lowercase();
    let device = match lower.strip_prefix("i(") {
        Some(rest) => rest.strip_suffix(')')?,
        None => lower.strip_suffix("#branch")?,
    };
    if device.is_empty() {
        None
    } else {
        Some(device.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::NodeId;

    #[test]
    fn test_all_forms() {
        let output = "\
\tNode                                  Voltage
\t----                                  -------
\tV(2)                             2.500000e+00
\tV(1)                             5.000000e+00

\tSource\tCurrent
\tv1#branch                        -5.00000e-03
v(3) = 1.25
i(R1) = 2.5e-3
";
        let op = parse(output);
        assert_eq!(op.voltages.get(&NodeId(1)), Some(&5.0));
        assert_eq!(op.voltages.get(&NodeId(2)), Some(&2.5));
        assert_eq!(op.voltages.get(&NodeId(3)), Some(&1.25));
        assert_eq!(op.currents.get("v1"), Some(&-5e-3));
        assert_eq!(op.currents.get("r1"), Some(&2.5e-3));
    }

    #[test]
    fn test_ignores_other_lines() {
        let output = "\
Index   time            v(1)
0       0.0             1.0
Node Voltage
v(out) = 3.0
v(1) = nan
#branch 1.0
doAnalyses: TRAN:  Timestep too small
";
        assert!(parse(output).is_empty());
    }
}
