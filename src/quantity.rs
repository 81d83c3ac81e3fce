//! SI-prefixed physical quantities.
//!
//! Component values arrive from the editor as free text ("15kΩ", "1µF",
//! "10meg", "3.3"). [`parse_quantity`] turns them into base-unit magnitudes;
//! [`format_quantity`] writes the engineering form used in device lines.

/// Prefix table in formatting order (largest first).
const PREFIXES: &[(&str, f64)] = &[
    ("t", 1e12),
    ("g", 1e9),
    ("meg", 1e6),
    ("k", 1e3),
    ("", 1.0),
    ("m", 1e-3),
    ("u", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
];

/// Single trailing unit letters that are dropped before prefix matching.
const UNIT_LETTERS: &[char] = &['F', 'H', 'V', 'A', 'W', 's'];

/// Parse a free-text quantity into base SI units.
///
/// Returns `fallback` when the text cannot be read as a number. Lowercase `m`
/// is milli; `meg` (any case) and uppercase `M` are mega.
///
/// ```
/// use netdeck_core::quantity::parse_quantity;
///
/// assert_eq!(parse_quantity("15kΩ", 0.0), 15_000.0);
/// assert_eq!(parse_quantity("10meg", 0.0), 10_000_000.0);
/// assert_eq!(parse_quantity("n/a", 1e3), 1e3);
/// ```
pub fn parse_quantity(text: &str, fallback: f64) -> f64 {
    let cleaned = strip_units(text);
    if cleaned.is_empty() {
        return fallback;
    }

    let value = match split_mantissa(&cleaned) {
        Some((mantissa, suffix)) => mantissa
            .parse::<f64>()
            .ok()
            .and_then(|m| prefix_multiplier(suffix).map(|mult| m * mult)),
        None => None,
    }
    .or_else(|| cleaned.parse::<f64>().ok());

    match value {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    }
}

/// Format a magnitude in engineering notation with an SI prefix.
///
/// The output is accepted by [`parse_quantity`] and by SPICE engines.
pub fn format_quantity(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs();
    let (prefix, scale) = PREFIXES
        .iter()
        .find(|(_, scale)| magnitude >= *scale * (1.0 - 1e-12))
        .copied()
        .unwrap_or(("f", 1e-15));

    let mantissa = value / scale;
    // Trim float noise such as 4.699999999999999 so decks stay readable.
    let rounded = (mantissa * 1e9).round() / 1e9;
    format!("{}{}", rounded, prefix)
}

/// Remove ohm glyphs, separators and a trailing unit word.
fn strip_units(text: &str) -> String {
    let mut s: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != 'Ω' && *c != '\u{2126}')
        .collect();

    let lower = s.to_ascii_lowercase();
    for word in ["ohms", "ohm", "hz"] {
        if lower.ends_with(word) && s.len() > word.len() {
            s.truncate(s.len() - word.len());
            return s;
        }
    }

    if let Some(last) = s.chars().last() {
        let before = s.len() - last.len_utf8();
        if UNIT_LETTERS.contains(&last) && before > 0 {
            s.truncate(before);
        }
    }

    s
}

/// Split `[sign] mantissa [exponent]` from a trailing alphabetic suffix.
fn split_mantissa(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut i = 0;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut has_digits = i > digits_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        has_digits |= i > frac_start;
    }

    if !has_digits {
        return None;
    }

    // Exponent only when digits follow; "1e" or "1f" are prefixes, not exponents.
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    let (mantissa, suffix) = s.split_at(i);
    if suffix.chars().all(|c| c.is_alphabetic()) {
        Some((mantissa, suffix))
    } else {
        None
    }
}

/// Multiplier for the prefix at the start of `suffix`.
fn prefix_multiplier(suffix: &str) -> Option<f64> {
    let Some(first) = suffix.chars().next() else {
        return Some(1.0);
    };

    if suffix.to_ascii_lowercase().starts_with("meg") {
        return Some(1e6);
    }

    match first {
        'M' => Some(1e6),
        'm' => Some(1e-3),
        'µ' | 'μ' => Some(1e-6),
        c => match c.to_ascii_lowercase() {
            't' => Some(1e12),
            'g' => Some(1e9),
            'k' => Some(1e3),
            'u' => Some(1e-6),
            'n' => Some(1e-9),
            'p' => Some(1e-12),
            'f' => Some(1e-15),
            _ => None,
        },
    }
}
