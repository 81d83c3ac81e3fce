//! Run-together row tokenizer.
//!
//! For very small magnitudes the engine can drop the column separators and
//! print a whole row as one string:
//!
//! ```text
//! 4999994.999830e-024.999830e-025.000000e+00
//! ```
//!
//! Every value is printed with a single leading digit, so a digit directly
//! followed by `.` always starts a new number. That splits the row above into
//! index `499999` and values `4.999830e-02`, `4.999830e-02`, `5.000000e+00`.

/// Split a row into its integer index and the values after it.
///
/// Whitespace, where present, is still a hard separator. Returns `None` when
/// any part of the row is not numeric.
pub fn split_row(row: &str) -> Option<(usize, Vec<f64>)> {
    let mut chunks = row.split_whitespace();
    let (index, rest) = split_index(chunks.next()?)?;

    let mut values = scan_numbers(rest)?;
    for chunk in chunks {
        values.extend(scan_numbers(chunk)?);
    }
    Some((index, values))
}

fn split_index(chunk: &str) -> Option<(usize, &str)> {
    let bytes = chunk.as_bytes();
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    let end = if bytes.get(digits) == Some(&b'.') {
        digits.checked_sub(1)?
    } else {
        digits
    };
    if end == 0 {
        return None;
    }
    let index = chunk[..end].parse().ok()?;
    Some((index, &chunk[end..]))
}

fn scan_numbers(mut text: &str) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    while !text.is_empty() {
        let len = number_len(text.as_bytes())?;
        values.push(text[..len].parse().ok()?);
        text = &text[len..];
    }
    Some(values)
}

/// Length of the number at the front of `b`.
fn number_len(b: &[u8]) -> Option<usize> {
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    i = digit_run(b, i, true);
    let mut has_digits = i > int_start;

    if b.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        i = digit_run(b, frac_start, false);
        has_digits |= i > frac_start;
    }
    if !has_digits {
        return None;
    }

    if matches!(b.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        j = digit_run(b, exp_start, false);
        if j == exp_start {
            return None;
        }
        i = j;
    }
    Some(i)
}

/// End of the digit run starting at `start`, stopping before a digit that is
/// followed by `.`. The integer part may keep its first such digit.
fn digit_run(b: &[u8], start: usize, integer_part: bool) -> usize {
    let mut i = start;
    while i < b.len() && b[i].is_ascii_digit() {
        let starts_next = b.get(i + 1) == Some(&b'.');
        if starts_next && !(integer_part && i == start) {
            break;
        }
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_run_together_row() {
        let (index, values) = split_row("4999994.999830e-024.999830e-025.000000e+00").unwrap();
        assert_eq!(index, 499999);
        assert_eq!(values.len(), 3);
        assert_relative_eq!(values[0], 4.999830e-02);
        assert_relative_eq!(values[1], 4.999830e-02);
        assert_relative_eq!(values[2], 5.000000e+00);
    }

    #[test]
    fn test_signs_and_zero_index() {
        let (index, values) = split_row("00.000000e+00-1.250000e-035.0e+00").unwrap();
        assert_eq!(index, 0);
        assert_eq!(values, vec![0.0, -1.25e-3, 5.0]);
    }

    #[test]
    fn test_mixed_whitespace() {
        let (index, values) = split_row("12\t1.0e-034.0e+00  -2.5e-01").unwrap();
        assert_eq!(index, 12);
        assert_eq!(values, vec![1.0e-3, 4.0, -0.25]);
    }

    #[test]
    fn test_plain_decimals() {
        let (index, values) = split_row("30.50.25").unwrap();
        assert_eq!(index, 3);
        assert_eq!(values, vec![0.5, 0.25]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(split_row(""), None);
        assert_eq!(split_row("Index time v(1)"), None);
        assert_eq!(split_row("4.5e-02"), None);
        assert_eq!(split_row("51.0e-02x"), None);
        assert_eq!(split_row("51.0e"), None);
    }
}
