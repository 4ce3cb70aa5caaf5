//! Number formatting for metric cards and chart labels.

/// `1234567.891` → `"1,234,567.89"` with `decimals = 2`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value.is_sign_negative() && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Dollar amount with two decimals, sign after the symbol (`$-12.00`).
pub fn format_currency(value: f64) -> String {
    format!("${}", format_thousands(value, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_thousands(0.0, 2), "0.00");
        assert_eq!(format_thousands(999.5, 2), "999.50");
        assert_eq!(format_thousands(1000.0, 2), "1,000.00");
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(1234567.0, 0), "1,234,567");
    }

    #[test]
    fn negatives_keep_their_sign() {
        assert_eq!(format_thousands(-1234.5, 2), "-1,234.50");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn currency() {
        assert_eq!(format_currency(100.0), "$100.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-1234.5), "$-1,234.50");
    }
}
