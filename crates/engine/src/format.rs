//! Display formatting by `ValueKind`.
//!
//! Formatting never feeds back into computation. Percentages are stored in
//! percent units (`12.5` renders as `12.5%`).

use crate::node::ValueKind;

#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    pub currency_symbol: String,
    pub currency_decimals: u8,
    pub percent_decimals: u8,
    pub count_decimals: u8,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            currency_decimals: 0,
            percent_decimals: 1,
            count_decimals: 0,
        }
    }
}

impl FormatOptions {
    fn decimals(&self, kind: ValueKind) -> usize {
        match kind {
            ValueKind::Currency => self.currency_decimals as usize,
            ValueKind::Percentage => self.percent_decimals as usize,
            ValueKind::Count => self.count_decimals as usize,
        }
    }
}

/// Full-precision display: `$1,234,567`, `-$250`, `12.5%`, `1,200`.
pub fn format_value(value: f64, kind: ValueKind, opts: &FormatOptions) -> String {
    let (negative, digits) = grouped(value, opts.decimals(kind));
    let sign = if negative { "-" } else { "" };
    match kind {
        ValueKind::Currency => format!("{sign}{}{digits}", opts.currency_symbol),
        ValueKind::Percentage => format!("{sign}{digits}%"),
        ValueKind::Count => format!("{sign}{digits}"),
    }
}

/// Short display for node cards: `$1.2M`, `$45.0K`, `3.4K`.
///
/// Percentages and magnitudes under a thousand fall back to `format_value`.
pub fn format_compact(value: f64, kind: ValueKind, opts: &FormatOptions) -> String {
    if kind == ValueKind::Percentage {
        return format_value(value, kind, opts);
    }

    let abs = value.abs();
    let Some(mut scale) = COMPACT_SCALES.iter().rposition(|&(div, _)| abs >= div) else {
        return format_value(value, kind, opts);
    };

    // Rounding can carry into the next scale: 999_950 is $1.0M, not $1000.0K
    let mut digits = format!("{:.1}", abs / COMPACT_SCALES[scale].0);
    if digits == "1000.0" && scale + 1 < COMPACT_SCALES.len() {
        scale += 1;
        digits = format!("{:.1}", abs / COMPACT_SCALES[scale].0);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let prefix = match kind {
        ValueKind::Currency => opts.currency_symbol.as_str(),
        _ => "",
    };
    format!("{sign}{prefix}{digits}{}", COMPACT_SCALES[scale].1)
}

const COMPACT_SCALES: [(f64, &str); 3] = [(1e3, "K"), (1e6, "M"), (1e9, "B")];

/// Signed change display: `+$1,200`, `-$300`, `+2.5%`, `±0`.
pub fn format_delta(delta: f64, kind: ValueKind, opts: &FormatOptions) -> String {
    let body = format_value(delta.abs(), kind, opts);
    let (negative, digits) = grouped(delta, opts.decimals(kind));
    if negative {
        format!("-{body}")
    } else if is_zero(&digits) {
        format!("±{body}")
    } else {
        format!("+{body}")
    }
}

/// Round to `decimals` and group the integer part by thousands.
///
/// Returns `(negative, digits)`; values that round to zero are never negative.
fn grouped(value: f64, decimals: usize) -> (bool, String) {
    let rounded = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rounded.as_str(), None),
    };

    let mut out = group_thousands(int_part);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }

    (value < 0.0 && !is_zero(&rounded), out)
}

fn is_zero(digits: &str) -> bool {
    digits.chars().all(|c| matches!(c, '0' | '.' | ','))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> FormatOptions {
        FormatOptions::default()
    }

    #[test]
    fn test_currency() {
        assert_eq!(format_value(1_234_567.0, ValueKind::Currency, &opts()), "$1,234,567");
        assert_eq!(format_value(-250.0, ValueKind::Currency, &opts()), "-$250");
        assert_eq!(format_value(999.6, ValueKind::Currency, &opts()), "$1,000");
        assert_eq!(format_value(0.0, ValueKind::Currency, &opts()), "$0");
    }

    #[test]
    fn test_currency_custom_symbol_and_decimals() {
        let opts = FormatOptions {
            currency_symbol: "€".to_string(),
            currency_decimals: 2,
            ..FormatOptions::default()
        };
        assert_eq!(format_value(1234.5, ValueKind::Currency, &opts), "€1,234.50");
    }

    #[test]
    fn test_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(format_value(-0.4, ValueKind::Currency, &opts()), "$0");
        assert_eq!(format_value(-0.0, ValueKind::Count, &opts()), "0");
    }

    #[test]
    fn test_percentage_and_count() {
        assert_eq!(format_value(12.5, ValueKind::Percentage, &opts()), "12.5%");
        assert_eq!(format_value(-3.0, ValueKind::Percentage, &opts()), "-3.0%");
        assert_eq!(format_value(1200.0, ValueKind::Count, &opts()), "1,200");
    }

    #[test]
    fn test_compact() {
        assert_eq!(format_compact(1_234_567.0, ValueKind::Currency, &opts()), "$1.2M");
        assert_eq!(format_compact(45_000.0, ValueKind::Currency, &opts()), "$45.0K");
        assert_eq!(format_compact(-2_500_000_000.0, ValueKind::Currency, &opts()), "-$2.5B");
        assert_eq!(format_compact(3400.0, ValueKind::Count, &opts()), "3.4K");
        assert_eq!(format_compact(640.0, ValueKind::Count, &opts()), "640");
        assert_eq!(format_compact(45.26, ValueKind::Percentage, &opts()), "45.3%");
    }

    #[test]
    fn test_compact_rounding_carries_to_next_scale() {
        assert_eq!(format_compact(999_950.0, ValueKind::Currency, &opts()), "$1.0M");
        assert_eq!(format_compact(999_999.0, ValueKind::Currency, &opts()), "$1.0M");
        assert_eq!(format_compact(-999_999_999.0, ValueKind::Currency, &opts()), "-$1.0B");
        assert_eq!(format_compact(999_940.0, ValueKind::Count, &opts()), "999.9K");
        assert_eq!(format_compact(999_999_999_999.0, ValueKind::Count, &opts()), "1000.0B");
    }

    #[test]
    fn test_delta() {
        assert_eq!(format_delta(1200.0, ValueKind::Currency, &opts()), "+$1,200");
        assert_eq!(format_delta(-300.0, ValueKind::Currency, &opts()), "-$300");
        assert_eq!(format_delta(2.5, ValueKind::Percentage, &opts()), "+2.5%");
        assert_eq!(format_delta(0.0, ValueKind::Count, &opts()), "±0");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
