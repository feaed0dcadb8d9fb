//! Currency rendering for chart axes and tooltips.
//!
//! Two independent forms: `format_axis_label` compacts magnitudes with K/M/B
//! suffixes, `format_tooltip` always shows the full amount to the cent.

pub const CURRENCY_SYMBOL: &str = "$";
pub const NON_FINITE_PLACEHOLDER: &str = "n/a";

const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;

pub fn format_axis_label(value: f64) -> String {
    if !value.is_finite() {
        return NON_FINITE_PLACEHOLDER.to_string();
    }
    let magnitude = value.abs();
    let body = if magnitude >= BILLION {
        format!("{}B", to_fixed(magnitude / BILLION, 1))
    } else if magnitude >= MILLION {
        format!("{}M", to_fixed(magnitude / MILLION, 1))
    } else if magnitude >= THOUSAND {
        format!("{}K", to_fixed(magnitude / THOUSAND, 0))
    } else {
        format_plain(magnitude)
    };
    with_currency(value, body)
}

pub fn format_tooltip(value: f64) -> String {
    if !value.is_finite() {
        return NON_FINITE_PLACEHOLDER.to_string();
    }
    let fixed = to_fixed(value.abs(), 2);
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    with_currency(value, format!("{}.{fraction}", group_thousands(integer)))
}

fn format_plain(magnitude: f64) -> String {
    let fixed = to_fixed(magnitude, 3);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed.split_once('.') {
        Some((integer, fraction)) => format!("{}.{fraction}", group_thousands(integer)),
        None => group_thousands(trimmed),
    }
}

/// Fixed-point digits of a non-negative value, ties rounded away from zero.
///
/// `{:.N}` rounds ties to even, so the value is scaled and rounded first and
/// only the integral result goes through the formatter.
fn to_fixed(magnitude: f64, decimals: usize) -> String {
    let scaled = (magnitude * 10f64.powi(decimals as i32)).round();
    if !scaled.is_finite() {
        return format!("{magnitude:.decimals$}");
    }
    let digits = format!("{scaled:.0}");
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (integer, fraction) = padded.split_at(padded.len() - decimals);
    format!("{integer}.{fraction}")
}

fn with_currency(value: f64, body: String) -> String {
    let is_zero = body.chars().all(|c| !c.is_ascii_digit() || c == '0');
    if value < 0.0 && !is_zero {
        format!("-{CURRENCY_SYMBOL}{body}")
    } else {
        format!("{CURRENCY_SYMBOL}{body}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
