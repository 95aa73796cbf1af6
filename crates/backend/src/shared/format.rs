//! pt-BR number formatting: `.` groups thousands, `,` separates decimals.

/// Formats an integer with thousands separators (dots)
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// `1234.5` with 2 decimals -> `"1.234,50"`. Non-finite values render as zero.
pub fn format_decimal(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let rounded = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rounded.as_str(), None),
    };

    let mut result = String::new();
    // "-0,00" is not useful, only print the sign when something non-zero remains
    if value < 0.0 && rounded.chars().any(|c| c.is_ascii_digit() && c != '0') {
        result.push('-');
    }
    result.push_str(&format_number(int_part.parse().unwrap_or(0)));
    if let Some(frac) = frac_part {
        result.push(',');
        result.push_str(frac);
    }
    result
}

/// Ratio in `[0, 1]` as a percentage: `0.4` -> `"40,0%"`
pub fn format_percent(ratio: f64, decimals: usize) -> String {
    format!("{}%", format_decimal(ratio * 100.0, decimals))
}

/// Amount in reais: `1234567.5` -> `"R$ 1.234.567,50"`
pub fn format_currency(value: f64) -> String {
    format!("R$ {}", format_decimal(value, 2))
}
