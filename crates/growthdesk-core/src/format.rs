/// Render `value` with `,` thousands separators and a fixed number of
/// decimals, e.g. `format_money(55250.0, 0) == "55,250"`.
pub fn format_money(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let factor = 10f64.powi(decimals as i32);
    let rounded = (value.abs() * factor).round() / factor;
    let fixed = format!("{:.*}", decimals, rounded);
    let (whole, fraction) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && rounded != 0.0;
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// `format_money` with a leading currency symbol placed after the sign.
pub fn format_currency(value: f64, decimals: usize) -> String {
    let formatted = format_money(value, decimals);
    match formatted.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${formatted}"),
    }
}
