//! Number parsing and formatting shared by the analyzer, the engine and the CLI.

/// Parses a cell as a finite float. Surrounding whitespace is ignored.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Renders a float the way it is written back into a cell: shortest text that
/// round-trips, integral values without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoids "-0"
        return "0".to_owned();
    }
    value.to_string()
}

/// Fixed-point text with exactly `decimals` digits after the point.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// Rounds through the fixed-point representation so the result matches what
/// [`format_fixed`] would print.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format_fixed(value, decimals).parse().unwrap_or(value)
}

/// Formats an optional f64 to 2 decimal places, or returns "—" if None or non-finite.
pub fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.2}"),
        _ => "—".to_owned(),
    }
}
