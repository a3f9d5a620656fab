use crate::models::NOT_AVAILABLE;

/// Convert a decimal price to an implied win probability in percent.
/// Returns None for non-positive or non-finite prices.
pub fn implied_probability_value(price: f64) -> Option<f64> {
    if price.is_finite() && price > 0.0 {
        Some(100.0 / price)
    } else {
        None
    }
}

/// Implied probability rendered to two decimals, e.g. "66.67%", or "N/A"
pub fn implied_probability(price: Option<f64>) -> String {
    match price.and_then(implied_probability_value) {
        Some(prob) => format_percent(prob, 2),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Round half away from zero to the given number of decimals
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Shortest decimal text for a number: 2.0 -> "2", 3.5 -> "3.5"
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

pub fn format_percent(value: f64, decimals: u32) -> String {
    format!("{}%", format_number(round_to(value, decimals)))
}

/// Decimal price as text, or "N/A"
pub fn format_price(price: Option<f64>) -> String {
    price
        .map(format_number)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
