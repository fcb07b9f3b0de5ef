/// Format a USD amount for chat output, compacting large values with B/M/K suffixes
/// and keeping two significant decimals after the first non-zero digit for sub-unit prices.
pub fn format_currency(value: impl Into<Option<f64>>) -> String {
    let Some(value) = value.into().filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };

    if value >= 1_000_000_000.0 {
        return format!("${:.2}B", value / 1_000_000_000.0);
    } else if value >= 1_000_000.0 {
        return format!("${:.2}M", value / 1_000_000.0);
    } else if value >= 1_000.0 {
        return format!("${:.2}K", value / 1_000.0);
    }

    if value > 0.0 && value < 1.0 {
        let fraction = format!("{:.18}", value);
        if let Some(first_non_zero) = fraction[2..].find(|c: char| ('1'..='9').contains(&c)) {
            return format!("${:.*}", first_non_zero + 3, value);
        }
    }

    format!("${:.2}", value)
}

/// Format a percentage change with an explicit sign.
pub fn format_percentage(value: impl Into<Option<f64>>) -> String {
    match value.into().filter(|v| v.is_finite()) {
        Some(v) if v >= 0.0 => format!("+{:.2}%", v),
        Some(v) => format!("{:.2}%", v),
        None => "N/A".to_string(),
    }
}

/// Format large quantities (supply, volume) without a currency sign.
pub fn format_number(value: impl Into<Option<f64>>) -> String {
    let Some(value) = value.into().filter(|v| v.is_finite() && *v != 0.0) else {
        return "N/A".to_string();
    };

    if value >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}
