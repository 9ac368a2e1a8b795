fn group_thousands(integer: &str) -> String {
    let digits = integer.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit as char);
    }
    grouped
}

pub fn format_price(price: f64) -> String {
    let price = if price.is_finite() { price } else { 0.0 };
    let sign = if price < 0.0 { "-" } else { "" };
    let magnitude = price.abs();

    let mut fixed = if magnitude < 1.0 {
        format!("{magnitude:.6}")
    } else {
        format!("{magnitude:.2}")
    };
    if magnitude < 1.0 {
        while fixed.ends_with('0') && fixed.len() - fixed.find('.').unwrap_or(0) > 3 {
            fixed.pop();
        }
    }

    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    format!("{sign}${}.{fraction}", group_thousands(integer))
}

pub fn format_signed_percent(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.decimals$}%")
}

pub fn format_cap_billions(market_cap: f64) -> String {
    let market_cap = if market_cap.is_finite() { market_cap } else { 0.0 };
    format!("Cap: ${:.2}B", market_cap / 1e9)
}

pub fn format_compact_currency(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let value = if value.is_finite() { value } else { 0.0 };
    for (scale, suffix) in UNITS {
        if value >= scale {
            return format!("${:.2}{suffix}", value / scale);
        }
    }
    format!("${value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_precision_depends_on_magnitude() {
        assert_eq!(format_price(64_000.5), "$64,000.50");
        assert_eq!(format_price(1.0), "$1.00");
        assert_eq!(format_price(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_price(0.123456), "$0.123456");
        assert_eq!(format_price(0.5), "$0.50");
        assert_eq!(format_price(0.0001234), "$0.000123");
        assert_eq!(format_price(f64::NAN), "$0.00");
    }

    #[test]
    fn percentages_carry_a_sign() {
        assert_eq!(format_signed_percent(20.0, 1), "+20.0%");
        assert_eq!(format_signed_percent(0.0, 2), "+0.00%");
        assert_eq!(format_signed_percent(-2.346, 2), "-2.35%");
    }

    #[test]
    fn market_caps_are_abbreviated() {
        assert_eq!(format_cap_billions(5e9), "Cap: $5.00B");
        assert_eq!(format_cap_billions(1.234e12), "Cap: $1234.00B");
        assert_eq!(format_compact_currency(1.5e12), "$1.50T");
        assert_eq!(format_compact_currency(2.5e6), "$2.50M");
        assert_eq!(format_compact_currency(12.0), "$12.00");
    }
}
