use crate::currency::Currency;

/// Group the integer part of `val` with thousands separators, two decimals,
/// sign in front: -1,234.56
fn grouped(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative && cents != "0.00" {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Format an amount with the currency symbol: ₹1,234.56
pub fn money(val: f64, currency: &Currency) -> String {
    let g = grouped(val);
    match g.strip_prefix('-') {
        Some(abs) => format!("-{}{abs}", currency.symbol),
        None => format!("{}{g}", currency.symbol),
    }
}

/// Symbol plus code suffix: $12.00 (USD)
pub fn money_with_code(val: f64, currency: &Currency) -> String {
    format!("{} ({})", money(val, currency), currency.code)
}

/// Code-prefixed form for outputs that cannot render every symbol: USD 12.00
pub fn money_code_prefixed(val: f64, currency: &Currency) -> String {
    format!("{} {}", currency.code, grouped(val))
}

/// Signed percentage with one decimal: +12.5%
pub fn signed_pct(val: f64) -> String {
    if val > 0.0 {
        format!("+{val:.1}%")
    } else {
        format!("{val:.1}%")
    }
}

/// Text gauge for a fill ratio in [0, 1]: [########------------]
pub fn gauge(fill: f64, width: usize) -> String {
    let filled = ((fill.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::by_code;

    #[test]
    fn test_money_formatting() {
        let usd = by_code("USD").unwrap();
        assert_eq!(money(1234.56, usd), "$1,234.56");
        assert_eq!(money(-500.00, usd), "-$500.00");
        assert_eq!(money(0.0, usd), "$0.00");
        assert_eq!(money(1000000.99, usd), "$1,000,000.99");
        assert_eq!(money(42.10, usd), "$42.10");
    }

    #[test]
    fn test_money_relabels_without_conversion() {
        let inr = by_code("INR").unwrap();
        let eur = by_code("EUR").unwrap();
        assert_eq!(money(250.0, inr), "₹250.00");
        assert_eq!(money(250.0, eur), "€250.00");
        assert_eq!(money_with_code(250.0, eur), "€250.00 (EUR)");
        assert_eq!(money_code_prefixed(1250.0, eur), "EUR 1,250.00");
    }

    #[test]
    fn test_signed_pct() {
        assert_eq!(signed_pct(12.345), "+12.3%");
        assert_eq!(signed_pct(-25.0), "-25.0%");
        assert_eq!(signed_pct(0.0), "0.0%");
    }

    #[test]
    fn test_gauge() {
        assert_eq!(gauge(0.5, 10), "[#####-----]");
        assert_eq!(gauge(1.7, 4), "[####]");
        assert_eq!(gauge(0.0, 4), "[----]");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
