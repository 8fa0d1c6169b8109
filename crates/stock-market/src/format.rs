//! Text formatting helpers for tool output

use crate::types::{FundamentalsSnapshot, IndexQuote};

const TRILLION: f64 = 1e12;
const BILLION: f64 = 1e9;

/// Format with two decimals and thousands separators: `42221.3` → `42,221.30`
pub fn format_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits = int_part.len();
    let mut grouped = String::with_capacity(digits + digits / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // No sign when rounding hides the magnitude
    let shows_nonzero = fixed.bytes().any(|b| (b'1'..=b'9').contains(&b));
    let sign = if value < 0.0 && shows_nonzero { "-" } else { "" };

    format!("{sign}{grouped}.{frac_part}")
}

/// Market cap with a T suffix at or above one trillion, B below
pub fn format_market_cap(cap: f64) -> String {
    if cap >= TRILLION {
        format!("${:.2}T", cap / TRILLION)
    } else {
        format!("${:.2}B", cap / BILLION)
    }
}

/// Signed change: `+1.23`, `-0.50`, or `N/A` when absent or zero
pub fn format_change(change: Option<f64>) -> String {
    match change.filter(|c| *c != 0.0) {
        Some(c) if c >= 0.0 => format!("+{:.2}", c.abs()),
        Some(c) => format!("{c:.2}"),
        None => "N/A".to_string(),
    }
}

/// Signed percentage: `+0.52%`, `-0.15%`, or `N/A` when absent or zero
pub fn format_change_percent(percent: Option<f64>) -> String {
    match percent.filter(|p| *p != 0.0) {
        Some(p) if p >= 0.0 => format!("+{:.2}%", p.abs()),
        Some(p) => format!("{p:.2}%"),
        None => "N/A".to_string(),
    }
}

/// Fundamentals report; `None` when there is nothing but a name to show
pub fn render_fundamentals(symbol: &str, snapshot: &FundamentalsSnapshot) -> Option<String> {
    if snapshot.is_empty() {
        return None;
    }

    let name = snapshot.name.as_deref().unwrap_or("N/A");
    let mut report = format!("**{name} ({symbol}) - Financial Fundamentals**\n\n");

    if let Some(price) = snapshot.current_price {
        report += &format!("Current Price: ${price:.2}\n");
    }
    if let Some(cap) = snapshot.market_cap {
        report += &format!("Market Capitalization: {}\n", format_market_cap(cap));
    }
    if let Some(pe) = snapshot.pe_ratio {
        report += &format!("P/E Ratio: {pe:.2}\n");
    }
    if let Some(dividend) = snapshot.dividend_yield {
        report += &format!("Dividend Yield: {:.2}%\n", dividend * 100.0);
    }
    if let Some((low, high)) = snapshot.fifty_two_week_range() {
        report += &format!("52-Week Range: ${low:.2} - ${high:.2}\n");
    }

    Some(report)
}

/// One market summary line
pub fn render_index_line(quote: &IndexQuote) -> String {
    match quote.price {
        Some(price) => format!(
            "{} ({}): ${} ({}, {})",
            quote.label,
            quote.symbol,
            format_thousands(price),
            format_change(quote.change),
            format_change_percent(quote.change_percent),
        ),
        None => format!("{} ({}): Data unavailable", quote.label, quote.symbol),
    }
}
