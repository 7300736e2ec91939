//! Peso amount formatting and funding progress.

use crate::types::Centavos;

/// Format centavos as a peso string with thousands separators,
/// e.g. `123456` -> `"₱1,234.56"`.
pub fn format_php(amount: Centavos) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let whole = (abs / 100).to_string();
    let cents = abs % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}₱{grouped}.{cents:02}")
}

/// Percentage of the target raised so far, capped at 100 and rounded to one
/// decimal place. A zero target reports 0.
pub fn progress_pct(raised: Centavos, target: Centavos) -> f64 {
    if target <= 0 {
        return 0.0;
    }
    let pct = (raised.max(0) as f64 / target as f64) * 100.0;
    (pct.min(100.0) * 10.0).round() / 10.0
}
