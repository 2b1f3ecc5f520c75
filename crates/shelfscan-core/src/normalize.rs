//! Field normalization for raw card text.

/// Price returned when the raw text holds no usable price. Never stored.
pub const SENTINEL_PRICE: &str = "0.00";

/// Canonical price with exactly two fractional digits, or [`SENTINEL_PRICE`].
///
/// Handles the storefront's Brazilian formatting: `R$` marker, `.` as the
/// thousands separator, `,` as the decimal mark and a trailing `UN` unit.
/// Unparsable, non-finite, negative and zero values all map to the sentinel.
pub fn normalize_price(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let stripped = upper
        .trim()
        .replace("R$", "")
        .replace('.', "")
        .replace("UN", "");
    let decimal = stripped.trim().replace(',', ".");

    match decimal.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => format!("{:.2}", value),
        _ => SENTINEL_PRICE.to_string(),
    }
}

/// Whether a normalized price is the "no usable price" sentinel.
pub fn is_sentinel_price(price: &str) -> bool {
    price == SENTINEL_PRICE
}

/// Collapse runs of spaces into one and trim the ends.
pub fn normalize_description(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_space = false;
    for ch in raw.chars() {
        if ch == ' ' {
            if !prev_space {
                out.push(ch);
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
