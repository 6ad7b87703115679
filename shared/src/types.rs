//! Common types used across the dashboard

/// Symbol shown after an amount for a currency code
///
/// An empty code falls back to the euro sign.
pub fn currency_symbol(code: &str) -> &str {
    match code.trim() {
        "" | "EUR" => "€",
        "USD" => "$",
        "GBP" => "£",
        other => other,
    }
}

/// Format an amount with two decimals followed by its currency symbol
pub fn format_money(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", amount, currency_symbol(currency))
}

/// Format a quantity without a trailing `.0` for whole numbers
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

/// Optional text cell, `-` when absent or blank
pub fn cell_or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// A plural-aware French noun used in list footers and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Noun {
    pub singular: &'static str,
    pub plural: &'static str,
    pub feminine: bool,
}

impl Noun {
    pub const fn masculine(singular: &'static str, plural: &'static str) -> Self {
        Self {
            singular,
            plural,
            feminine: false,
        }
    }

    pub const fn feminine(singular: &'static str, plural: &'static str) -> Self {
        Self {
            singular,
            plural,
            feminine: true,
        }
    }

    /// "3 lots", "1 expédition"
    pub fn count(&self, n: usize) -> String {
        format!("{} {}", n, if n > 1 { self.plural } else { self.singular })
    }

    /// Past participle agreeing with the noun, e.g. "affichées"
    pub fn agree(&self, stem: &str, n: usize) -> String {
        let mut word = stem.to_string();
        if self.feminine {
            word.push('e');
        }
        if n > 1 {
            word.push('s');
        }
        word
    }
}
