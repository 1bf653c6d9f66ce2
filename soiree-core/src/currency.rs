//! Currency formatting.
//!
//! Prices in the catalog are plain numbers; [`CurrencyFormatter`] turns them
//! into display text for a configured locale and ISO 4217 currency code.
//! Missing and non-finite amounts format as zero instead of failing, so a
//! half-loaded bundle still renders `₱0.00` rather than `NaN`.

use tracing::warn;

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPosition {
    /// `₱1,000.00`
    Prefix,
    /// `1.000,00 €`
    Suffix,
}

/// Number formatting rules for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocaleConventions {
    tag: &'static str,
    group: &'static str,
    decimal: &'static str,
    position: SymbolPosition,
    /// Separator between number and symbol for suffix placement.
    spacing: &'static str,
}

const EN_US: LocaleConventions = LocaleConventions {
    tag: "en-US",
    group: ",",
    decimal: ".",
    position: SymbolPosition::Prefix,
    spacing: "",
};

const LOCALES: &[LocaleConventions] = &[
    EN_US,
    LocaleConventions { tag: "en-PH", ..EN_US },
    LocaleConventions { tag: "fil-PH", ..EN_US },
    LocaleConventions { tag: "en-GB", ..EN_US },
    LocaleConventions { tag: "ja-JP", ..EN_US },
    LocaleConventions {
        tag: "de-DE",
        group: ".",
        decimal: ",",
        position: SymbolPosition::Suffix,
        spacing: "\u{a0}",
    },
    LocaleConventions {
        tag: "fr-FR",
        group: "\u{202f}",
        decimal: ",",
        position: SymbolPosition::Suffix,
        spacing: "\u{a0}",
    },
];

/// Default region for a bare language tag.
const LANGUAGE_DEFAULTS: &[(&str, &str)] = &[
    ("en", "en-US"),
    ("fil", "fil-PH"),
    ("tl", "fil-PH"),
    ("de", "de-DE"),
    ("fr", "fr-FR"),
    ("ja", "ja-JP"),
];

/// Symbol and minor-unit digits per currency.
const CURRENCIES: &[(&str, &str, u32)] = &[
    ("PHP", "₱", 2),
    ("USD", "$", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("JPY", "¥", 0),
];

fn resolve_locale(tag: &str) -> Option<LocaleConventions> {
    let normalized = tag.trim().replace('_', "-");
    let exact = LOCALES
        .iter()
        .find(|conv| conv.tag.eq_ignore_ascii_case(&normalized));
    if let Some(conv) = exact {
        return Some(*conv);
    }

    let language = normalized.split('-').next().unwrap_or_default();
    LANGUAGE_DEFAULTS
        .iter()
        .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
        .and_then(|(_, full)| LOCALES.iter().find(|conv| conv.tag == *full))
        .copied()
}

/// Formats amounts as localized currency text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormatter {
    locale: LocaleConventions,
    currency_code: String,
    symbol: String,
    minor_digits: u32,
}

impl CurrencyFormatter {
    /// Build a formatter. Unknown locales fall back to `en-US`; unknown
    /// currencies print their code with two minor digits.
    pub fn new(locale: &str, currency_code: &str) -> Self {
        let conventions = resolve_locale(locale).unwrap_or_else(|| {
            warn!(locale, "unsupported locale; formatting with en-US conventions");
            EN_US
        });

        let code = currency_code.trim().to_ascii_uppercase();
        let (symbol, minor_digits) = CURRENCIES
            .iter()
            .find(|(known, _, _)| *known == code)
            .map(|(_, symbol, digits)| (symbol.to_string(), *digits))
            .unwrap_or_else(|| (format!("{code}\u{a0}"), 2));

        Self {
            locale: conventions,
            currency_code: code,
            symbol,
            minor_digits,
        }
    }

    /// The resolved locale tag.
    pub fn locale(&self) -> &str {
        self.locale.tag
    }

    /// The upper-cased currency code.
    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    /// Format `amount`. Absent and non-finite amounts format as zero.
    pub fn format(&self, amount: Option<f64>) -> String {
        let amount = amount.filter(|a| a.is_finite()).unwrap_or(0.0);
        self.format_finite(amount)
    }

    /// The text used for missing or malformed amounts.
    pub fn zero(&self) -> String {
        self.format_finite(0.0)
    }

    /// Format a price range, collapsing equal bounds to a single price.
    pub fn format_range(&self, min: Option<f64>, max: Option<f64>) -> String {
        let low = self.format(min);
        let high = self.format(max);
        if low == high {
            low
        } else {
            format!("{low} – {high}")
        }
    }

    fn format_finite(&self, amount: f64) -> String {
        let scale = 10_u128.pow(self.minor_digits);
        let scaled = amount.abs() * scale as f64;

        let (whole, fraction, nonzero) = if scaled < u128::MAX as f64 {
            // Half away from zero at the minor-unit precision.
            let scaled = scaled.round() as u128;
            ((scaled / scale).to_string(), scaled % scale, scaled > 0)
        } else {
            // Past u128 the float has no fractional digits left to show.
            warn!(amount, "amount exceeds exact range; formatting its integer part");
            (format!("{:.0}", amount.abs().trunc()), 0, true)
        };
        let negative = amount < 0.0 && nonzero;

        let mut number = group_digits(&whole, self.locale.group);
        if self.minor_digits > 0 {
            number.push_str(self.locale.decimal);
            number.push_str(&format!(
                "{fraction:0width$}",
                width = self.minor_digits as usize
            ));
        }

        let sign = if negative { "-" } else { "" };
        match self.locale.position {
            SymbolPosition::Prefix => format!("{sign}{}{number}", self.symbol),
            SymbolPosition::Suffix => {
                let symbol = self.symbol.trim_end_matches('\u{a0}');
                format!("{sign}{number}{}{symbol}", self.locale.spacing)
            }
        }
    }
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::new("en-US", "PHP")
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}
