//! Display formatting for monetary amounts.

use std::collections::HashMap;

use lazy_static::lazy_static;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY_CODE: &str = "USD";

/// How a currency is written: symbol, placement, separators and minor-unit digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    pub symbol_after: bool,
    pub decimal_separator: char,
    pub group_separator: char,
    pub decimals: u32,
}

impl Currency {
    fn prefixed(code: &str, symbol: &str, decimals: u32) -> Self {
        Self {
            code: code.to_string(),
            symbol: symbol.to_string(),
            symbol_after: false,
            decimal_separator: '.',
            group_separator: ',',
            decimals,
        }
    }

    fn suffixed(code: &str, symbol: &str, group_separator: char) -> Self {
        Self {
            code: code.to_string(),
            symbol: symbol.to_string(),
            symbol_after: true,
            decimal_separator: ',',
            group_separator,
            decimals: 2,
        }
    }

    /// Looks up a known currency by ISO code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Currency> {
        CURRENCIES.get(&code.trim().to_uppercase()).cloned()
    }

    /// Known currency for `code`, or a generic one that writes the code after the amount.
    pub fn from_code_or_generic(code: &str) -> Currency {
        Self::from_code(code).unwrap_or_else(|| {
            let upper = code.trim().to_uppercase();
            Currency {
                code: upper.clone(),
                symbol: upper,
                symbol_after: true,
                decimal_separator: '.',
                group_separator: ',',
                decimals: 2,
            }
        })
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::prefixed(DEFAULT_CURRENCY_CODE, "$", 2)
    }
}

lazy_static! {
    static ref CURRENCIES: HashMap<String, Currency> = {
        let list = vec![
            Currency::prefixed("USD", "$", 2),
            Currency::prefixed("CAD", "CA$", 2),
            Currency::prefixed("AUD", "A$", 2),
            Currency::prefixed("GBP", "£", 2),
            Currency::prefixed("JPY", "¥", 0),
            Currency::prefixed("INR", "₹", 2),
            Currency::prefixed("CHF", "CHF ", 2),
            Currency::suffixed("EUR", "€", '.'),
            Currency::suffixed("SEK", "kr", ' '),
            Currency::suffixed("NOK", "kr", ' '),
            Currency::suffixed("DKK", "kr.", '.'),
            Currency::suffixed("PLN", "zł", ' '),
            Currency {
                decimals: 0,
                ..Currency::suffixed("VND", "₫", '.')
            },
        ];
        list.into_iter()
            .map(|c| (c.code.clone(), c))
            .collect()
    };
}

/// Formats `amount` for display, e.g. `$1,234.50`, `1.234,50 €`, `-¥1,235`.
///
/// Non-finite amounts are written as zero.
pub fn format_currency(amount: f64, currency: &Currency) -> String {
    let value = Decimal::from_f64(amount)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(currency.decimals, RoundingStrategy::MidpointAwayFromZero);
    let negative = value.is_sign_negative() && !value.is_zero();
    let number = format_number(value.abs(), currency);

    let body = if currency.symbol_after {
        format!("{} {}", number, currency.symbol)
    } else {
        format!("{}{}", currency.symbol, number)
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Formats an amount with two decimals and no symbol, the way grid cells show it.
pub fn format_plain(amount: f64) -> String {
    let value = Decimal::from_f64(amount)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", value)
}

fn format_number(value: Decimal, currency: &Currency) -> String {
    let fixed = format!("{:.*}", currency.decimals as usize, value);
    let (integer, fraction) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed, None),
    };

    let mut grouped = String::new();
    let digits: Vec<char> = integer.chars().collect();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(currency.group_separator);
        }
        grouped.push(*digit);
    }

    match fraction {
        Some(f) => format!("{}{}{}", grouped, currency.decimal_separator, f),
        None => grouped,
    }
}
