// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use std::collections::HashMap;

pub const DEFAULT_BASE: &str = "TWD";

/// The stock approximation carried over from the original books:
/// one US dollar counts as 32 base units. Not a live rate.
pub fn default_usd_rate() -> Decimal {
    Decimal::from(32)
}

/// Fixed conversion table used when valuing holdings in the base
/// currency. Rates are per-currency constants configured via settings;
/// a currency without a rate is treated at par with the base.
#[derive(Debug, Clone)]
pub struct FxTable {
    base: String,
    rates: HashMap<String, Decimal>,
}

impl FxTable {
    pub fn new(base: impl Into<String>) -> Self {
        FxTable {
            base: base.into(),
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: impl Into<String>, rate: Decimal) -> Self {
        self.rates.insert(currency.into(), rate);
        self
    }

    pub fn set_rate(&mut self, currency: impl Into<String>, rate: Decimal) {
        self.rates.insert(currency.into(), rate);
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn rate(&self, currency: &str) -> Decimal {
        if currency == self.base {
            return Decimal::ONE;
        }
        self.rates
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    pub fn rates(&self) -> impl Iterator<Item = (&str, Decimal)> {
        let mut entries: Vec<(&str, Decimal)> =
            self.rates.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    pub fn has_rate(&self, currency: &str) -> bool {
        currency == self.base || self.rates.contains_key(currency)
    }

    pub fn to_base(&self, amount: Decimal, currency: &str) -> Decimal {
        amount * self.rate(currency)
    }
}

impl Default for FxTable {
    fn default() -> Self {
        FxTable::new(DEFAULT_BASE).with_rate("USD", default_usd_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_currency_is_par() {
        let fx = FxTable::default();
        assert_eq!(fx.to_base(Decimal::from(500), "TWD"), Decimal::from(500));
    }

    #[test]
    fn usd_uses_configured_rate() {
        let fx = FxTable::default();
        assert_eq!(fx.to_base(Decimal::from(10), "USD"), Decimal::from(320));

        let fx = FxTable::new("TWD").with_rate("USD", Decimal::from(30));
        assert_eq!(fx.to_base(Decimal::from(10), "USD"), Decimal::from(300));
    }

    #[test]
    fn unknown_currency_is_par() {
        let fx = FxTable::default();
        assert_eq!(fx.to_base(Decimal::from(7), "JPY"), Decimal::from(7));
        assert!(!fx.has_rate("JPY"));
    }
}
