// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Price-update and advice collaborators, backed by the Gemini
//! `generateContent` REST API. Purely informational: nothing here
//! mutates ledger state directly.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::models::{StockHolding, StockPriceUpdate, TxKind};
use crate::utils::http_client;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.5-flash";

pub const ADVICE_FALLBACK: &str = "The advice service is unavailable right now.";

/// Supplies `(symbol, price)` updates for the current holdings. Symbols
/// absent from the response are skipped by the caller; an empty list is
/// a no-op, not an error.
pub trait PriceProvider {
    fn fetch_prices(&self, holdings: &[StockHolding]) -> Result<Vec<StockPriceUpdate>>;
}

pub struct GeminiAdvisor {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GeminiAdvisor {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LedgerError::ConfigurationInvalid(
                "Gemini API key is not set (run `tally advisor set-key <KEY>`)".into(),
            ));
        }
        let client = http_client()
            .map_err(|e| LedgerError::ConfigurationInvalid(format!("{:#}", e)))?;
        Ok(GeminiAdvisor {
            client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    fn generate(&self, body: &serde_json::Value) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, MODEL, self.api_key
        );
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| LedgerError::ServiceUnavailable(e.to_string()))?;
        let parsed: GenerateResponse = resp
            .json()
            .map_err(|e| LedgerError::ServiceUnavailable(e.to_string()))?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(text)
    }

    /// Short advisory paragraph for a financial summary. Never fails:
    /// any service problem degrades to a fixed fallback string.
    pub fn financial_advice(&self, summary: &str) -> String {
        let body = json!({
            "contents": [{ "parts": [{ "text": format!(
                "Based on this financial summary, give a short, encouraging paragraph of financial advice: {}",
                summary
            )}]}]
        });
        match self.generate(&body) {
            Ok(text) if !text.trim().is_empty() => text,
            _ => ADVICE_FALLBACK.to_string(),
        }
    }
}

impl PriceProvider for GeminiAdvisor {
    fn fetch_prices(&self, holdings: &[StockHolding]) -> Result<Vec<StockPriceUpdate>> {
        if holdings.is_empty() {
            return Ok(Vec::new());
        }
        let symbols = holdings
            .iter()
            .map(|h| h.symbol.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let body = json!({
            "contents": [{ "parts": [{ "text": format!(
                "Provide the approximate current market price for the following stock symbols: {}. \
                 Return the data as a JSON array of objects with 'symbol' and 'price' (number) properties. \
                 If you don't have exact real-time data, provide a realistic estimate based on the most \
                 recent trading data you have knowledge of. Output ONLY the JSON.",
                symbols
            )}]}],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "symbol": { "type": "STRING" },
                            "price": { "type": "NUMBER" }
                        }
                    }
                }
            }
        });
        let text = self.generate(&body)?;
        Ok(parse_price_updates(&text))
    }
}

/// Parse the model's JSON reply. Malformed replies and entries without a
/// usable price yield an empty or partial list rather than an error.
pub fn parse_price_updates(text: &str) -> Vec<StockPriceUpdate> {
    #[derive(Deserialize)]
    struct RawUpdate {
        symbol: String,
        price: f64,
    }

    let raw: Vec<RawUpdate> = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };
    raw.into_iter()
        .filter_map(|u| {
            Decimal::from_f64_retain(u.price).map(|price| StockPriceUpdate {
                symbol: u.symbol,
                price,
            })
        })
        .collect()
}

/// Summary text handed to the advice collaborator, derived from the
/// current ledger snapshot.
pub fn build_summary(ledger: &Ledger) -> String {
    let total_cash: Decimal = ledger.accounts().iter().map(|a| a.balance).sum();
    let total_stocks: Decimal = ledger.holdings().iter().map(|h| h.market_value()).sum();
    let trend = ledger.trend_by_month();
    let (last_income, last_expense) = trend
        .last()
        .map(|f| (f.income, f.expense))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO));
    let top_categories = ledger
        .category_totals(TxKind::Expense)
        .into_iter()
        .take(3)
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Total cash assets: {}\nTotal stock value: {}\nLatest month income: {}\nLatest month expense: {}\nTop expense categories: {}",
        total_cash, total_stocks, last_income, last_expense, top_categories
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_price_reply() {
        let updates =
            parse_price_updates(r#"[{"symbol":"AAPL","price":175.5},{"symbol":"2330.TW","price":580}]"#);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].symbol, "AAPL");
        assert_eq!(updates[0].price.to_string(), "175.5");
    }

    #[test]
    fn malformed_reply_yields_empty_list() {
        assert!(parse_price_updates("not json").is_empty());
        assert!(parse_price_updates(r#"{"symbol":"AAPL"}"#).is_empty());
        assert!(parse_price_updates("[]").is_empty());
    }

    #[test]
    fn summary_mentions_totals_and_categories() {
        use crate::models::{Transaction, TxKind};
        use crate::store::StoreEvent;
        use chrono::NaiveDate;

        let mut ledger = Ledger::new();
        ledger.apply(StoreEvent::Transactions(vec![
            Transaction {
                id: 1,
                account_id: 1,
                kind: TxKind::Expense,
                amount: Decimal::from(1200),
                category: "rent".into(),
                date: NaiveDate::from_ymd_opt(2023, 10, 6).unwrap(),
                note: None,
            },
            Transaction {
                id: 2,
                account_id: 1,
                kind: TxKind::Income,
                amount: Decimal::from(55000),
                category: "salary".into(),
                date: NaiveDate::from_ymd_opt(2023, 10, 5).unwrap(),
                note: None,
            },
        ]));

        let summary = build_summary(&ledger);
        assert!(summary.contains("Latest month income: 55000"));
        assert!(summary.contains("Latest month expense: 1200"));
        assert!(summary.contains("rent"));
    }
}
