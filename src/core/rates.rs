//! Exchange rate tables and the provider abstraction

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Normalizes user-typed currency codes, `" eur "` -> `"EUR"`.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Rates for a single base currency: `1 base = rate code`.
///
/// The base always maps to 1. Entries that are not positive finite numbers
/// are dropped when the table is built, so every stored rate is usable as a
/// divisor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    base: String,
    rates: HashMap<String, f64>,
    updated_at: Option<DateTime<Utc>>,
}

impl RateTable {
    pub fn new(base: impl Into<String>, rates: HashMap<String, f64>) -> Self {
        let base = base.into();
        let mut rates: HashMap<String, f64> = rates
            .into_iter()
            .filter(|(code, rate)| {
                let valid = rate.is_finite() && *rate > 0.0;
                if !valid {
                    debug!(%code, %rate, "Dropping unusable rate");
                }
                valid
            })
            .collect();
        rates.insert(base.clone(), 1.0);

        Self {
            base,
            rates,
            updated_at: None,
        }
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Currency codes in alphabetical order.
    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable>;
}
