//! Conversion arithmetic and the two-field synchronization policy

use crate::core::rates::RateTable;
use crate::core::sanitize::{parse_amount, sanitize_amount};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::{self, Display};
use tracing::{debug, warn};

/// Fraction digits kept in every converted amount.
pub const PRECISION: u32 = 5;

/// Label shown when a rate fetch fails.
pub const FETCH_ERROR_LABEL: &str = "Error loading rates";

/// Magnitude from which fixed-point formatting no longer applies.
const UNROUNDED_MAGNITUDE: f64 = 1e21;

/// One of the two linked amount fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// Outcome of a single conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    /// No amount to convert (empty, zero or not a number).
    Blank,
    Amount(f64),
    /// One of the currencies has no rate in the current table.
    Unavailable,
}

impl Conversion {
    pub fn value(&self) -> Option<f64> {
        match self {
            Conversion::Amount(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Conversion::Blank)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Conversion::Unavailable)
    }
}

impl Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::Blank => Ok(()),
            Conversion::Amount(v) => write!(f, "{v}"),
            Conversion::Unavailable => write!(f, "NaN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPair {
    pub from: String,
    pub to: String,
}

impl ConversionPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn code(&self, side: Side) -> &str {
        match side {
            Side::First => &self.from,
            Side::Second => &self.to,
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }
}

/// Text of the two amount fields, exactly as displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountState {
    pub first: String,
    pub second: String,
}

impl AmountState {
    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    pub fn set(&mut self, side: Side, value: String) {
        match side {
            Side::First => self.first = value,
            Side::Second => self.second = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Rounds to [`PRECISION`] fraction digits, ties away from zero.
///
/// Works on the exact decimal expansion of `value` and reparses the rounded
/// text, so the result is the double nearest to the fixed-point string.
pub fn round_amount(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= UNROUNDED_MAGNITUDE {
        return value;
    }
    match Decimal::from_f64_retain(value) {
        Some(exact) => exact
            .round_dp_with_strategy(PRECISION, RoundingStrategy::MidpointAwayFromZero)
            .to_string()
            .parse()
            .unwrap_or(value),
        None => value,
    }
}

/// Owns the rate table and the converter state driven by user events.
///
/// The table is only ever replaced as a whole, by [`ConversionEngine::replace_rates`].
#[derive(Debug, Clone)]
pub struct ConversionEngine {
    rates: RateTable,
    pair: ConversionPair,
    amounts: AmountState,
    label: String,
    status: RateStatus,
}

impl ConversionEngine {
    pub fn new(pair: ConversionPair) -> Self {
        Self {
            rates: RateTable::default(),
            pair,
            amounts: AmountState::default(),
            label: String::new(),
            status: RateStatus::Loading,
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn pair(&self) -> &ConversionPair {
        &self.pair
    }

    pub fn amounts(&self) -> &AmountState {
        &self.amounts
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn status(&self) -> &RateStatus {
        &self.status
    }

    pub fn currencies(&self) -> Vec<&str> {
        self.rates.currencies()
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Conversion {
        // Overflowing input or output has no displayable amount either
        if amount == 0.0 || !amount.is_finite() {
            return Conversion::Blank;
        }
        match (self.rates.get(from), self.rates.get(to)) {
            (Some(from_rate), Some(to_rate)) => {
                let converted = round_amount(amount * to_rate / from_rate);
                if converted.is_finite() {
                    Conversion::Amount(converted)
                } else {
                    Conversion::Blank
                }
            }
            _ => Conversion::Unavailable,
        }
    }

    pub fn has_rates_for_pair(&self) -> bool {
        self.rates.contains(&self.pair.from) && self.rates.contains(&self.pair.to)
    }

    /// Recomputes the field opposite to `edited` from the edited one.
    pub fn synchronize(&mut self, edited: Side) {
        let source = parse_amount(self.amounts.get(edited));
        let from = self.pair.code(edited);
        let to = self.pair.code(edited.other());
        let result = match self.convert(source, from, to) {
            Conversion::Unavailable => Conversion::Blank,
            other => other,
        };
        debug!(?edited, %result, "Synchronized amounts");
        self.amounts.set(edited.other(), result.to_string());
    }

    pub fn refresh_comparison_label(&mut self) {
        if !self.has_rates_for_pair() {
            return;
        }
        let (from, to) = (&self.pair.from, &self.pair.to);
        let label = format!("1 {from} = {} {to}", self.convert(1.0, from, to));
        self.label = label;

        if self.amounts.first.is_empty() {
            self.amounts.first = "1".to_string();
        }
        self.synchronize(Side::First);
    }

    /// Exchanges the selected currencies and returns the side to focus.
    pub fn swap(&mut self) -> Side {
        self.pair.swap();
        debug!(from = %self.pair.from, to = %self.pair.to, "Swapped currencies");
        self.refresh_comparison_label();
        Side::First
    }

    /// Handles typing into a field. Returns the sanitized text.
    pub fn edit(&mut self, side: Side, raw: &str) -> &str {
        self.amounts.set(side, sanitize_amount(raw));
        self.synchronize(side);
        self.amounts.get(side)
    }

    pub fn select(&mut self, side: Side, code: impl Into<String>) {
        match side {
            Side::First => self.pair.from = code.into(),
            Side::Second => self.pair.to = code.into(),
        }
        self.refresh_comparison_label();
    }

    pub fn replace_rates(&mut self, rates: RateTable) {
        debug!(base = %rates.base(), count = rates.len(), "Replacing rate table");
        self.rates = rates;
        self.status = RateStatus::Ready;
        self.refresh_comparison_label();
    }

    pub fn record_fetch_failure(&mut self, error: &anyhow::Error) {
        warn!(error = %error, "Failed to load rates, keeping previous table");
        self.status = RateStatus::Failed(error.to_string());
        self.label = FETCH_ERROR_LABEL.to_string();
    }

    pub fn apply_fetch(&mut self, outcome: anyhow::Result<RateTable>) {
        match outcome {
            Ok(rates) => self.replace_rates(rates),
            Err(e) => self.record_fetch_failure(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;

    fn table(entries: &[(&str, f64)]) -> RateTable {
        RateTable::new(
            "USD",
            entries
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn engine_with(entries: &[(&str, f64)], from: &str, to: &str) -> ConversionEngine {
        let mut engine = ConversionEngine::new(ConversionPair::new(from, to));
        engine.replace_rates(table(entries));
        engine
    }

    const RATES: &[(&str, f64)] = &[("USD", 1.0), ("EUR", 0.912345678), ("RUB", 90.0)];

    #[test]
    fn test_convert_blank_for_zero_and_nan() {
        let engine = engine_with(RATES, "USD", "EUR");
        for (a, b) in [("USD", "EUR"), ("EUR", "RUB"), ("RUB", "RUB")] {
            assert_eq!(engine.convert(0.0, a, b), Conversion::Blank);
            assert_eq!(engine.convert(f64::NAN, a, b), Conversion::Blank);
        }
        assert_eq!(engine.convert(0.0, "USD", "EUR").to_string(), "");
    }

    #[test]
    fn test_convert_blank_for_non_finite_amounts() {
        let engine = engine_with(RATES, "USD", "RUB");
        assert!(engine.convert(f64::INFINITY, "USD", "RUB").is_blank());
        assert!(engine.convert(f64::MAX, "USD", "RUB").is_blank());
        assert_eq!(engine.convert(f64::MAX, "USD", "RUB").to_string(), "");
    }

    #[test]
    fn test_overlong_input_leaves_other_field_blank() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        engine.edit(Side::First, &"9".repeat(400));
        assert_eq!(engine.amounts().second, "");
    }

    #[test]
    fn test_convert_rounds_to_five_digits() {
        let engine = engine_with(&[("USD", 1.0), ("EUR", 0.912345678)], "USD", "EUR");
        assert_eq!(engine.convert(1.0, "USD", "EUR"), Conversion::Amount(0.91235));
        assert_eq!(engine.convert(1.0, "USD", "EUR").to_string(), "0.91235");
    }

    #[test]
    fn test_convert_identity() {
        let engine = engine_with(RATES, "USD", "EUR");
        for amount in [1.0, 10.0, 0.123456789, 12345.678901] {
            assert_eq!(
                engine.convert(amount, "EUR", "EUR"),
                Conversion::Amount(round_amount(amount))
            );
        }
    }

    #[test]
    fn test_convert_round_trip_within_tolerance() {
        let engine = engine_with(RATES, "USD", "EUR");
        for x in [0.5, 1.0, 17.25, 999.99, 123456.0] {
            for (a, b) in [("USD", "EUR"), ("EUR", "RUB"), ("RUB", "USD")] {
                let there = engine.convert(x, a, b).value().unwrap();
                let back = engine.convert(there, b, a).value().unwrap();
                // Rounding the intermediate value to 1e-5 is magnified by the
                // reverse rate.
                let tolerance = 1e-5 * (1.0 + engine.rates().get(a).unwrap()
                    / engine.rates().get(b).unwrap());
                assert!(
                    (back - x).abs() <= tolerance,
                    "{x} {a}->{b}->{a} gave {back}"
                );
            }
        }
    }

    #[test]
    fn test_convert_missing_rate_is_unavailable() {
        let engine = engine_with(RATES, "USD", "EUR");
        let result = engine.convert(5.0, "USD", "ZZZ");
        assert!(result.is_unavailable());
        assert_eq!(result.to_string(), "NaN");
        assert!(engine.convert(5.0, "ZZZ", "USD").is_unavailable());
    }

    #[test]
    fn test_round_amount_ties_away_from_zero() {
        // 1/64 = 0.015625 is exactly halfway between 0.01562 and 0.01563
        assert_eq!(round_amount(0.015625), 0.01563);
        assert_eq!(round_amount(-0.015625), -0.01563);
        assert_eq!(round_amount(2.0), 2.0);
        assert_eq!(round_amount(0.000001), 0.0);
        assert_eq!(round_amount(1e22), 1e22);
    }

    #[test]
    fn test_synchronize_first_updates_second() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        engine.edit(Side::First, "10");
        assert_eq!(engine.amounts().first, "10");
        assert_eq!(engine.amounts().second, "900");
    }

    #[test]
    fn test_synchronize_second_updates_first() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        engine.edit(Side::Second, "45");
        assert_eq!(engine.amounts().second, "45");
        assert_eq!(engine.amounts().first, "0.5");
    }

    #[test]
    fn test_edit_sanitizes_input() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        let sanitized = engine.edit(Side::First, "1.5.0x").to_string();
        assert_eq!(sanitized, "1.50");
        assert_eq!(engine.amounts().second, "135");
    }

    #[test]
    fn test_clearing_a_field_blanks_the_other() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        engine.edit(Side::First, "10");
        engine.edit(Side::First, "");
        assert_eq!(engine.amounts().first, "");
        assert_eq!(engine.amounts().second, "");
    }

    #[test]
    fn test_synchronize_without_rates_leaves_other_blank() {
        let mut engine = ConversionEngine::new(ConversionPair::new("USD", "RUB"));
        engine.edit(Side::First, "10");
        assert_eq!(engine.amounts().second, "");
        assert_eq!(engine.label(), "");
    }

    #[test]
    fn test_refresh_label_defaults_first_amount() {
        let engine = engine_with(RATES, "USD", "RUB");
        assert_eq!(engine.label(), "1 USD = 90 RUB");
        assert_eq!(engine.amounts().first, "1");
        assert_eq!(engine.amounts().second, "90");
    }

    #[test]
    fn test_refresh_label_guard_on_missing_rate() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        engine.select(Side::Second, "ZZZ");
        assert_eq!(engine.label(), "1 USD = 90 RUB");
        assert_eq!(engine.pair().to, "ZZZ");
    }

    #[test]
    fn test_select_recomputes_from_first() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        engine.edit(Side::First, "2");
        engine.select(Side::Second, "EUR");
        assert_eq!(engine.label(), "1 USD = 0.91235 EUR");
        assert_eq!(engine.amounts().second, "1.82469");
    }

    #[test]
    fn test_swap_scenario() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        engine.edit(Side::First, "10");
        assert_eq!(engine.amounts().second, "900");

        let focus = engine.swap();
        assert_eq!(focus, Side::First);
        assert_eq!(engine.pair(), &ConversionPair::new("RUB", "USD"));
        assert_eq!(engine.label(), "1 RUB = 0.01111 USD");
        assert_eq!(engine.amounts().first, "10");
        assert_eq!(engine.amounts().second, "0.11111");
    }

    #[test]
    fn test_same_currency_pair() {
        let mut engine = engine_with(RATES, "EUR", "EUR");
        engine.edit(Side::First, "3.25");
        assert_eq!(engine.label(), "1 EUR = 1 EUR");
        assert_eq!(engine.amounts().second, "3.25");
    }

    #[test]
    fn test_fetch_failure_keeps_table() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        let before = engine.rates().clone();

        engine.apply_fetch(Err(anyhow!("connection refused")));

        assert_eq!(engine.rates(), &before);
        assert_eq!(
            engine.status(),
            &RateStatus::Failed("connection refused".to_string())
        );
        assert_eq!(engine.label(), FETCH_ERROR_LABEL);
        // Conversions keep working on the stale table
        engine.edit(Side::First, "2");
        assert_eq!(engine.amounts().second, "180");
    }

    #[test]
    fn test_successful_fetch_after_failure_recovers() {
        let mut engine = ConversionEngine::new(ConversionPair::new("USD", "RUB"));
        assert_eq!(engine.status(), &RateStatus::Loading);

        engine.apply_fetch(Err(anyhow!("timeout")));
        assert!(engine.rates().is_empty());
        assert_eq!(engine.label(), FETCH_ERROR_LABEL);

        engine.apply_fetch(Ok(table(RATES)));
        assert_eq!(engine.status(), &RateStatus::Ready);
        assert_eq!(engine.label(), "1 USD = 90 RUB");
    }

    #[test]
    fn test_currencies_follow_the_table() {
        let mut engine = ConversionEngine::new(ConversionPair::new("USD", "RUB"));
        assert!(engine.currencies().is_empty());
        assert!(engine.convert(1.0, "USD", "RUB").is_unavailable());
        assert!(engine.convert(0.0, "USD", "RUB").is_blank());

        engine.replace_rates(table(RATES));
        assert_eq!(engine.currencies(), vec!["EUR", "RUB", "USD"]);
    }

    #[test]
    fn test_last_applied_fetch_wins() {
        let mut engine = engine_with(RATES, "USD", "RUB");
        engine.apply_fetch(Ok(table(&[("RUB", 95.0)])));
        engine.apply_fetch(Ok(table(&[("RUB", 92.5)])));
        assert_eq!(engine.rates().get("RUB"), Some(92.5));
        assert!(!engine.rates().contains("EUR"));
        assert_eq!(engine.label(), "1 USD = 92.5 RUB");
    }
}
