use super::ui;
use crate::core::config::AppConfig;
use crate::core::engine::FETCH_ERROR_LABEL;
use crate::core::refresh::FetchOutcome;
use crate::core::{ConversionEngine, ConversionPair, RateProvider, RateStatus, Side};
use anyhow::{Result, bail};
use tracing::debug;

/// Fetches the rate table once, showing a spinner meanwhile.
pub async fn fetch_with_spinner(provider: &dyn RateProvider, base: &str) -> FetchOutcome {
    let pb = ui::new_spinner(&format!("Fetching {base} rates"));
    let outcome = provider.fetch_rates(base).await;
    pb.finish_and_clear();
    outcome
}

/// Builds an engine for `pair` from a single fetch outcome.
///
/// Unlike the live session, one-shot commands cannot wait for the next
/// refresh, so a failed fetch or an unknown currency is an error here.
pub fn engine_from_outcome(pair: ConversionPair, outcome: FetchOutcome) -> Result<ConversionEngine> {
    let mut engine = ConversionEngine::new(pair);
    engine.apply_fetch(outcome);

    if let RateStatus::Failed(reason) = engine.status() {
        bail!("{FETCH_ERROR_LABEL}: {reason}");
    }
    for side in [Side::First, Side::Second] {
        let code = engine.pair().code(side);
        if !engine.rates().contains(code) {
            bail!("Unknown currency: {code}");
        }
    }
    Ok(engine)
}

pub async fn run(
    provider: &dyn RateProvider,
    config: &AppConfig,
    amount: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let pair = ConversionPair::new(
        from.map_or_else(|| config.pair.from.clone(), super::normalize_code),
        to.map_or_else(|| config.pair.to.clone(), super::normalize_code),
    );
    debug!(?pair, %amount, "Converting");

    let outcome = fetch_with_spinner(provider, &config.base_currency).await;
    let mut engine = engine_from_outcome(pair, outcome)?;
    engine.edit(Side::First, amount);

    println!("{}", ui::render_converter(&engine, Side::First));
    Ok(())
}
