// =============================================================================
// Indicator Engine - end-to-end batch computation for one ticker
// =============================================================================
//
//   RawFrame -> normalise -> indicators -> crosses/flags -> SignalFrame
//
// Stateless and synchronous: the same input always yields the same output,
// and separate tickers can be processed concurrently by separate calls.
// =============================================================================

use tracing::debug;

use crate::error::EngineError;
use crate::indicators::compute_indicators;
use crate::market_data::normalize;
use crate::signals::{compose, generate_flags};
use crate::types::{RawFrame, SignalFrame};

/// Run the full indicator and flag pipeline over one ticker's series.
///
/// Fails only on schema problems; no partial output is produced in that case.
pub fn run_engine(frame: &RawFrame) -> Result<SignalFrame, EngineError> {
    let series = normalize(frame)?;
    let indicators = compute_indicators(&series);
    let flags = generate_flags(&series, &indicators);
    let output = compose(&series, &indicators, &flags);

    debug!(
        ticker = series.ticker.as_deref().unwrap_or("-"),
        rows = output.len(),
        "indicator engine run complete"
    );

    Ok(output)
}
