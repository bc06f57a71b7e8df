// =============================================================================
// Signals Module
// =============================================================================
//
// Everything downstream of the indicator calculator:
// - Crossover detection between two series
// - 0/1 trading flags (crosses, RSI thresholds, strong-trend heuristic)
// - Composition of the final output frame

pub mod compose;
pub mod cross;
pub mod flags;

pub use compose::compose;
pub use flags::generate_flags;
