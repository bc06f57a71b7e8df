use thiserror::Error;

/// Schema failures raised by the indicator engine.
///
/// Numeric problems (unparsable values, zero denominators, short history) are
/// not errors; they degrade to `NaN` indicators and `0` flags.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("required column `{column}` is missing")]
    MissingColumn { column: &'static str },

    #[error("column `{column}` has {found} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },
}
