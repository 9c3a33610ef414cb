use thiserror::Error;

/// Failures the core can surface. `AlreadyAttempted` is deliberately not
/// here: re-interacting with an attempted door is normal control flow and
/// is reported through `AttemptResult` instead.
#[derive(Debug, Error)]
pub enum GameError {
    /// Grid indexing outside the configured dimensions. Indicates a
    /// construction bug, not a recoverable runtime condition.
    #[error("room index ({row}, {col}) outside {rows}x{cols} maze")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// The question pool was empty when a question was requested.
    #[error("question pool exhausted")]
    PoolExhausted,

    /// The question source could not be read at startup.
    #[error("question source unavailable: {0}")]
    DataUnavailable(String),
}
