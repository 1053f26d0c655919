//! Typed errors for the simulation engine
//!
//! Nothing here is fatal: every variant reports a rejected operation and
//! the engine is left in its prior valid state.

use thiserror::Error;

use super::types::RunStatus;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration value failed validation; the active configuration
    /// is unchanged.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A lifecycle operation was called in a state that does not accept it.
    #[error("cannot {op} while {status}")]
    Lifecycle {
        op: &'static str,
        status: RunStatus,
    },

    /// A time step must be a positive, finite number of seconds.
    #[error("time step must be positive and finite, got {0}")]
    InvalidStep(f64),

    /// A query was made before the first tick produced any data.
    #[error("no data recorded yet")]
    NoData,
}

pub type EngineResult<T> = Result<T, EngineError>;
