//! # Engine Error Kinds
//!
//! Fatal conditions bubble up to the main loop through [`SimError`] and
//! terminate the run; the process exit code is nonzero for any of them.
//! Link-list capacity exhaustion is deliberately not represented here: bonds
//! beyond capacity are silently not created.

use thiserror::Error;

/// Errors that terminate a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// A bounded structure overflowed its compile-time capacity. Operators
    /// may recover by raising the capacity constants and restarting.
    #[error("{what} capacity exceeded (limit {limit})")]
    Capacity {
        /// The structure that overflowed.
        what: &'static str,
        /// Its capacity bound.
        limit: usize,
    },

    /// A configured numeric parameter is outside its valid domain.
    #[error("bad parameter: {0}")]
    BadParameter(String),

    /// A selector names a law or integrator this build does not implement.
    #[error("unsupported law: {0}")]
    UnsupportedLaw(&'static str),

    /// An unknown message number was encountered on the wire.
    #[error("unsupported message number {0}")]
    UnsupportedMessage(u8),

    /// A malformed message header was encountered on the wire.
    #[error("malformed message header")]
    MalformedHeader,

    /// A termination signal was latched; surfaced at the next step boundary.
    #[error("interrupted")]
    Interrupted,

    /// The snapshot sink failed.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot payload serialization failed.
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] bincode::Error),
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, SimError>;
