//! Error types for the scan pipeline.

use thiserror::Error;

use crate::types::BlockHeight;

/// Errors that stop a scan (or prevent it from starting).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("invalid range: {reason}")]
    InvalidRange { reason: String },

    #[error("invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("RPC endpoint unavailable: {0}")]
    RpcUnavailable(String),

    #[error("sample at block {block} does not follow block {last}")]
    OutOfOrder { block: BlockHeight, last: BlockHeight },

    #[error("timeline already completed")]
    AlreadyCompleted,
}

impl ScanError {
    pub(crate) fn range(reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error was caused by user input rather than the
    /// network or an internal fault.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. } | Self::InvalidAddress { .. } | Self::InvalidConfig(_)
        )
    }
}

/// Outcome of a single failed code lookup.
///
/// Per-sample failures never abort a scan. `NoHistory` and `Transient` turn
/// the sample into [`CodeFingerprint::Unknown`](crate::CodeFingerprint::Unknown);
/// `NotFound` is treated as an empty account.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The node has no archive state for the requested height.
    #[error("historical state unavailable: {0}")]
    NoHistory(String),

    /// Network error, timeout, rate limit or malformed response.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The address holds no code at this height.
    #[error("no code at address")]
    NotFound,
}

impl FetchError {
    /// Returns `true` if this failure leaves the sample's code unknown.
    pub fn is_lookup_failure(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}
