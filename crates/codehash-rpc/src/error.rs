//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur while talking to a JSON-RPC endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint URL is unusable (wrong scheme, unparsable).
    #[error("invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection refused, reset, DNS failure, non-2xx status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered 429.
    #[error("rate limited by {url}")]
    RateLimited { url: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// JSON-RPC error object returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// The body was not a JSON-RPC response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The `result` field could not be decoded into the expected type.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Returns `true` if the request may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::RateLimited { .. } | Self::Timeout { .. }
        )
    }

    /// The node-side error, if the request reached the node and failed there.
    pub fn rpc_error(&self) -> Option<&JsonRpcError> {
        match self {
            Self::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(TransportError::Http("connection refused".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 30_000 }.is_retryable());
        assert!(TransportError::RateLimited { url: "https://x".into() }.is_retryable());
        assert!(!TransportError::InvalidResponse("html".into()).is_retryable());
        let rpc = TransportError::Rpc(JsonRpcError {
            code: -32000,
            message: "missing trie node".into(),
            data: None,
        });
        assert!(!rpc.is_retryable());
        assert_eq!(rpc.rpc_error().map(|e| e.code), Some(-32000));
    }
}
