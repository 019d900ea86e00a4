//! `eth_getCode` client.
//!
//! Wraps any [`RpcTransport`] and implements [`CodeFetcher`], mapping
//! transport failures onto the scanner's `FetchError` taxonomy.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use codehash_core::{Address, BlockHeight, CodeFetcher, FetchError, ScanError};
use codehash_rpc::{RpcTransport, TransportError};

/// Lower-cased fragments of node error messages that mean "this node does
/// not keep state that far back".
const MISSING_HISTORY_MARKERS: &[&str] = &[
    "missing trie node",
    "header not found",
    "pruned",
    "pruning",
    "historical state",
    "archive",
    "state not available",
    "state is not available",
    "state histories",
];

/// EVM client for code lookups.
#[derive(Debug)]
pub struct EvmCodeClient<T> {
    transport: T,
    next_id: AtomicU64,
}

impl<T: RpcTransport> EvmCodeClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// `eth_chainId`.
    pub async fn chain_id(&self) -> Result<u64, TransportError> {
        let raw: String = self.transport.call(self.id(), "eth_chainId", vec![]).await?;
        parse_hex_u64(&raw)
            .ok_or_else(|| TransportError::InvalidResponse(format!("bad chain id '{raw}'")))
    }

    /// `eth_blockNumber`.
    pub async fn block_number(&self) -> Result<u64, TransportError> {
        let raw: String = self.transport.call(self.id(), "eth_blockNumber", vec![]).await?;
        parse_hex_u64(&raw)
            .ok_or_else(|| TransportError::InvalidResponse(format!("bad block number '{raw}'")))
    }

    /// Check that the endpoint answers before any sample is taken.
    ///
    /// Returns the chain id when the node exposes one. Fails with
    /// `RpcUnavailable` only if neither `eth_chainId` nor `eth_blockNumber`
    /// gets a JSON-RPC answer; an error object still counts as an answer.
    pub async fn probe(&self) -> Result<Option<u64>, ScanError> {
        let chain_err = match self.chain_id().await {
            Ok(id) => return Ok(Some(id)),
            Err(e) => e,
        };
        tracing::debug!(error = %chain_err, "eth_chainId failed, falling back to eth_blockNumber");
        match self.block_number().await {
            Ok(head) => {
                tracing::debug!(head, "endpoint reachable without chain id");
                Ok(None)
            }
            Err(TransportError::Rpc(e)) => {
                tracing::debug!(error = %e, "endpoint answered eth_blockNumber with an error");
                Ok(None)
            }
            Err(e) => Err(ScanError::RpcUnavailable(format!(
                "{}: {e}",
                self.transport.url()
            ))),
        }
    }

    /// `eth_getCode(address, block)`. Empty code is `Ok(vec![])`.
    pub async fn code_at(
        &self,
        address: &Address,
        block: BlockHeight,
    ) -> Result<Vec<u8>, FetchError> {
        let params = vec![
            Value::String(address.to_hex()),
            Value::String(format!("0x{block:x}")),
        ];
        let result: Value = self
            .transport
            .call(self.id(), "eth_getCode", params)
            .await
            .map_err(classify_error)?;

        match result {
            Value::Null => Err(FetchError::NotFound),
            Value::String(code) => decode_code(&code),
            other => Err(FetchError::Transient(format!(
                "unexpected eth_getCode result: {other}"
            ))),
        }
    }
}

#[async_trait]
impl<T: RpcTransport> CodeFetcher for EvmCodeClient<T> {
    async fn fetch_code(
        &self,
        address: &Address,
        block: BlockHeight,
    ) -> Result<Vec<u8>, FetchError> {
        self.code_at(address, block).await
    }
}

/// Map a transport failure to a per-sample fetch error.
pub fn classify_error(err: TransportError) -> FetchError {
    match &err {
        TransportError::Rpc(rpc) if is_missing_history(&rpc.message) => {
            FetchError::NoHistory(rpc.message.clone())
        }
        _ => FetchError::Transient(err.to_string()),
    }
}

fn is_missing_history(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    MISSING_HISTORY_MARKERS.iter().any(|m| lower.contains(m))
}

fn decode_code(raw: &str) -> Result<Vec<u8>, FetchError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|e| FetchError::Transient(format!("invalid bytecode hex: {e}")))
}

/// Parse a hex quantity (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}
