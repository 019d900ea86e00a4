//! codehash-evm: EVM JSON-RPC backend for the codehash-timeline scanner.

pub mod client;

pub use client::{classify_error, parse_hex_u64, EvmCodeClient};
