//! codehash-rpc: JSON-RPC transport for the codehash-timeline scanner.
//!
//! - [`RpcTransport`]: the async trait every transport implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types
//! - [`TransportError`]: structured error type
//! - [`HttpRpcClient`]: `reqwest`-backed transport with bounded retry and a
//!   token-bucket rate limiter
//! - [`policy`] module: retry and rate limiting

pub mod error;
pub mod http;
pub mod policy;
pub mod request;
pub mod transport;

pub use error::TransportError;
pub use http::{HttpClientConfig, HttpRpcClient};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use transport::RpcTransport;
