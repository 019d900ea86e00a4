//! codehash-core: sampling and comparison engine for contract code-hash audits.
//!
//! # Architecture
//!
//! ```text
//! ScanBuilder → Scanner
//!                  ├── Sampler          (block heights to probe)
//!                  ├── CodeFetcher      (eth_getCode, supplied by the caller)
//!                  ├── fingerprint()    (keccak256 / no-code / unknown)
//!                  └── TimelineBuilder  (segment fold, change detection)
//!                          ↓
//!                      ScanResult → reporter
//! ```
//!
//! The crate never formats reports or decides exit codes. Everything a
//! reporter needs is on [`ScanResult`].

pub mod address;
pub mod builder;
pub mod error;
pub mod fetcher;
pub mod fingerprint;
pub mod sampler;
pub mod scanner;
pub mod timeline;
pub mod types;

pub use address::Address;
pub use builder::ScanBuilder;
pub use error::{FetchError, ScanError};
pub use fetcher::CodeFetcher;
pub use fingerprint::{fingerprint, keccak256, CodeFingerprint};
pub use sampler::{generate, Heights, Sampler};
pub use scanner::{ScanConfig, Scanner};
pub use timeline::{TimelineBuilder, TimelineState};
pub use types::{BlockHeight, Sample, ScanResult, Segment};
