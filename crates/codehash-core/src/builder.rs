//! Fluent builder for [`ScanConfig`].
//!
//! # Example
//!
//! ```rust
//! use codehash_core::{Address, ScanBuilder};
//!
//! let address: Address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap();
//! let config = ScanBuilder::new()
//!     .address(address)
//!     .from_block(17_000_000)
//!     .to_block(18_000_000)
//!     .step(10_000)
//!     .concurrency(4)
//!     .build_config();
//! assert_eq!(config.step, 10_000);
//! ```

use crate::address::Address;
use crate::scanner::ScanConfig;

/// Fluent builder for `ScanConfig`.
#[derive(Debug, Default)]
pub struct ScanBuilder {
    config: ScanConfig,
}

impl ScanBuilder {
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    /// Set the contract address to audit.
    pub fn address(mut self, address: Address) -> Self {
        self.config.address = address;
        self
    }

    /// Set the first height (inclusive).
    pub fn from_block(mut self, block: i64) -> Self {
        self.config.from_block = block;
        self
    }

    /// Set the last height (inclusive).
    pub fn to_block(mut self, block: i64) -> Self {
        self.config.to_block = block;
        self
    }

    /// Set the sampling stride.
    pub fn step(mut self, step: i64) -> Self {
        self.config.step = step;
        self
    }

    /// Set the number of lookups allowed in flight.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    /// Whether `to_block` is always probed even when off-stride.
    pub fn include_end(mut self, include: bool) -> Self {
        self.config.include_end = include;
        self
    }

    /// Log progress every `n` samples (0 disables).
    pub fn progress_every(mut self, n: u64) -> Self {
        self.config.progress_every = n;
        self
    }

    /// Build the `ScanConfig`.
    pub fn build_config(self) -> ScanConfig {
        self.config
    }
}
