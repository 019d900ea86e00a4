//! The code-lookup seam between the scanner and an RPC backend.

use std::sync::Arc;

use async_trait::async_trait;

use crate::address::Address;
use crate::error::FetchError;
use crate::types::BlockHeight;

/// Retrieves the runtime bytecode of an account at a given height.
///
/// An account without code should return `Ok(vec![])` (or
/// `Err(FetchError::NotFound)`); both become `NoCode`. Implementations own
/// their timeouts and retries: a call must eventually return.
#[async_trait]
pub trait CodeFetcher: Send + Sync {
    async fn fetch_code(
        &self,
        address: &Address,
        block: BlockHeight,
    ) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl<T: CodeFetcher + ?Sized> CodeFetcher for Arc<T> {
    async fn fetch_code(
        &self,
        address: &Address,
        block: BlockHeight,
    ) -> Result<Vec<u8>, FetchError> {
        (**self).fetch_code(address, block).await
    }
}
