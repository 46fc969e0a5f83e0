//! On-device key-value storage for the cart.
//!
//! The cart is the only thing stored here, under [`CART_CACHE_KEY`], as a
//! JSON array of cart lines. Implementations must survive restarts
//! ([`FileCartCache`]) or may be purely in-process ([`MemoryCartCache`], for
//! tests and ephemeral sessions). Neither is atomic across process crashes
//! beyond what a single file rename gives.

mod file;
mod memory;

pub use file::FileCartCache;
pub use memory::MemoryCartCache;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Key under which the serialized cart is stored.
pub const CART_CACHE_KEY: &str = "cart";

/// Errors from a cart cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the backing storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be mapped onto the backing storage.
    #[error("invalid cache key: {0}")]
    InvalidKey(String),
}

/// String-valued key-value storage that outlives a page load.
#[async_trait]
pub trait CartCache: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Delete a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

#[async_trait]
impl<T: CartCache + ?Sized> CartCache for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        (**self).remove(key).await
    }
}
