//! Cart persistence on top of a [`CartCache`].
//!
//! Every edit loads the cart, applies the change and writes it back, so the
//! cache stays the single source of truth between page loads.

use quickcart_core::{Cart, CartLine, ProductId, Quantity};
use tracing::{instrument, warn};

use crate::cache::{CART_CACHE_KEY, CacheError, CartCache};

/// Loads, edits and saves the cart held in a [`CartCache`].
#[derive(Debug, Clone)]
pub struct CartStore<C> {
    cache: C,
}

impl<C: CartCache> CartStore<C> {
    pub const fn new(cache: C) -> Self {
        Self { cache }
    }

    /// The underlying cache.
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// Load the cart. A missing entry is an empty cart; so is a payload that
    /// no longer parses, which is logged and left for the next save to
    /// overwrite.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be read.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Cart, CacheError> {
        let Some(payload) = self.cache.get(CART_CACHE_KEY).await? else {
            return Ok(Cart::new());
        };

        match serde_json::from_str::<Cart>(&payload) {
            Ok(cart) => Ok(cart),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cart cache entry");
                Ok(Cart::new())
            }
        }
    }

    /// Persist the cart. An empty cart removes the entry.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be written.
    #[instrument(skip(self, cart), fields(lines = cart.len()))]
    pub async fn save(&self, cart: &Cart) -> Result<(), CacheError> {
        if cart.is_empty() {
            return self.cache.remove(CART_CACHE_KEY).await;
        }
        let payload = serde_json::to_string(cart).map_err(std::io::Error::other)?;
        self.cache.set(CART_CACHE_KEY, &payload).await
    }

    /// Add a product, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be read or written.
    pub async fn add(&self, line: CartLine) -> Result<Cart, CacheError> {
        let mut cart = self.load().await?;
        cart.add_line(line);
        self.save(&cart).await?;
        Ok(cart)
    }

    /// Change a line's quantity by `delta` (see [`Cart::mutate_line`]).
    ///
    /// Returns the updated cart and the line's quantity, or `None` when the
    /// product is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be read or written.
    pub async fn change_quantity(
        &self,
        product_id: &ProductId,
        delta: i32,
    ) -> Result<(Cart, Option<Quantity>), CacheError> {
        let mut cart = self.load().await?;
        let quantity = cart.mutate_line(product_id, delta);
        if quantity.is_some() {
            self.save(&cart).await?;
        }
        Ok((cart, quantity))
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be read or written.
    pub async fn remove(&self, product_id: &ProductId) -> Result<Cart, CacheError> {
        let mut cart = self.load().await?;
        if cart.remove_line(product_id).is_some() {
            self.save(&cart).await?;
        }
        Ok(cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be written.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.cache.remove(CART_CACHE_KEY).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use quickcart_core::Money;

    use super::*;
    use crate::cache::MemoryCartCache;

    fn phone() -> CartLine {
        CartLine::new("P1", "iPhone 13 Pro Max", Money::from_units(119_900), "img/p1.jpg")
    }

    #[tokio::test]
    async fn test_missing_entry_is_empty_cart() {
        let store = CartStore::new(MemoryCartCache::new());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_empty_cart() {
        let cache = Arc::new(MemoryCartCache::new());
        cache.set(CART_CACHE_KEY, "{not json").await.unwrap();

        let store = CartStore::new(Arc::clone(&cache));
        assert!(store.load().await.unwrap().is_empty());
        // Left in place until the next save
        assert_eq!(cache.peek(CART_CACHE_KEY).as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_repeated_product_in_cache_loads_as_one_line() {
        let cache = Arc::new(MemoryCartCache::new());
        let line = r#"{"id":"P1","name":"Phone","price":500,"image":"","quantity":2}"#;
        cache
            .set(CART_CACHE_KEY, &format!("[{line},{line}]"))
            .await
            .unwrap();

        let store = CartStore::new(Arc::clone(&cache));
        let cart = store.load().await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 4);

        let cart = store.remove(&ProductId::new("P1")).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_price_in_cache_is_empty_cart() {
        let cache = Arc::new(MemoryCartCache::new());
        cache
            .set(
                CART_CACHE_KEY,
                r#"[{"id":"P1","name":"x","price":"79228162514264337593543950335","quantity":2}]"#,
            )
            .await
            .unwrap();

        let store = CartStore::new(cache);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edits_are_persisted() {
        let cache = Arc::new(MemoryCartCache::new());
        let store = CartStore::new(Arc::clone(&cache));

        store.add(phone()).await.unwrap();
        let (cart, qty) = store.change_quantity(&ProductId::new("P1"), 2).await.unwrap();
        assert_eq!(qty.unwrap().get(), 3);
        assert_eq!(cart.item_count(), 3);

        // A fresh store over the same cache sees the edit
        let reloaded = CartStore::new(Arc::clone(&cache)).load().await.unwrap();
        assert_eq!(reloaded, cart);
    }

    #[tokio::test]
    async fn test_decrement_below_one_keeps_line() {
        let store = CartStore::new(MemoryCartCache::new());
        store.add(phone()).await.unwrap();

        let (cart, qty) = store.change_quantity(&ProductId::new("P1"), -1).await.unwrap();
        assert_eq!(qty.unwrap().get(), 1);
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_removing_last_line_clears_entry() {
        let cache = Arc::new(MemoryCartCache::new());
        let store = CartStore::new(Arc::clone(&cache));

        store.add(phone()).await.unwrap();
        assert!(cache.peek(CART_CACHE_KEY).is_some());

        let cart = store.remove(&ProductId::new("P1")).await.unwrap();
        assert!(cart.is_empty());
        assert!(cache.peek(CART_CACHE_KEY).is_none());
    }
}
