//! Client-held cart and the totals derived from it.
//!
//! A [`Cart`] is a plain value: the checkout layer loads it from the device
//! cache, edits it, and hands it to the orchestrator. Totals are recomputed
//! from the current lines on every call and never stored.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::{Money, MoneyError};

/// Flat delivery fee charged on any non-empty cart.
pub const DEFAULT_DELIVERY_FEE: u32 = 99;

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is outside `[Quantity::MIN, Quantity::MAX]`.
    #[error("quantity must be between {min} and {max} (got {value})", min = Quantity::MIN, max = Quantity::MAX)]
    OutOfRange {
        /// The rejected value.
        value: i64,
    },
}

/// Per-line item count, always within `[1, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quantity(u8);

impl Quantity {
    /// Smallest quantity a line may hold.
    pub const MIN: u8 = 1;
    /// Largest quantity a line may hold.
    pub const MAX: u8 = 5;
    /// A single item.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::OutOfRange` if `value` is outside `[1, 5]`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(QuantityError::OutOfRange { value }),
        }
    }

    /// The underlying count.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Apply `delta`, saturating at [`Quantity::MAX`].
    ///
    /// Returns `None` when the result would drop below [`Quantity::MIN`].
    #[must_use]
    pub fn offset(self, delta: i32) -> Option<Self> {
        let next = i64::from(self.0) + i64::from(delta);
        if next < i64::from(Self::MIN) {
            return None;
        }
        Some(Self(u8::try_from(next.min(i64::from(Self::MAX))).unwrap_or(Self::MAX)))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u8 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl From<Quantity> for i32 {
    fn from(q: Quantity) -> Self {
        Self::from(q.0)
    }
}

/// One product entry in a cart.
///
/// Field names on the wire (`id`, `name`, `price`, `image`) match the payload
/// the order endpoint accepts, so a cached cart can be posted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product reference; unique within a cart.
    #[serde(rename = "id")]
    pub product_id: ProductId,
    /// Display name at the time the product was added.
    pub name: String,
    /// Unit price at the time the product was added.
    #[serde(rename = "price")]
    pub unit_price: Money,
    /// Image URL for display.
    #[serde(default)]
    pub image: String,
    /// Item count.
    pub quantity: Quantity,
}

impl CartLine {
    /// Create a line holding a single item.
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        image: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            image: image.into(),
            quantity: Quantity::ONE,
        }
    }

    /// Set the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    /// `unit_price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooLarge` if the line total exceeds [`Money::MAX`].
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.unit_price.checked_times(self.quantity.get())
    }
}

/// Subtotal, delivery fee and grand total of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

/// The pre-checkout collection of selected items.
///
/// Serialized as a plain array of lines. Deserializing goes through
/// [`Cart::from_lines`], so a payload repeating a product loads as one line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines, merging duplicate products.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add_line(line);
        }
        cart
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total item count across all lines (badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| u32::from(l.quantity.get())).sum()
    }

    /// Look up a line by product.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Add a product. An existing line for the same product has its quantity
    /// increased by the incoming quantity, saturating at [`Quantity::MAX`].
    pub fn add_line(&mut self, line: CartLine) {
        match self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => {
                let delta = i32::from(line.quantity);
                if let Some(q) = existing.quantity.offset(delta) {
                    existing.quantity = q;
                }
            }
            None => self.lines.push(line),
        }
    }

    /// Adjust a line's quantity by `delta`.
    ///
    /// The result is capped at [`Quantity::MAX`]. A delta that would take the
    /// quantity below [`Quantity::MIN`] is ignored; the line is never removed
    /// here (see [`Cart::remove_line`]).
    ///
    /// Returns the line's quantity after the call, or `None` if the product is
    /// not in the cart.
    pub fn mutate_line(&mut self, product_id: &ProductId, delta: i32) -> Option<Quantity> {
        let line = self.lines.iter_mut().find(|l| &l.product_id == product_id)?;
        if let Some(q) = line.quantity.offset(delta) {
            line.quantity = q;
        }
        Some(line.quantity)
    }

    /// Drop a line unconditionally, returning it if it was present.
    pub fn remove_line(&mut self, product_id: &ProductId) -> Option<CartLine> {
        let idx = self.lines.iter().position(|l| &l.product_id == product_id)?;
        Some(self.lines.remove(idx))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `unit_price * quantity` over all lines.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooLarge` if the sum exceeds [`Money::MAX`].
    pub fn subtotal(&self) -> Result<Money, MoneyError> {
        self.lines
            .iter()
            .try_fold(Money::ZERO, |acc, line| acc.checked_add(line.line_total()?))
    }

    /// Derive totals using a flat `delivery_fee`, charged only when the
    /// subtotal is above zero.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooLarge` if the subtotal or total exceeds
    /// [`Money::MAX`].
    pub fn totals(&self, delivery_fee: Money) -> Result<CartTotals, MoneyError> {
        let subtotal = self.subtotal()?;
        let delivery_fee = if subtotal.is_zero() {
            Money::ZERO
        } else {
            delivery_fee
        };
        Ok(CartTotals {
            subtotal,
            delivery_fee,
            total: subtotal.checked_add(delivery_fee)?,
        })
    }
}

impl FromIterator<CartLine> for Cart {
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        Self::from_lines(iter)
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, price: u32, qty: i64) -> CartLine {
        CartLine::new(id, format!("Product {id}"), Money::from_units(price), "")
            .with_quantity(Quantity::new(qty).unwrap())
    }

    fn fee() -> Money {
        Money::from_units(DEFAULT_DELIVERY_FEE)
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(Quantity::new(0).is_err());
        assert!(Quantity::new(6).is_err());
        assert!(Quantity::new(-1).is_err());
        assert_eq!(Quantity::new(5).unwrap().get(), 5);
    }

    #[test]
    fn test_quantity_offset() {
        let q = Quantity::new(3).unwrap();
        assert_eq!(q.offset(1).unwrap().get(), 4);
        assert_eq!(q.offset(10).unwrap().get(), 5);
        assert_eq!(q.offset(-2).unwrap().get(), 1);
        assert!(q.offset(-3).is_none());
    }

    #[test]
    fn test_totals_two_lines() {
        let cart = Cart::from_lines([line("P1", 500, 1), line("P2", 300, 3)]);
        let totals = cart.totals(fee()).unwrap();
        assert_eq!(totals.subtotal, Money::from_units(1400));
        assert_eq!(totals.delivery_fee, Money::from_units(99));
        assert_eq!(totals.total, Money::from_units(1499));
    }

    #[test]
    fn test_totals_empty_cart_has_no_fee() {
        let totals = Cart::new().totals(fee()).unwrap();
        assert_eq!(totals.subtotal, Money::ZERO);
        assert_eq!(totals.delivery_fee, Money::ZERO);
        assert_eq!(totals.total, Money::ZERO);
    }

    #[test]
    fn test_totals_free_items_have_no_fee() {
        let cart = Cart::from_lines([line("FREE", 0, 2)]);
        assert_eq!(cart.totals(fee()).unwrap().total, Money::ZERO);
    }

    #[test]
    fn test_totals_are_repeatable() {
        let cart = Cart::from_lines([line("P1", 1000, 2)]);
        assert_eq!(cart.totals(fee()), cart.totals(fee()));
        assert_eq!(cart.totals(fee()).unwrap().total, Money::from_units(2099));
    }

    #[test]
    fn test_totals_past_max_are_an_error() {
        let priciest = CartLine::new("P1", "Yacht", Money::MAX, "");
        assert!(Cart::from_lines([priciest.clone()]).totals(Money::ZERO).is_ok());

        // Line total overflows
        let cart = Cart::from_lines([priciest.clone().with_quantity(Quantity::new(2).unwrap())]);
        assert_eq!(cart.totals(fee()).unwrap_err(), MoneyError::TooLarge);

        // Subtotal overflows across lines
        let mut second = priciest.clone();
        second.product_id = ProductId::new("P2");
        let cart = Cart::from_lines([priciest.clone(), second]);
        assert_eq!(cart.totals(fee()).unwrap_err(), MoneyError::TooLarge);

        // Only the delivery fee pushes it over
        let cart = Cart::from_lines([priciest]);
        assert_eq!(cart.totals(fee()).unwrap_err(), MoneyError::TooLarge);
    }

    #[test]
    fn test_cached_payload_with_repeated_product_loads_as_one_line() {
        let json = r#"[
            {"id":"P1","name":"Phone","price":500,"image":"","quantity":2},
            {"id":"P2","name":"Case","price":100,"image":"","quantity":1},
            {"id":"P1","name":"Phone","price":500,"image":"","quantity":2}
        ]"#;
        let mut cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.line(&ProductId::new("P1")).unwrap().quantity.get(), 4);

        cart.remove_line(&ProductId::new("P1"));
        assert!(cart.line(&ProductId::new("P1")).is_none());
    }

    #[test]
    fn test_mutate_line_clamps_at_max() {
        let mut cart = Cart::from_lines([line("P1", 100, 4)]);
        let id = ProductId::new("P1");
        assert_eq!(cart.mutate_line(&id, 1).unwrap().get(), 5);
        assert_eq!(cart.mutate_line(&id, 1).unwrap().get(), 5);
    }

    #[test]
    fn test_mutate_line_rejects_below_min() {
        let mut cart = Cart::from_lines([line("P1", 100, 1)]);
        let id = ProductId::new("P1");
        assert_eq!(cart.mutate_line(&id, -1).unwrap().get(), 1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_mutate_line_unknown_product() {
        let mut cart = Cart::from_lines([line("P1", 100, 1)]);
        assert!(cart.mutate_line(&ProductId::new("nope"), 1).is_none());
    }

    #[test]
    fn test_mutate_line_never_leaves_range() {
        let id = ProductId::new("P1");
        for start in 1..=5 {
            for delta in -7..=7 {
                let mut cart = Cart::from_lines([line("P1", 10, start)]);
                let q = cart.mutate_line(&id, delta).unwrap().get();
                assert!((Quantity::MIN..=Quantity::MAX).contains(&q));
            }
        }
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::from_lines([line("P1", 100, 1), line("P2", 200, 1)]);
        let removed = cart.remove_line(&ProductId::new("P1")).unwrap();
        assert_eq!(removed.product_id.as_str(), "P1");
        assert_eq!(cart.len(), 1);
        assert!(cart.remove_line(&ProductId::new("P1")).is_none());
    }

    #[test]
    fn test_add_line_merges_duplicates() {
        let mut cart = Cart::new();
        cart.add_line(line("P1", 100, 2));
        cart.add_line(line("P1", 100, 2));
        cart.add_line(line("P1", 100, 2));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_cart_serializes_as_array() {
        let cart = Cart::from_lines([line("P1", 1000, 2)]);
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["id"], "P1");
        assert_eq!(json[0]["quantity"], 2);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_cart_rejects_out_of_range_quantity() {
        let json = r#"[{"id":"P1","name":"x","price":10,"image":"","quantity":9}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }
}
