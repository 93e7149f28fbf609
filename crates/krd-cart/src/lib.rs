//! In-memory shopping cart.
//!
//! # Design
//!
//! The cart is an ordered list of [`LineItem`]s with at most one entry per
//! item name. All mutating operations are keyed by the stable item name —
//! never by position, since positions shift under removal.
//!
//! # Invariants
//!
//! - `quantity >= 1` for every stored item. Decreasing a quantity-1 item
//!   removes it; a zero-quantity item is never stored.
//! - `unit_price >= 0`. A negative price is refused before any state change.
//! - Adding a name that is already present increments its quantity instead
//!   of duplicating the entry.
//!
//! All logic is pure deterministic — no IO, no clock, no randomness.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// All refusals the cart write surface can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// No item with this name is in the cart.
    UnknownItem { name: String },
    /// `unit_price` must be non-negative.
    NegativePrice { unit_price: i64 },
}

impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownItem { name } => {
                write!(f, "cart: no item named {name:?}")
            }
            Self::NegativePrice { unit_price } => {
                write!(f, "cart: unit_price must be >= 0, got {unit_price}")
            }
        }
    }
}

impl std::error::Error for CartError {}

// ---------------------------------------------------------------------------
// LineItem
// ---------------------------------------------------------------------------

/// One product entry in a cart or an order snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name — the unique key within a cart.
    pub name: String,
    /// Price per unit in whole currency units.
    pub unit_price: i64,
    /// Always >= 1 while the item is stored.
    pub quantity: u32,
}

impl LineItem {
    /// `unit_price × quantity`.
    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

/// Transient, ordered collection of items the user intends to purchase.
///
/// Owned by the active session; never persisted. Reset to empty after an
/// order is placed or on [`clear`][Cart::clear].
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Write surface
    // -----------------------------------------------------------------------

    /// Add one unit of `name` at `unit_price`.
    ///
    /// If the name is already in the cart its quantity is incremented and the
    /// stored unit price is kept; otherwise a new quantity-1 entry is
    /// appended.
    ///
    /// # Errors
    /// [`CartError::NegativePrice`] for a negative price. The cart is not
    /// mutated on error.
    pub fn add_item(&mut self, name: impl Into<String>, unit_price: i64) -> Result<(), CartError> {
        if unit_price < 0 {
            return Err(CartError::NegativePrice { unit_price });
        }
        let name = name.into();
        match self.position(&name) {
            Some(i) => self.items[i].quantity += 1,
            None => self.items.push(LineItem {
                name,
                unit_price,
                quantity: 1,
            }),
        }
        Ok(())
    }

    /// Remove the item named `name` entirely, returning it.
    ///
    /// # Errors
    /// [`CartError::UnknownItem`] if absent.
    pub fn remove_item(&mut self, name: &str) -> Result<LineItem, CartError> {
        let i = self.position(name).ok_or_else(|| CartError::UnknownItem {
            name: name.to_string(),
        })?;
        Ok(self.items.remove(i))
    }

    /// Increment the quantity of `name` by one; returns the new quantity.
    pub fn increase_quantity(&mut self, name: &str) -> Result<u32, CartError> {
        let i = self.position(name).ok_or_else(|| CartError::UnknownItem {
            name: name.to_string(),
        })?;
        self.items[i].quantity += 1;
        Ok(self.items[i].quantity)
    }

    /// Decrement the quantity of `name` by one.
    ///
    /// At quantity 1 the item is removed instead — `Ok(None)`. Otherwise the
    /// new quantity is returned. This is defined behavior: a stored quantity
    /// never reaches 0.
    pub fn decrease_quantity(&mut self, name: &str) -> Result<Option<u32>, CartError> {
        let i = self.position(name).ok_or_else(|| CartError::UnknownItem {
            name: name.to_string(),
        })?;
        if self.items[i].quantity > 1 {
            self.items[i].quantity -= 1;
            Ok(Some(self.items[i].quantity))
        } else {
            self.items.remove(i);
            Ok(None)
        }
    }

    /// Empty the cart unconditionally. Confirm-before-clear dialogs are a
    /// presentation concern, not enforced here.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    /// Σ `unit_price × quantity` over all items.
    pub fn subtotal(&self) -> i64 {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct items (not total quantity).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Deep copy of the current contents, for order placement. Later cart
    /// mutations never affect the returned snapshot.
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|it| it.name == name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn burger_fries() -> Cart {
        let mut c = Cart::new();
        c.add_item("Burger", 100).unwrap();
        c.add_item("Burger", 100).unwrap();
        c.add_item("Fries", 50).unwrap();
        c
    }

    // --- add / coalescing ---

    #[test]
    fn adding_same_name_twice_coalesces() {
        let c = burger_fries();
        assert_eq!(c.len(), 2);
        assert_eq!(
            c.items()[0],
            LineItem {
                name: "Burger".to_string(),
                unit_price: 100,
                quantity: 2
            }
        );
    }

    #[test]
    fn add_preserves_insertion_order() {
        let c = burger_fries();
        let names: Vec<_> = c.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Burger", "Fries"]);
    }

    #[test]
    fn rejects_negative_price() {
        let mut c = Cart::new();
        let err = c.add_item("Burger", -1);
        assert_eq!(err, Err(CartError::NegativePrice { unit_price: -1 }));
        assert!(c.is_empty()); // not mutated
    }

    #[test]
    fn zero_price_is_allowed() {
        let mut c = Cart::new();
        c.add_item("Water", 0).unwrap();
        assert_eq!(c.subtotal(), 0);
    }

    // --- subtotal ---

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let c = burger_fries();
        assert_eq!(c.subtotal(), 2 * 100 + 50);
    }

    #[test]
    fn empty_cart_subtotal_is_zero() {
        assert_eq!(Cart::new().subtotal(), 0);
    }

    // --- quantity controls ---

    #[test]
    fn increase_quantity_by_name() {
        let mut c = burger_fries();
        assert_eq!(c.increase_quantity("Fries").unwrap(), 2);
        assert_eq!(c.subtotal(), 300);
    }

    #[test]
    fn decrease_above_one_keeps_item() {
        let mut c = burger_fries();
        assert_eq!(c.decrease_quantity("Burger").unwrap(), Some(1));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn decrease_at_one_removes_item() {
        let mut c = burger_fries();
        assert_eq!(c.decrease_quantity("Fries").unwrap(), None);
        assert_eq!(c.len(), 1);
        assert!(c.items().iter().all(|i| i.name != "Fries"));
    }

    #[test]
    fn quantity_never_reaches_zero() {
        let mut c = Cart::new();
        c.add_item("Burger", 100).unwrap();
        c.increase_quantity("Burger").unwrap();
        c.decrease_quantity("Burger").unwrap();
        c.decrease_quantity("Burger").unwrap();
        // Item is gone, not stored at quantity 0.
        assert!(c.is_empty());
        let err = c.decrease_quantity("Burger");
        assert_eq!(
            err,
            Err(CartError::UnknownItem {
                name: "Burger".to_string()
            })
        );
    }

    // --- remove / clear ---

    #[test]
    fn remove_item_returns_it() {
        let mut c = burger_fries();
        let it = c.remove_item("Burger").unwrap();
        assert_eq!(it.quantity, 2);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn remove_unknown_item_refused() {
        let mut c = burger_fries();
        let err = c.remove_item("Halo-Halo");
        assert_eq!(
            err,
            Err(CartError::UnknownItem {
                name: "Halo-Halo".to_string()
            })
        );
        assert_eq!(c.len(), 2); // not mutated
    }

    #[test]
    fn clear_empties_unconditionally() {
        let mut c = burger_fries();
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.subtotal(), 0);
        // Clearing an already-empty cart is a no-op, not an error.
        c.clear();
        assert!(c.is_empty());
    }

    // --- snapshot ---

    #[test]
    fn snapshot_is_a_deep_copy() {
        let mut c = burger_fries();
        let snap = c.snapshot();
        c.increase_quantity("Burger").unwrap();
        c.remove_item("Fries").unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].quantity, 2, "snapshot must not track cart mutations");
    }
}
