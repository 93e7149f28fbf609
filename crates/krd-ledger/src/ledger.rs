//! Persisted order ledger.
//!
//! # Design
//!
//! [`OrderLedger`] owns the durable list of placed orders, newest first,
//! behind a minimal write surface (`place_order`, `cancel`,
//! `mark_delivered`). Every mutation persists synchronously before
//! returning, so a crash after a successful call leaves durable state
//! consistent with memory.
//!
//! # Invariants
//!
//! - Order ids come from a persisted monotonic counter — collision-free
//!   even across rapid successive placements and process restarts.
//! - `status` moves one way: `Active → Cancelled` (only inside the window)
//!   or `Active → Delivered`. Orders are never deleted.
//! - Corrupt persisted state degrades to an empty ledger with a warning;
//!   startup never fails on bad data.
//!
//! Refusals are typed ([`OrderRefused`]) and carried through
//! `anyhow::Error`; callers that need to distinguish "not found" from
//! "window expired" downcast.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use krd_cart::LineItem;
use krd_config::StorePolicy;
use krd_store::KvStore;
use tracing::{debug, warn};

use crate::clock;
use crate::order::{Order, OrderStatus};

/// Store key holding the JSON array of orders, newest first.
pub const ORDERS_KEY: &str = "orders";

/// Store key holding the next order id.
pub const ORDER_SEQ_KEY: &str = "order_seq";

// ---------------------------------------------------------------------------
// Refusals
// ---------------------------------------------------------------------------

/// Why a status transition was refused.
///
/// Callers show different messages for each variant, so they are kept
/// distinct rather than collapsed into one "failed" case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRefused {
    /// No order with this id exists in the ledger.
    NotFound { id: u64 },
    /// Cancellation refused: the window has elapsed, or the order is no
    /// longer Active (already cancelled or delivered).
    WindowExpired { id: u64 },
    /// Delivery refused: only Active orders can be delivered.
    NotActive { id: u64, status: OrderStatus },
}

impl std::fmt::Display for OrderRefused {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "ORDER_NOT_FOUND id={id}"),
            Self::WindowExpired { id } => {
                write!(f, "CANCEL_REFUSED id={id} reason=window_expired")
            }
            Self::NotActive { id, status } => {
                write!(f, "DELIVER_REFUSED id={id} status={status:?}")
            }
        }
    }
}

impl std::error::Error for OrderRefused {}

// ---------------------------------------------------------------------------
// OrderLedger
// ---------------------------------------------------------------------------

/// The durable, ordered collection of all placed orders.
///
/// Constructed once at startup via [`load`][OrderLedger::load]; owns its
/// store for the lifetime of the session. All time-dependent queries take
/// `now` explicitly — the ledger holds no clock.
pub struct OrderLedger<S: KvStore> {
    store: S,
    policy: StorePolicy,
    orders: Vec<Order>,
    next_id: u64,
}

impl<S: KvStore> OrderLedger<S> {
    // -----------------------------------------------------------------------
    // Startup
    // -----------------------------------------------------------------------

    /// Read persisted orders and the id counter from `store`.
    ///
    /// | Persisted state          | Result                                  |
    /// |--------------------------|-----------------------------------------|
    /// | both keys absent         | empty ledger, counter 1                 |
    /// | orders corrupt           | empty ledger (warn), counter 1          |
    /// | counter absent / corrupt | counter re-derived as `max(id) + 1`     |
    /// | counter behind `max(id)` | bumped to `max(id) + 1`                 |
    ///
    /// # Errors
    /// Only store IO errors propagate; malformed payloads never do.
    pub fn load(store: S, policy: StorePolicy) -> Result<Self> {
        let orders = match store.get(ORDERS_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Order>>(&raw) {
                Ok(orders) => orders,
                Err(err) => {
                    warn!(%err, "corrupt orders payload, resetting to empty ledger");
                    Vec::new()
                }
            },
        };

        let max_id = orders.iter().map(|o| o.id).max().unwrap_or(0);
        let next_id = match store.get(ORDER_SEQ_KEY)? {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) => n.max(max_id + 1),
                Err(err) => {
                    warn!(%err, "corrupt order counter, re-deriving from orders");
                    max_id + 1
                }
            },
            None => max_id + 1,
        };

        debug!(orders = orders.len(), next_id, "ledger loaded");
        Ok(Self {
            store,
            policy,
            orders,
            next_id,
        })
    }

    // -----------------------------------------------------------------------
    // Write surface
    // -----------------------------------------------------------------------

    /// Place an order from a cart snapshot.
    ///
    /// Computes the subtotal from `items`, applies the policy delivery fee,
    /// stamps `placed_at = now`, assigns the next counter id, inserts at
    /// the head of the ledger and persists before returning the created
    /// order. The snapshot is owned: later cart mutations cannot touch it.
    pub fn place_order(&mut self, items: Vec<LineItem>, now: DateTime<Utc>) -> Result<Order> {
        let subtotal: i64 = items.iter().map(LineItem::line_total).sum();
        let order = Order {
            id: self.next_id,
            placed_at: now,
            items,
            subtotal,
            delivery_fee: self.policy.delivery_fee,
            total: subtotal + self.policy.delivery_fee,
            status: OrderStatus::Active,
        };
        self.next_id += 1;
        self.orders.insert(0, order.clone());
        self.persist()?;
        debug!(id = order.id, total = order.total, "order placed");
        Ok(order)
    }

    /// Cancel order `id` at instant `now`.
    ///
    /// The only status mutation the storefront itself may trigger. Legal
    /// solely from the derived `CancellableActive` state.
    ///
    /// # Errors
    /// - [`OrderRefused::NotFound`] — no such id.
    /// - [`OrderRefused::WindowExpired`] — window elapsed, or status is no
    ///   longer Active. A second cancel of the same order lands here, never
    ///   in a double side effect.
    pub fn cancel(&mut self, id: u64, now: DateTime<Utc>) -> Result<()> {
        let window = self.policy.cancel_window();
        let i = self
            .index_of(id)
            .ok_or(OrderRefused::NotFound { id })?;
        match clock::cancel_state(&self.orders[i], now, window) {
            clock::CancelState::CancellableActive => {
                self.orders[i].status = OrderStatus::Cancelled;
                self.persist()?;
                debug!(id, "order cancelled");
                Ok(())
            }
            _ => Err(OrderRefused::WindowExpired { id }.into()),
        }
    }

    /// External fulfilment hook: mark an Active order Delivered.
    ///
    /// The delivery flow itself lives outside this core; this is the one
    /// entry point it is given.
    pub fn mark_delivered(&mut self, id: u64) -> Result<()> {
        let i = self
            .index_of(id)
            .ok_or(OrderRefused::NotFound { id })?;
        let status = self.orders[i].status;
        if status != OrderStatus::Active {
            return Err(OrderRefused::NotActive { id, status }.into());
        }
        self.orders[i].status = OrderStatus::Delivered;
        self.persist()?;
        debug!(id, "order delivered");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    /// All orders, newest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: u64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn policy(&self) -> &StorePolicy {
        &self.policy
    }

    /// Remaining cancellation time for order `id`, `None` if unknown.
    pub fn time_remaining(&self, id: u64, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.get(id)
            .map(|o| clock::time_remaining(o, now, self.policy.cancel_window()))
    }

    /// Whether `cancel(id, now)` would currently succeed.
    pub fn is_cancellable(&self, id: u64, now: DateTime<Utc>) -> bool {
        self.get(id)
            .map(|o| clock::is_cancellable(o, now, self.policy.cancel_window()))
            .unwrap_or(false)
    }

    /// Whether any order is still inside its cancellation window — the
    /// condition the poll task keeps running on.
    pub fn any_cancellable(&self, now: DateTime<Utc>) -> bool {
        clock::any_cancellable(&self.orders, now, self.policy.cancel_window())
    }

    /// Earliest upcoming cancellation deadline, for schedulers.
    pub fn next_expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        clock::next_expiry(&self.orders, now, self.policy.cancel_window())
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn index_of(&self, id: u64) -> Option<usize> {
        self.orders.iter().position(|o| o.id == id)
    }

    /// Write both keys synchronously. Called after every mutation.
    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.orders).context("serialize orders failed")?;
        self.store.put(ORDERS_KEY, &json)?;
        self.store.put(ORDER_SEQ_KEY, &self.next_id.to_string())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
