//! Cancellation clock — the derived per-order state machine.
//!
//! # Design
//!
//! Nothing here is stored. Each order's cancellation state is recomputed
//! from its persisted `status` plus wall-clock time elapsed since
//! `placed_at`:
//!
//! ```text
//!                      elapsed >= window (no event)
//!   CancellableActive ────────────────────────────► ExpiredActive
//!          │
//!          │ cancel()                    Cancelled / Delivered map
//!          ▼                             directly from stored status.
//!      Cancelled (term.)
//! ```
//!
//! `CancellableActive → ExpiredActive` fires purely from elapsed time —
//! there is no explicit event; it is evaluated lazily on every query. The
//! `cancel()` transition itself lives in [`ledger`](crate::ledger); this
//! module only answers questions.
//!
//! All functions are pure in `now`, so any scheduling strategy (push timer,
//! pull-on-render) can drive them, and tests inject fixed clocks.

use chrono::{DateTime, Duration, Utc};

use crate::order::{Order, OrderStatus};

/// Derived cancellation state of a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelState {
    /// Active and still inside the window — `cancel()` is legal.
    CancellableActive,
    /// Active but the window has elapsed — only delivery can follow.
    ExpiredActive,
    Cancelled,
    Delivered,
}

/// Classify `order` at instant `now` under the given window.
pub fn cancel_state(order: &Order, now: DateTime<Utc>, window: Duration) -> CancelState {
    match order.status {
        OrderStatus::Cancelled => CancelState::Cancelled,
        OrderStatus::Delivered => CancelState::Delivered,
        OrderStatus::Active => {
            // Boundary: elapsed == window is already expired.
            if now - order.placed_at < window {
                CancelState::CancellableActive
            } else {
                CancelState::ExpiredActive
            }
        }
    }
}

/// `max(0, window − (now − placed_at))` — how long cancellation stays open.
///
/// Pure function of `placed_at`; callers that care about `status` should
/// pair this with [`is_cancellable`].
pub fn time_remaining(order: &Order, now: DateTime<Utc>, window: Duration) -> Duration {
    let remaining = window - (now - order.placed_at);
    remaining.max(Duration::zero())
}

/// `true` iff `cancel()` would be legal at `now`.
pub fn is_cancellable(order: &Order, now: DateTime<Utc>, window: Duration) -> bool {
    cancel_state(order, now, window) == CancelState::CancellableActive
}

/// `true` while at least one order is still cancellable — the condition
/// under which periodic re-rendering is worth running at all.
pub fn any_cancellable(orders: &[Order], now: DateTime<Utc>, window: Duration) -> bool {
    orders.iter().any(|o| is_cancellable(o, now, window))
}

/// Earliest instant at which a currently-cancellable order expires.
///
/// `None` when nothing is cancellable — the signal for a scheduler to stop
/// waking up.
pub fn next_expiry(orders: &[Order], now: DateTime<Utc>, window: Duration) -> Option<DateTime<Utc>> {
    orders
        .iter()
        .filter(|o| is_cancellable(o, now, window))
        .map(|o| o.placed_at + window)
        .min()
}
