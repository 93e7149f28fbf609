//! Order ledger, cancellation clock, and poll task for the storefront core.
//!
//! - [`order`] — the immutable placed-order record and its status enum.
//! - [`ledger`] — the persisted newest-first ledger with its write surface.
//! - [`clock`] — pure derived cancellation state (nothing stored, `now`
//!   always injected).
//! - [`watch`] — the stoppable once-per-second poll task.

pub mod clock;
pub mod ledger;
pub mod order;
pub mod watch;

pub use clock::{any_cancellable, cancel_state, is_cancellable, next_expiry, time_remaining, CancelState};
pub use ledger::{OrderLedger, OrderRefused, ORDERS_KEY, ORDER_SEQ_KEY};
pub use order::{Order, OrderStatus};
pub use watch::CancelWatch;
