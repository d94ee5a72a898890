//! The `connection` module is the resilient publishing pipeline.
//!
//! - `state`: the two-state connectivity enum.
//! - `buffer`: the unbounded FIFO of readings produced while offline.
//! - `session`: connectivity, link handle and buffer behind one lock.
//! - `publisher`: `Publisher::safe_publish`, the only way loops emit readings.
//! - `manager`: `ConnectionManager`, which connects, reacts to disconnects
//!   and retries on a fixed period.
//!
//! Locking discipline: every decision to send or buffer, every state change
//! and every flush happens while holding the session mutex. Hand-off to the
//! transport is a non-blocking channel push, so the mutex is never held
//! across an `.await`.

pub mod buffer;
pub mod manager;
pub mod publisher;
pub mod session;
pub mod state;

pub use buffer::{BufferedMessage, OfflineBuffer};
pub use manager::ConnectionManager;
pub use publisher::Publisher;
pub use state::ConnectivityState;
