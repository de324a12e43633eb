//! State convergence for CLO entities
//!
//! Remote operations on the CLO API return as soon as a request is
//! accepted; the entity then moves through transitional states on its own.
//! This crate provides the polling machinery the provider uses to block
//! until an entity settles:
//!
//! - [`WaitSpec`] - pending/target labels, initial delay, poll spacing and
//!   overall timeout, with [`WaitSpec::wait`] as the polling loop
//! - [`StateSource`] - how one entity's current state is fetched
//! - [`UntilGone`] - treats not-found as the synthetic "deleted" label in
//!   delete flows
//! - [`retry_within`] - retries a whole wait until a shared budget is spent
//!
//! Waits are cancellable through a [`tokio_util::sync::CancellationToken`].

pub mod classify;
pub mod error;
pub mod retry;
pub mod source;
pub mod waiter;

pub use classify::{UntilGone, is_gone};
pub use error::{Result, WaitError};
pub use retry::{RetryConfig, retry_within};
pub use source::{EntityKind, EntityRef, Observed, StateSource};
pub use waiter::{DEFAULT_DELAY, DEFAULT_MIN_INTERVAL, WaitSpec};
