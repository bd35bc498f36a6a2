//! # Event subscribers for the poolvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Worker / Reconciler ── publish(Event) ──► Bus ──► Pool listener ──► SubscriberSet::emit
//!                                                                     ┌─────┼─────┐
//!                                                                     ▼     ▼     ▼
//!                                                              LogWriter  Metrics  Custom
//! ```

mod embedded;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
