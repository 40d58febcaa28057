//! line-echo core: the webhook event model and the dispatcher that turns
//! message events into text replies.
//!
//! Parsing and the outbound HTTP call live in `line-echo-client`; this crate
//! only sees decoded [`Event`]s and talks to the platform through the
//! [`ReplySender`] trait.
pub mod dispatch;
pub mod event;
pub mod reply;
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use dispatch::*;
pub use event::*;
pub use reply::*;
