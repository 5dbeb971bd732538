//! # Broadcast Module
//!
//! The subscription primitive shared by the push-based services. A
//! [`Broadcaster`] decouples state mutation from state consumption: whichever
//! service owns it mutates its table, then hands the broadcaster a full
//! snapshot to fan out to every registered callback.

pub mod broadcaster;

pub use broadcaster::{Broadcaster, SubscriptionId};
