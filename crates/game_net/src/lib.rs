//! # game_net
//!
//! Wire layer for the game server.
//!
//! This crate provides:
//!
//! - [`messages`] — Inbound client messages and the outbound per-tick delta.
//! - [`codec`] — MessagePack serialisation/deserialisation helpers.
//! - [`channel`] — The ordered, full-duplex per-client message channel.
//! - [`error`] — Network-layer error types.

pub mod channel;
pub mod codec;
pub mod error;
pub mod messages;

pub use channel::MessageChannel;
pub use codec::{decode, encode};
pub use error::NetError;
