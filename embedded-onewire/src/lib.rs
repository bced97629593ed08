#![no_std]
#![deny(missing_docs)]
//! # embedded-onewire
//! A no-std implementation of the 1-Wire protocol.
//!
//! This crate provides a trait-based interface for 1-Wire communication, allowing you to implement the protocol on various platforms.
//! [OneWire] trait defines the primitive operations a bus master has to offer: resetting the bus, writing bits, bytes and
//! 4-byte words, and reading bit pairs, bytes and 4-byte words.
//!
//! On top of it the crate provides the ROM search algorithm for discovering every device on the bus ([OneWireSearch]),
//! the 1-Wire CRC-8 ([OneWireCrc]), the 64-bit [Rom] address and a small [retry] combinator shared by
//! the layers that need bounded retries.

extern crate alloc;

pub mod consts;
mod error;
pub mod retry;
mod rom;
mod search;
mod traits;
mod utils;
pub use consts::*;
pub use error::OneWireError;
pub use rom::{InvalidAddress, Rom};
pub use search::{BitPair, OneWireSearch, OneWireSearchKind};
pub use traits::OneWire;
pub use utils::OneWireCrc;

/// Error type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
