//! Core types, constants, and wire formats for the loratnc link layer.
//!
//! This crate defines the size ceilings, the 3-byte fragment header used on
//! the air, and the KISS framing used on the host byte stream. Everything
//! here is allocation-only (`no_std` + `alloc`) so the protocol core stays
//! usable from an embedded build.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod constants;
pub mod error;
pub mod framing;
pub mod packet;

pub use error::PacketError;
pub use framing::decoder::KissDecoder;
pub use packet::wire::FragmentHeader;
