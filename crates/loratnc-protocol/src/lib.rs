//! Protocol state machines for the loratnc link layer.
//!
//! This crate implements message fragmentation and order-independent
//! reassembly as pure state machines: no I/O, no async. Functions take
//! explicit state and bytes and produce owned byte vectors, so the whole
//! protocol is unit-testable without hardware.

pub mod error;
pub mod fragment;
pub mod reassembly;

pub use error::FragmentError;
pub use fragment::fragment;
pub use reassembly::Reassembler;
