//! Host-stream framing: KISS byte-stuffing and the streaming decoder.

pub mod decoder;
pub mod kiss;
