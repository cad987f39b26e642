//! On-air fragment packet wire format.

pub mod wire;
