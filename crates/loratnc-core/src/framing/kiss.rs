//! KISS byte-stuffing, encode direction.
//!
//! Frame format on the host stream: FEND + CMD_DATA(0x00) + escaped(data) + FEND.
//! The decode direction is handled byte-at-a-time by
//! [`KissDecoder`](crate::framing::decoder::KissDecoder).

extern crate alloc;
use alloc::vec::Vec;

/// Frame delimiter. Both terminates a frame and may open the next one.
pub const FEND: u8 = 0xC0;
/// Escape marker for FEND/FESC occurring inside payload data.
pub const FESC: u8 = 0xDB;
/// Transposed FEND, sent as FESC + TFEND.
pub const TFEND: u8 = 0xDC;
/// Transposed FESC, sent as FESC + TFESC.
pub const TFESC: u8 = 0xDD;
/// Command byte that must immediately follow an opening FEND for the frame
/// to be recognized as a data frame.
pub const CMD_DATA: u8 = 0x00;

/// Escape reserved marker bytes using KISS byte-stuffing.
///
/// FEND becomes FESC + TFEND, FESC becomes FESC + TFESC; everything else
/// passes through unchanged.
pub fn escape(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            FEND => {
                out.push(FESC);
                out.push(TFEND);
            }
            FESC => {
                out.push(FESC);
                out.push(TFESC);
            }
            _ => out.push(byte),
        }
    }
    out
}

/// Wrap a message in a complete KISS data frame.
///
/// Output is bounded by `2 * data.len() + 3` bytes and never fails.
pub fn frame(data: &[u8]) -> Vec<u8> {
    let escaped = escape(data);
    let mut framed = Vec::with_capacity(escaped.len() + 3);
    framed.push(FEND);
    framed.push(CMD_DATA);
    framed.extend_from_slice(&escaped);
    framed.push(FEND);
    framed
}
