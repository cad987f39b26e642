//! Streaming KISS decoder for the host byte stream.
//!
//! Consumes one byte at a time and emits complete messages. A frame only
//! opens when the byte immediately following FEND is CMD_DATA; any other
//! byte rejects the frame. The FEND that closes a frame is also treated as
//! the potential opener of the next one, so back-to-back frames may share
//! a single delimiter.

extern crate alloc;
use alloc::vec::Vec;

use crate::constants::MAX_MESSAGE_SIZE;
use crate::framing::kiss::{CMD_DATA, FEND, FESC, TFEND, TFESC};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for an opening FEND.
    Idle,
    /// Saw FEND; the next byte decides whether a data frame opens.
    PendingCommand,
    /// Inside a data frame, accumulating payload bytes.
    InFrame,
    /// Saw FESC inside a frame; the next byte resolves the escape.
    Escaped,
}

/// Stateful decoder that turns a raw host byte stream into discrete messages.
///
/// Overflow policy: if a frame would exceed the configured ceiling, the
/// in-progress frame is discarded and the decoder resets to idle. Nothing is
/// surfaced upstream; the only signal is the missing message.
#[derive(Debug)]
pub struct KissDecoder {
    state: DecodeState,
    buf: Vec<u8>,
    max_len: usize,
}

impl KissDecoder {
    /// Create a decoder with the default message ceiling (`MAX_MESSAGE_SIZE`).
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGE_SIZE)
    }

    /// Create a decoder that accepts messages up to `max_len` bytes.
    pub fn with_capacity(max_len: usize) -> Self {
        Self {
            state: DecodeState::Idle,
            buf: Vec::with_capacity(max_len),
            max_len,
        }
    }

    /// Process one input byte, returning a complete message if this byte
    /// closed a non-empty frame.
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8>> {
        match self.state {
            DecodeState::Idle => {
                if byte == FEND {
                    self.state = DecodeState::PendingCommand;
                }
                None
            }
            DecodeState::PendingCommand => {
                match byte {
                    CMD_DATA => {
                        self.buf.clear();
                        self.state = DecodeState::InFrame;
                    }
                    // Repeated delimiters between frames are idle noise; the
                    // latest FEND is still a potential opener.
                    FEND => {}
                    // Not a data frame; ignore everything up to the next FEND.
                    _ => self.state = DecodeState::Idle,
                }
                None
            }
            DecodeState::InFrame => match byte {
                FEND => {
                    // The closing delimiter may open the next frame.
                    self.state = DecodeState::PendingCommand;
                    if self.buf.is_empty() {
                        None
                    } else {
                        Some(core::mem::take(&mut self.buf))
                    }
                }
                FESC => {
                    self.state = DecodeState::Escaped;
                    None
                }
                _ => {
                    self.append(byte);
                    None
                }
            },
            DecodeState::Escaped => match byte {
                TFEND => {
                    self.append(FEND);
                    self.state = DecodeState::InFrame;
                    None
                }
                TFESC => {
                    self.append(FESC);
                    self.state = DecodeState::InFrame;
                    None
                }
                // Inherited quirk, preserved on purpose: an escape followed
                // by a non-transposed byte drops the escape and reprocesses
                // the byte under the in-frame rules. A literal FEND here
                // therefore closes the frame. Suspect, but it is what the
                // reference firmware does.
                _ => {
                    self.state = DecodeState::InFrame;
                    self.push(byte)
                }
            },
        }
    }

    /// Process a run of bytes, collecting every completed message.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut messages = Vec::new();
        for &byte in bytes {
            if let Some(msg) = self.push(byte) {
                messages.push(msg);
            }
        }
        messages
    }

    /// Whether the decoder is mid-frame (accumulating or escape-pending).
    pub fn in_frame(&self) -> bool {
        matches!(self.state, DecodeState::InFrame | DecodeState::Escaped)
    }

    /// Append a payload byte, enforcing the overflow policy.
    fn append(&mut self, byte: u8) {
        if self.buf.len() < self.max_len {
            self.buf.push(byte);
        } else {
            // Frame grew past the ceiling: drop it and start over.
            self.buf.clear();
            self.state = DecodeState::Idle;
        }
    }
}

impl Default for KissDecoder {
    fn default() -> Self {
        Self::new()
    }
}
