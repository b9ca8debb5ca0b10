#![allow(dead_code)]

use ppk_rs::{PpkError, Transport};
use std::cell::RefCell;
use std::rc::Rc;

/// Transport double that records every opcode + payload it is asked to
/// send. Clone handles share the same log, so tests can keep one handle
/// while the session owns the other.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    log: Rc<RefCell<Vec<(u8, Vec<u8>)>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(u8, Vec<u8>)> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, opcode: u8, payload: &[u8]) -> Result<(), PpkError> {
        self.log.borrow_mut().push((opcode, payload.to_vec()));
        Ok(())
    }
}

/// 4-byte average-channel payload carrying a current in microamps
pub fn average_frame(microamps: f32) -> [u8; 4] {
    microamps.to_le_bytes()
}

/// One 16-bit trigger word in wire (little-endian) order
pub fn trigger_word(range_code: u16, adc: u16) -> [u8; 2] {
    ((range_code << 14) | (adc & 0x3FFF)).to_le_bytes()
}

pub const HANDSHAKE: &str = "R1:10.0 R2:1.0 R3:0.1 Board ID PCA123 Refs HI: 1000 LO: 500 VDD: 3000";

pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
