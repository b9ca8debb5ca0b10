use crate::constants::AVERAGE_FRAME_LEN;
use crate::error::PpkError;
use crate::measurement::TelemetryWord;
use tracing::trace;
use zerocopy::FromBytes;
use zerocopy::byteorder::little_endian::F32;

/// A classified telemetry payload from the transport.
///
/// The wire carries two shapes: a 4-byte little-endian IEEE-754 float
/// holding one averaged current in microamps, or a packed run of 2-byte
/// little-endian telemetry words from the trigger window.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryFrame {
    /// One averaged-power sample, already converted to amperes
    Average { amps: f64 },
    /// Raw trigger-window words, not yet converted to current
    Trigger { words: Vec<TelemetryWord> },
}

impl TelemetryFrame {
    /// Classify and decode a received payload.
    ///
    /// A 4-byte payload that does not decode to a finite float means
    /// the framing has desynchronized; the session cannot safely
    /// continue past that. A trailing odd byte on a trigger payload is
    /// dropped silently.
    pub fn parse(payload: &[u8]) -> Result<Self, PpkError> {
        if payload.len() == AVERAGE_FRAME_LEN {
            let raw = F32::read_from_bytes(payload)
                .map_err(|_| PpkError::InvalidFrame("average payload is not 4 bytes".to_string()))?;
            let microamps = f64::from(raw.get());
            if !microamps.is_finite() {
                return Err(PpkError::InvalidFrame(format!(
                    "average payload decoded to non-finite value {microamps}"
                )));
            }
            Ok(TelemetryFrame::Average {
                amps: microamps / 1e6,
            })
        } else {
            if payload.len() % 2 != 0 {
                trace!(len = payload.len(), "dropping trailing byte of trigger payload");
            }
            let words = payload
                .chunks_exact(2)
                .map(|pair| TelemetryWord::from_bytes([pair[0], pair[1]]))
                .collect();
            Ok(TelemetryFrame::Trigger { words })
        }
    }
}
