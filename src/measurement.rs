use crate::constants::{ADC_GAIN, ADC_MAX, ADC_REF};
use modular_bitfield::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// One 16-bit trigger-channel telemetry word.
///
/// Bits [13:0] carry the raw ADC count, bits [15:14] the measurement
/// range the sample was taken under. The bitfield masks the ADC count
/// to 14 bits structurally.
#[bitfield(bytes = 2)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryWord {
    pub adc: B14,
    pub range_code: B2,
}

impl TelemetryWord {
    /// Measurement range this word was sampled under
    pub fn range(&self) -> MeasurementRange {
        MeasurementRange::from_code(self.range_code())
    }
}

/// Current-measurement sensitivity band, as reported in the two high
/// bits of a telemetry word. Values match the firmware constants;
/// `Invalid` is part of the firmware set even though two wire bits can
/// only encode the first four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum MeasurementRange {
    #[strum(to_string = "none")]
    None = 0,
    #[strum(to_string = "low")]
    Low = 1,
    #[strum(to_string = "mid")]
    Mid = 2,
    #[strum(to_string = "high")]
    High = 3,
    #[strum(to_string = "invalid")]
    Invalid = 4,
}

impl MeasurementRange {
    /// Map a 2-bit wire code to a range tag
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => MeasurementRange::None,
            1 => MeasurementRange::Low,
            2 => MeasurementRange::Mid,
            3 => MeasurementRange::High,
            _ => MeasurementRange::Invalid,
        }
    }
}

/// Per-range calibration resistances in ohms, reported by the device
/// at connection time and optionally overridden by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResistors {
    pub lo: f64,
    pub mid: f64,
    pub hi: f64,
}

impl CalibrationResistors {
    pub fn new(lo: f64, mid: f64, hi: f64) -> Self {
        Self { lo, mid, hi }
    }

    /// Resistance for a measurable range; None/Invalid have no resistor
    pub fn for_range(&self, range: MeasurementRange) -> Option<f64> {
        match range {
            MeasurementRange::Low => Some(self.lo),
            MeasurementRange::Mid => Some(self.mid),
            MeasurementRange::High => Some(self.hi),
            MeasurementRange::None | MeasurementRange::Invalid => None,
        }
    }
}

/// One decoded trigger-channel sample: physical current plus the range
/// it was derived under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerSample {
    pub amps: f64,
    pub range: MeasurementRange,
}

/// Convert a telemetry word to a physical current.
///
/// Returns `None` for words tagged None/Invalid, which carry no usable
/// current; the caller decides what to put in that buffer slot.
///
/// Only the Low range subtracts the calibration offset. Offset
/// calibration is measured at low currents, so the other ranges are
/// left untouched; this asymmetry matches the device firmware.
pub fn convert(word: TelemetryWord, resistors: &CalibrationResistors, offset: f64) -> Option<TriggerSample> {
    let range = word.range();
    let r = resistors.for_range(range)?;
    let mut amps = f64::from(word.adc()) * (ADC_REF / (ADC_GAIN * ADC_MAX * r));
    if range == MeasurementRange::Low {
        amps -= offset;
    }
    Some(TriggerSample { amps, range })
}
