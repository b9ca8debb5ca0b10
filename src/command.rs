use crate::constants::{VDD_RAMP_STEP_MV, VDD_RAMP_THRESHOLD_MV};
use crate::measurement::CalibrationResistors;
use bytes::{BufMut, Bytes, BytesMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Command opcodes understood by the PPK firmware. Values are fixed
/// for wire compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    TriggerSet = 0x01,
    AvgNumSet = 0x02,
    TrigWindowSet = 0x03,
    TrigIntervalSet = 0x04,
    SingleTrig = 0x05,
    Run = 0x06,
    Stop = 0x07,
    RangeSet = 0x08,
    LcdSet = 0x09,
    TrigStop = 0x0A,
    CalibrateOffset = 0x0B,
    DutPower = 0x0C,
    VddSet = 0x0D,
    VrefLoSet = 0x0E,
    VrefHiSet = 0x0F,
    ToggleExtTrig = 0x11,
    UserResistorsSet = 0x12,
}

/// Measurement range selection for `RangeSet` (3 = automatic switching)
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RangeSetting {
    Low = 0,
    Mid = 1,
    High = 2,
    Auto = 3,
}

/// A high-level device operation, encodable to an opcode plus payload.
/// Immutable once constructed; ownership of the encoded bytes moves to
/// the transport on send.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Arm the continuous trigger at a level in µA
    SetTriggerLevel(u16),
    /// Number of raw samples per averaged packet, divided by 10 on the wire
    SetAverageCount(u16),
    /// Trigger window length in samples
    SetTriggerWindow(u16),
    /// Trigger sample interval selector
    SetTriggerInterval(u16),
    /// Arm a one-shot trigger at a level in µA
    SingleShot(u16),
    Run,
    Stop,
    SetRange(RangeSetting),
    SetLcd(u8),
    StopTrigger,
    CalibrateOffset,
    SetDutPower(bool),
    /// One supply-voltage step in mV; see [`vdd_ramp`] for the stepping contract
    SetVdd(u16),
    /// Reference-low potentiometer code, already halved; see [`ref_low_pot`]
    SetRefLow(u16),
    /// Reference-high potentiometer code, already halved; see [`ref_high_pot`]
    SetRefHigh(u16),
    ToggleExternalTrigger,
    SetUserResistors(CalibrationResistors),
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::SetTriggerLevel(_) => Opcode::TriggerSet,
            Command::SetAverageCount(_) => Opcode::AvgNumSet,
            Command::SetTriggerWindow(_) => Opcode::TrigWindowSet,
            Command::SetTriggerInterval(_) => Opcode::TrigIntervalSet,
            Command::SingleShot(_) => Opcode::SingleTrig,
            Command::Run => Opcode::Run,
            Command::Stop => Opcode::Stop,
            Command::SetRange(_) => Opcode::RangeSet,
            Command::SetLcd(_) => Opcode::LcdSet,
            Command::StopTrigger => Opcode::TrigStop,
            Command::CalibrateOffset => Opcode::CalibrateOffset,
            Command::SetDutPower(_) => Opcode::DutPower,
            Command::SetVdd(_) => Opcode::VddSet,
            Command::SetRefLow(_) => Opcode::VrefLoSet,
            Command::SetRefHigh(_) => Opcode::VrefHiSet,
            Command::ToggleExternalTrigger => Opcode::ToggleExtTrig,
            Command::SetUserResistors(_) => Opcode::UserResistorsSet,
        }
    }

    /// Encode the payload bytes that follow the opcode on the wire.
    ///
    /// Multi-byte integer fields are big-endian; the user resistor
    /// triple is three little-endian f32 values, low/mid/high.
    pub fn payload(&self) -> Bytes {
        let mut buf = BytesMut::new();
        match self {
            Command::SetTriggerLevel(v)
            | Command::SetAverageCount(v)
            | Command::SetTriggerWindow(v)
            | Command::SetTriggerInterval(v)
            | Command::SingleShot(v)
            | Command::SetVdd(v)
            | Command::SetRefLow(v)
            | Command::SetRefHigh(v) => buf.put_u16(*v),
            Command::SetRange(range) => buf.put_u8((*range).into()),
            Command::SetLcd(v) => buf.put_u8(*v),
            Command::SetDutPower(on) => buf.put_u8(u8::from(*on)),
            Command::SetUserResistors(res) => {
                buf.put_f32_le(res.lo as f32);
                buf.put_f32_le(res.mid as f32);
                buf.put_f32_le(res.hi as f32);
            }
            Command::Run
            | Command::Stop
            | Command::StopTrigger
            | Command::CalibrateOffset
            | Command::ToggleExternalTrigger => {}
        }
        buf.freeze()
    }

    /// Full wire form: opcode byte followed by the payload
    pub fn encode(&self) -> Bytes {
        let payload = self.payload();
        let mut buf = BytesMut::with_capacity(1 + payload.len());
        buf.put_u8(self.opcode().into());
        buf.extend_from_slice(&payload);
        buf.freeze()
    }
}

/// Potentiometer code for the reference-low (switch-down) trip point,
/// halved as the firmware expects. `hysteresis` is the switch
/// hysteresis in the 100..400 control scale (percent × 100).
pub fn ref_low_pot(hysteresis: f64) -> u16 {
    let pot = 2000.0 * (16.3 * hysteresis / 100.0 - 1.0) - 30000.0;
    (pot / 2.0).round() as u16
}

/// Potentiometer code for the reference-high (switch-up) trip point,
/// halved as the firmware expects. `level` is the switch-up slider
/// value in mV.
pub fn ref_high_pot(level: f64) -> u16 {
    let pot = 27000.0 * (10.981_94 * level / 1000.0 / 0.41 - 1.0);
    (pot / 2.0).round() as u16
}

/// Plan the supply-voltage command sequence from one setpoint to
/// another.
///
/// A change of more than 350 mV is split into steps of at most 100 mV,
/// sent in order and ending exactly at the target. The sequence is
/// atomic with respect to the caller: the stored setpoint must only be
/// updated once every step has been sent.
pub fn vdd_ramp(from_mv: u16, to_mv: u16) -> Vec<Command> {
    let delta = from_mv.abs_diff(to_mv);
    if delta <= VDD_RAMP_THRESHOLD_MV {
        return vec![Command::SetVdd(to_mv)];
    }

    let mut steps = Vec::with_capacity(usize::from(delta / VDD_RAMP_STEP_MV) + 1);
    let mut current = from_mv;
    while current != to_mv {
        if to_mv > current {
            current = (current + VDD_RAMP_STEP_MV).min(to_mv);
        } else {
            current = current.saturating_sub(VDD_RAMP_STEP_MV).max(to_mv);
        }
        steps.push(Command::SetVdd(current));
    }
    steps
}
