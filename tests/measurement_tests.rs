mod common;

use common::*;
use ppk_rs::measurement::convert;
use ppk_rs::{CalibrationResistors, MeasurementRange, TelemetryWord};

const RESISTORS: CalibrationResistors = CalibrationResistors {
    lo: 10.0,
    mid: 1.0,
    hi: 0.1,
};

fn word_from(range_code: u16, adc: u16) -> TelemetryWord {
    TelemetryWord::from_bytes(trigger_word(range_code, adc))
}

#[test]
fn test_word_field_extraction() {
    for (raw, range, adc) in [
        (0x0000u16, MeasurementRange::None, 0u16),
        (0x4001, MeasurementRange::Low, 1),
        (0x8FFF, MeasurementRange::Mid, 0x0FFF),
        (0xFFFF, MeasurementRange::High, 0x3FFF),
        (0x3FFF, MeasurementRange::None, 0x3FFF),
    ] {
        let word = TelemetryWord::from_bytes(raw.to_le_bytes());
        assert_eq!(word.range(), range, "range of {raw:#06x}");
        assert_eq!(word.adc(), adc, "adc of {raw:#06x}");
        assert_eq!(word.range_code(), ((raw >> 14) & 0b11) as u8);
        assert_eq!(word.adc(), raw & 0x3FFF);
    }
}

#[test]
fn test_word_roundtrip() {
    for raw in [0x0000u16, 0x4001, 0x8FFF, 0xC000, 0xFFFF, 0x1234] {
        let word = TelemetryWord::from_bytes(raw.to_le_bytes());
        let rebuilt = TelemetryWord::new()
            .with_range_code(word.range_code())
            .with_adc(word.adc());
        assert_eq!(rebuilt.into_bytes(), raw.to_le_bytes());
    }
}

#[test]
fn test_convert_low_range_subtracts_offset() {
    let offset = 1.5e-6;
    let adc = 1000u16;
    let sample = convert(word_from(1, adc), &RESISTORS, offset).unwrap();
    let expected = f64::from(adc) * (0.6 / (4.0 * 8192.0 * 10.0)) - offset;
    assert_eq!(sample.range, MeasurementRange::Low);
    assert!(approx_eq(sample.amps, expected, 1e-15), "{} != {}", sample.amps, expected);
}

#[test]
fn test_convert_mid_and_high_ignore_offset() {
    // Offset calibration runs at low currents; only the Low range
    // carries the correction.
    let offset = 1.5e-6;
    let adc = 2048u16;

    let mid = convert(word_from(2, adc), &RESISTORS, offset).unwrap();
    assert_eq!(mid.range, MeasurementRange::Mid);
    assert!(approx_eq(mid.amps, f64::from(adc) * (0.6 / (4.0 * 8192.0 * 1.0)), 1e-15));

    let hi = convert(word_from(3, adc), &RESISTORS, offset).unwrap();
    assert_eq!(hi.range, MeasurementRange::High);
    assert!(approx_eq(hi.amps, f64::from(adc) * (0.6 / (4.0 * 8192.0 * 0.1)), 1e-15));
}

#[test]
fn test_convert_none_range_yields_no_sample() {
    assert!(convert(word_from(0, 1234), &RESISTORS, 0.0).is_none());
}

#[test]
fn test_range_codes() {
    assert_eq!(MeasurementRange::from_code(0), MeasurementRange::None);
    assert_eq!(MeasurementRange::from_code(1), MeasurementRange::Low);
    assert_eq!(MeasurementRange::from_code(2), MeasurementRange::Mid);
    assert_eq!(MeasurementRange::from_code(3), MeasurementRange::High);
    assert_eq!(MeasurementRange::from_code(7), MeasurementRange::Invalid);
    assert_eq!(u8::from(MeasurementRange::Invalid), 4);
}

#[test]
fn test_resistor_lookup() {
    assert_eq!(RESISTORS.for_range(MeasurementRange::Low), Some(10.0));
    assert_eq!(RESISTORS.for_range(MeasurementRange::Mid), Some(1.0));
    assert_eq!(RESISTORS.for_range(MeasurementRange::High), Some(0.1));
    assert_eq!(RESISTORS.for_range(MeasurementRange::None), None);
    assert_eq!(RESISTORS.for_range(MeasurementRange::Invalid), None);
}
