//! Display unit scaling for currents and durations.

/// Scale a current in amperes to a display value and unit.
///
/// Thresholds are on the magnitude (1 mA, 1 µA, below that nA); the
/// sign is preserved in the returned value.
pub fn scale_current(amps: f64) -> (f64, &'static str) {
    let magnitude = amps.abs();
    if magnitude >= 1.0e-3 {
        (amps * 1.0e3, "mA")
    } else if magnitude >= 1.0e-6 {
        (amps * 1.0e6, "µA")
    } else {
        (amps * 1.0e9, "nA")
    }
}

/// Scale a duration in seconds to a display value and unit
/// (s / ms / µs / ns).
pub fn scale_duration(seconds: f64) -> (f64, &'static str) {
    let magnitude = seconds.abs();
    if magnitude >= 1.0 {
        (seconds, "s")
    } else if magnitude >= 1.0e-3 {
        (seconds * 1.0e3, "ms")
    } else if magnitude >= 1.0e-6 {
        (seconds * 1.0e6, "µs")
    } else {
        (seconds * 1.0e9, "ns")
    }
}
