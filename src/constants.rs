// Protocol and conversion constants for the PPK measurement firmware

/// ADC reference voltage in volts
pub const ADC_REF: f64 = 0.6;

/// Gain of the measurement amplifier stage
pub const ADC_GAIN: f64 = 4.0;

/// Full-scale ADC count
pub const ADC_MAX: f64 = 8192.0;

/// Interval between raw ADC samples (13 µs)
pub const SAMPLE_INTERVAL: f64 = 13.0e-6;

/// Length of an average-channel payload (one little-endian f32)
pub const AVERAGE_FRAME_LEN: usize = 4;

/// Number of average samples consumed by one offset calibration run
pub const CALIBRATION_SAMPLES: u32 = 10_000;

/// First sample of the calibration run included in the offset mean
pub const CALIBRATION_MEAN_START: usize = 1_000;

/// One past the last calibration sample included in the offset mean
pub const CALIBRATION_MEAN_END: usize = 8_000;

/// Largest VDD change (mV) sent as a single command
pub const VDD_RAMP_THRESHOLD_MV: u16 = 350;

/// Step size (mV) used when ramping VDD to a distant setpoint
pub const VDD_RAMP_STEP_MV: u16 = 100;

/// Trigger level armed at session start (µA)
pub const DEFAULT_TRIGGER_LEVEL: u16 = 2500;

/// Trigger window length at session start, in samples
pub const DEFAULT_TRIGGER_WINDOW_SAMPLES: u16 = 512;

/// Average window shown at session start (seconds)
pub const DEFAULT_AVERAGE_WINDOW: f64 = 2.0;

/// Raw samples folded into one average-channel packet at session start
pub const DEFAULT_AVERAGE_SAMPLES: u16 = 10;
