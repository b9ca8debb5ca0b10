mod common;

use common::approx_eq;
use ppk_rs::{CalibrationEvent, CalibrationState, Calibrator};

#[test]
fn test_starts_idle_with_zero_offset() {
    let calibrator = Calibrator::new();
    assert_eq!(calibrator.state(), CalibrationState::Idle);
    assert_eq!(calibrator.offset(), 0.0);
    assert!(!calibrator.is_calibrating());
}

#[test]
fn test_first_sample_arms_a_run() {
    let mut calibrator = Calibrator::new();
    let (value, event) = calibrator.ingest(3.0e-6);
    assert_eq!(value, 3.0e-6);
    assert_eq!(event, Some(CalibrationEvent::Started));
    assert_eq!(
        calibrator.state(),
        CalibrationState::Calibrating { remaining: 9999 }
    );
}

#[test]
fn test_run_completes_after_exactly_10000_samples() {
    let mut calibrator = Calibrator::new();
    let samples: Vec<f64> = (0..10_000).map(|i| f64::from(i) * 1.0e-9).collect();

    let mut finished = 0;
    for (i, &sample) in samples.iter().enumerate() {
        let (_, event) = calibrator.ingest(sample);
        match event {
            Some(CalibrationEvent::Finished { .. }) => {
                assert_eq!(i, 9_999, "finished on the wrong sample");
                finished += 1;
            }
            Some(CalibrationEvent::Started) => assert_eq!(i, 0),
            None => assert!(matches!(
                calibrator.state(),
                CalibrationState::Calibrating { .. }
            )),
        }
    }
    assert_eq!(finished, 1);
    assert_eq!(calibrator.state(), CalibrationState::Calibrated);

    // Offset is the mean over run samples [1000, 8000), skipping the
    // transients at both ends of the run.
    let expected: f64 = samples[1000..8000].iter().sum::<f64>() / 7000.0;
    assert!(approx_eq(calibrator.offset(), expected, 1e-18));
}

#[test]
fn test_calibrated_samples_have_offset_subtracted() {
    let mut calibrator = Calibrator::new();
    for _ in 0..10_000 {
        calibrator.ingest(2.0e-6);
    }
    assert!(approx_eq(calibrator.offset(), 2.0e-6, 1e-15));

    let (value, event) = calibrator.ingest(5.0e-6);
    assert_eq!(event, None);
    assert!(approx_eq(value, 3.0e-6, 1e-15));
    // No transition back out of Calibrated on its own.
    assert_eq!(calibrator.state(), CalibrationState::Calibrated);
}

#[test]
fn test_restart_clears_offset_and_rearms() {
    let mut calibrator = Calibrator::new();
    for _ in 0..10_000 {
        calibrator.ingest(2.0e-6);
    }
    assert!(calibrator.offset() > 0.0);

    calibrator.restart();
    assert_eq!(calibrator.state(), CalibrationState::Idle);
    assert_eq!(calibrator.offset(), 0.0);

    let (_, event) = calibrator.ingest(1.0e-6);
    assert_eq!(event, Some(CalibrationEvent::Started));
}
