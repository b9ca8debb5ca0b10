use crate::constants::{CALIBRATION_MEAN_END, CALIBRATION_MEAN_START, CALIBRATION_SAMPLES};
use tracing::{debug, info};

/// Externally visible calibration phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    Idle,
    Calibrating { remaining: u32 },
    Calibrated,
}

/// Transition notifications the session turns into device commands and
/// UI indication
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationEvent {
    /// Entered `Calibrating`: power off the DUT, show the indicator
    Started,
    /// Entered `Calibrated`: power the DUT back on, hide the indicator
    Finished { offset: f64 },
}

enum State {
    Idle,
    Calibrating { remaining: u32, run: Vec<f64> },
    Calibrated,
}

/// The offset calibration state machine: `Idle -> Calibrating(10000) ->
/// Calibrated`, re-entered only through an explicit [`restart`].
///
/// The machine is the sole writer of the global offset. It sequences
/// one run of [`CALIBRATION_SAMPLES`] quiescent average samples and
/// latches the mean of the run's interior (samples 1000..8000, skipping
/// the transients at both ends) as the offset.
///
/// [`restart`]: Calibrator::restart
pub struct Calibrator {
    state: State,
    offset: f64,
}

impl Calibrator {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            offset: 0.0,
        }
    }

    pub fn state(&self) -> CalibrationState {
        match &self.state {
            State::Idle => CalibrationState::Idle,
            State::Calibrating { remaining, .. } => CalibrationState::Calibrating {
                remaining: *remaining,
            },
            State::Calibrated => CalibrationState::Calibrated,
        }
    }

    pub fn is_calibrating(&self) -> bool {
        matches!(self.state, State::Calibrating { .. })
    }

    /// The latched global offset in amperes; 0 until a run completes
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Explicit re-trigger from the control layer: clears the offset
    /// and arms a new run on the next average sample.
    pub fn restart(&mut self) {
        info!("offset calibration restart requested");
        self.offset = 0.0;
        self.state = State::Idle;
    }

    /// Feed one raw (unoffset) average-channel sample through the
    /// machine.
    ///
    /// Returns the value the session should append to the average
    /// window (raw while calibrating, offset-subtracted once
    /// calibrated) and the transition taken on this sample, if any.
    pub fn ingest(&mut self, raw_amps: f64) -> (f64, Option<CalibrationEvent>) {
        let mut event = None;

        if matches!(self.state, State::Idle) {
            info!(samples = CALIBRATION_SAMPLES, "starting offset calibration run");
            self.state = State::Calibrating {
                remaining: CALIBRATION_SAMPLES,
                run: Vec::with_capacity(CALIBRATION_SAMPLES as usize),
            };
            event = Some(CalibrationEvent::Started);
        }

        match &mut self.state {
            State::Calibrating { remaining, run } => {
                run.push(raw_amps);
                *remaining -= 1;
                if *remaining == 0 {
                    let offset = run_mean(run);
                    debug!(offset, "offset calibration run complete");
                    self.offset = offset;
                    self.state = State::Calibrated;
                    event = Some(CalibrationEvent::Finished { offset });
                }
                (raw_amps, event)
            }
            State::Calibrated => (raw_amps - self.offset, event),
            // Unreachable: Idle arms a run above before the match.
            State::Idle => (raw_amps, event),
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean of the interior of a completed calibration run
fn run_mean(run: &[f64]) -> f64 {
    let interior = run
        .get(CALIBRATION_MEAN_START..CALIBRATION_MEAN_END)
        .unwrap_or(run);
    interior.iter().sum::<f64>() / interior.len() as f64
}
