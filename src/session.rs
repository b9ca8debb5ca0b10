use crate::calibration::{CalibrationEvent, CalibrationState, Calibrator};
use crate::command::{Command, RangeSetting, ref_high_pot, ref_low_pot, vdd_ramp};
use crate::constants::{
    DEFAULT_AVERAGE_SAMPLES, DEFAULT_AVERAGE_WINDOW, DEFAULT_TRIGGER_LEVEL,
    DEFAULT_TRIGGER_WINDOW_SAMPLES, SAMPLE_INTERVAL,
};
use crate::error::PpkError;
use crate::frame::TelemetryFrame;
use crate::handshake::Handshake;
use crate::measurement::{CalibrationResistors, convert};
use crate::stats::{CursorSummary, Summary, cursor_summary, summarize};
use crate::transport::Transport;
use crate::window::SlidingWindow;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// Acquisition timing configuration. Window capacities are derived
/// from these: `capacity = floor(window / interval)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval between raw ADC samples, seconds
    pub sample_interval: f64,
    /// Raw samples folded into one average-channel packet
    pub average_samples: u16,
    /// Average display window, seconds
    pub average_window: f64,
    /// Interval between trigger-channel samples, seconds
    pub trigger_interval: f64,
    /// Trigger display window, in samples
    pub trigger_window_samples: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_interval: SAMPLE_INTERVAL,
            average_samples: DEFAULT_AVERAGE_SAMPLES,
            average_window: DEFAULT_AVERAGE_WINDOW,
            trigger_interval: SAMPLE_INTERVAL,
            trigger_window_samples: DEFAULT_TRIGGER_WINDOW_SAMPLES,
        }
    }
}

impl SessionConfig {
    /// Time covered by one average-channel packet
    pub fn average_interval(&self) -> f64 {
        self.sample_interval * f64::from(self.average_samples)
    }

    /// Time span of the trigger window
    pub fn trigger_window(&self) -> f64 {
        self.trigger_interval * f64::from(self.trigger_window_samples)
    }

    fn average_capacity(&self) -> usize {
        SlidingWindow::capacity_for(self.average_window, self.average_interval())
    }

    fn trigger_capacity(&self) -> usize {
        // The trigger window is already expressed in samples; deriving
        // the capacity through the time span would round some counts
        // down by one.
        usize::from(self.trigger_window_samples)
    }
}

/// Immutable view of the display state, published by the producer after
/// every decoded frame and read by the tick contexts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    /// Average-channel window, oldest sample first, amperes
    pub average: Vec<f64>,
    /// Trigger-channel window, oldest sample first, amperes
    pub trigger: Vec<f64>,
    /// Time span of the average window, seconds
    pub average_window: f64,
    /// Time span of the trigger window, seconds
    pub trigger_window: f64,
    /// Offset calibration in progress ("Calibrating..." indicator)
    pub calibrating: bool,
}

/// Read side of the snapshot handover, held by the display tick
/// contexts. Cloneable so the fast curve tick and the slower statistics
/// tick can each keep their own handle.
#[derive(Clone)]
pub struct SessionMonitor {
    rx: watch::Receiver<DisplaySnapshot>,
}

impl SessionMonitor {
    /// Latest fully-formed snapshot
    pub fn snapshot(&self) -> DisplaySnapshot {
        self.rx.borrow().clone()
    }

    /// Statistics over the whole average window
    pub fn average_summary(&self) -> Result<Summary, PpkError> {
        summarize(&self.rx.borrow().average)
    }

    /// Statistics over the whole trigger window
    pub fn trigger_summary(&self) -> Result<Summary, PpkError> {
        summarize(&self.rx.borrow().trigger)
    }

    /// Cursor-bounded statistics over the average window; cursors are
    /// time positions within the window span
    pub fn average_cursor(&self, cursor1: f64, cursor2: f64) -> Result<CursorSummary, PpkError> {
        let snapshot = self.rx.borrow();
        cursor_summary(&snapshot.average, snapshot.average_window, cursor1, cursor2)
    }

    /// Cursor-bounded statistics over the trigger window
    pub fn trigger_cursor(&self, cursor1: f64, cursor2: f64) -> Result<CursorSummary, PpkError> {
        let snapshot = self.rx.borrow();
        cursor_summary(&snapshot.trigger, snapshot.trigger_window, cursor1, cursor2)
    }
}

/// One acquisition session against a connected instrument.
///
/// The session is the single owner of all mutable acquisition state:
/// the sliding windows, the calibration machine and the live resistor
/// set. The transport delivery callback drives [`handle_payload`] on
/// the producer context; tick contexts observe through the
/// [`SessionMonitor`] snapshots and never touch the buffers directly.
///
/// [`handle_payload`]: Session::handle_payload
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    resistors: CalibrationResistors,
    production_resistors: CalibrationResistors,
    board_id: String,
    calibrator: Calibrator,
    average: SlidingWindow,
    trigger: SlidingWindow,
    trigger_level: u16,
    vdd_mv: u16,
    vref_hi: i32,
    vref_lo: i32,
    external_trigger: bool,
    running: bool,
    snapshot_tx: watch::Sender<DisplaySnapshot>,
}

impl<T: Transport> Session<T> {
    /// Open a session from the startup handshake blob read off the
    /// channel. A malformed handshake is fatal; there is no retry.
    pub fn new(transport: T, handshake_blob: &str) -> Result<Self, PpkError> {
        Self::with_config(transport, handshake_blob, SessionConfig::default())
    }

    pub fn with_config(
        transport: T,
        handshake_blob: &str,
        config: SessionConfig,
    ) -> Result<Self, PpkError> {
        let handshake = Handshake::parse(handshake_blob)?;
        info!(
            board_id = %handshake.board_id,
            vdd_mv = handshake.vdd_mv,
            user_override = handshake.user_resistors.is_some(),
            "session initialized"
        );

        let (snapshot_tx, _) = watch::channel(DisplaySnapshot::default());
        let session = Self {
            transport,
            resistors: handshake.effective_resistors(),
            production_resistors: handshake.production_resistors,
            board_id: handshake.board_id.clone(),
            calibrator: Calibrator::new(),
            average: SlidingWindow::new(config.average_capacity()),
            trigger: SlidingWindow::new(config.trigger_capacity()),
            trigger_level: DEFAULT_TRIGGER_LEVEL,
            vdd_mv: handshake.vdd_mv,
            vref_hi: handshake.vref_hi,
            vref_lo: handshake.vref_lo,
            external_trigger: false,
            running: false,
            config,
            snapshot_tx,
        };
        Ok(session)
    }

    /// Handle for the tick contexts; may be taken any number of times
    pub fn monitor(&self) -> SessionMonitor {
        SessionMonitor {
            rx: self.snapshot_tx.subscribe(),
        }
    }

    /// Start acquisition: push the trigger window (production firmware
    /// ships a wrong default), arm the trigger, start the run and set
    /// the average count.
    pub fn start(&mut self) -> Result<(), PpkError> {
        self.send(&Command::SetTriggerWindow(self.config.trigger_window_samples))?;
        self.send(&Command::SetTriggerLevel(self.trigger_level))?;
        self.send(&Command::Run)?;
        self.send(&Command::SetAverageCount(self.config.average_samples / 10))?;
        self.running = true;
        self.publish();
        Ok(())
    }

    /// Stop acquisition. Fire-and-forget: there is no acknowledgment,
    /// and telemetry still in flight is dropped silently.
    pub fn stop(&mut self) -> Result<(), PpkError> {
        self.send(&Command::Stop)?;
        self.running = false;
        Ok(())
    }

    /// Resume a stopped run without re-sending the setup commands
    pub fn resume(&mut self) -> Result<(), PpkError> {
        self.send(&Command::Run)?;
        self.running = true;
        Ok(())
    }

    /// Entry point for the transport delivery callback: one decoded
    /// payload per call, classified and routed.
    pub fn handle_payload(&mut self, payload: &[u8]) -> Result<(), PpkError> {
        if !self.running {
            trace!(len = payload.len(), "telemetry after stop, dropping");
            return Ok(());
        }
        match TelemetryFrame::parse(payload)? {
            TelemetryFrame::Average { amps } => self.handle_average(amps)?,
            TelemetryFrame::Trigger { words } => {
                for word in words {
                    match convert(word, &self.resistors, self.calibrator.offset()) {
                        Some(sample) => self.trigger.push(sample.amps),
                        None => {
                            // Unusable range tag: keep the slot, zero it.
                            warn!(range = %word.range(), "trigger sample has no usable range");
                            self.trigger.push(0.0);
                        }
                    }
                }
                self.publish();
            }
        }
        Ok(())
    }

    fn handle_average(&mut self, raw_amps: f64) -> Result<(), PpkError> {
        let (value, event) = self.calibrator.ingest(raw_amps);
        self.average.push(value);
        match event {
            Some(CalibrationEvent::Started) => {
                self.send(&Command::SetDutPower(false))?;
            }
            Some(CalibrationEvent::Finished { offset }) => {
                info!(offset_amps = offset, "offset calibrated, resuming live display");
                self.send(&Command::SetDutPower(true))?;
                // Calibration samples are not live data.
                self.average.clear();
            }
            None => {}
        }
        self.publish();
        Ok(())
    }

    /// Arm the continuous trigger at a level in µA
    pub fn set_trigger_level(&mut self, level: u16) -> Result<(), PpkError> {
        self.send(&Command::SetTriggerLevel(level))?;
        self.trigger_level = level;
        Ok(())
    }

    /// Arm the trigger from user-entered text. A value that is not a
    /// valid integer is logged and ignored, keeping the prior armed
    /// state.
    pub fn set_trigger_level_text(&mut self, text: &str) -> Result<(), PpkError> {
        match text.trim().parse::<u16>() {
            Ok(level) => self.set_trigger_level(level),
            Err(_) => {
                warn!(text, "invalid trigger value (not an integer), keeping previous");
                Ok(())
            }
        }
    }

    /// Arm a one-shot trigger at a level in µA
    pub fn single_shot(&mut self, level: u16) -> Result<(), PpkError> {
        self.send(&Command::SingleShot(level))
    }

    pub fn stop_trigger(&mut self) -> Result<(), PpkError> {
        self.send(&Command::StopTrigger)
    }

    pub fn set_range(&mut self, range: RangeSetting) -> Result<(), PpkError> {
        self.send(&Command::SetRange(range))
    }

    pub fn set_dut_power(&mut self, on: bool) -> Result<(), PpkError> {
        self.send(&Command::SetDutPower(on))
    }

    /// Enable or disable the external trigger input. Enabling also
    /// stops any armed level trigger.
    pub fn set_external_trigger(&mut self, enabled: bool) -> Result<(), PpkError> {
        if enabled == self.external_trigger {
            return Ok(());
        }
        if enabled {
            self.send(&Command::StopTrigger)?;
        }
        self.send(&Command::ToggleExternalTrigger)?;
        self.external_trigger = enabled;
        Ok(())
    }

    /// Move the supply voltage to a new setpoint in mV, ramping in
    /// steps of at most 100 mV when the change exceeds 350 mV. The
    /// stored setpoint is updated only once the whole sequence has been
    /// sent; no other voltage request may interleave (the session holds
    /// `&mut self` for the duration).
    pub fn set_vdd(&mut self, target_mv: u16) -> Result<(), PpkError> {
        for command in vdd_ramp(self.vdd_mv, target_mv) {
            self.send(&command)?;
        }
        self.vdd_mv = target_mv;
        Ok(())
    }

    /// Set the reference-low (switch-down) trip point from a hysteresis
    /// in the 100..400 control scale (percent × 100)
    pub fn set_ref_low(&mut self, hysteresis: f64) -> Result<(), PpkError> {
        self.send(&Command::SetRefLow(ref_low_pot(hysteresis)))
    }

    /// Set the reference-high (switch-up) trip point from a switch-up
    /// level in mV
    pub fn set_ref_high(&mut self, level_mv: f64) -> Result<(), PpkError> {
        self.send(&Command::SetRefHigh(ref_high_pot(level_mv)))
    }

    /// Write user calibration resistors to the device and use them for
    /// conversion from now on
    pub fn set_user_resistors(&mut self, resistors: CalibrationResistors) -> Result<(), PpkError> {
        self.send(&Command::SetUserResistors(resistors))?;
        self.resistors = resistors;
        Ok(())
    }

    /// Write the production calibration back, discarding user overrides
    pub fn reset_resistors(&mut self) -> Result<(), PpkError> {
        self.set_user_resistors(self.production_resistors)
    }

    /// Explicitly re-run offset calibration: clears the latched offset
    /// and arms a new run on the next average sample.
    pub fn request_offset_calibration(&mut self) {
        self.calibrator.restart();
        self.publish();
    }

    /// Change the average display window; the buffer is reallocated and
    /// zero-filled
    pub fn configure_average_window(&mut self, window_seconds: f64) {
        self.config.average_window = window_seconds;
        self.average.resize(self.config.average_capacity());
        self.publish();
    }

    /// Change how many raw samples the device folds into one averaged
    /// packet; resizes the average buffer to keep the time window
    pub fn set_average_samples(&mut self, samples: u16) -> Result<(), PpkError> {
        self.send(&Command::SetAverageCount(samples / 10))?;
        self.config.average_samples = samples;
        self.average.resize(self.config.average_capacity());
        self.publish();
        Ok(())
    }

    /// Change the trigger window length in samples; pushed to the
    /// device and mirrored in the trigger buffer capacity
    pub fn set_trigger_window(&mut self, samples: u16) -> Result<(), PpkError> {
        self.send(&Command::SetTriggerWindow(samples))?;
        self.config.trigger_window_samples = samples;
        self.trigger.resize(self.config.trigger_capacity());
        self.publish();
        Ok(())
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn resistors(&self) -> CalibrationResistors {
        self.resistors
    }

    pub fn offset(&self) -> f64 {
        self.calibrator.offset()
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibrator.state()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn vdd_mv(&self) -> u16 {
        self.vdd_mv
    }

    pub fn vref_hi(&self) -> i32 {
        self.vref_hi
    }

    pub fn vref_lo(&self) -> i32 {
        self.vref_lo
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn send(&mut self, command: &Command) -> Result<(), PpkError> {
        debug!(?command, "sending device command");
        self.transport.send_command(command)
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(DisplaySnapshot {
            average: self.average.to_vec(),
            trigger: self.trigger.to_vec(),
            average_window: self.config.average_window,
            trigger_window: self.config.trigger_window(),
            calibrating: self.calibrator.is_calibrating(),
        });
    }
}
