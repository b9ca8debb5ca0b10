pub mod calibration;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handshake;
pub mod measurement;
pub mod session;
pub mod stats;
pub mod transport;
pub mod units;
pub mod window;

pub use calibration::{CalibrationEvent, CalibrationState, Calibrator};
pub use command::{Command, Opcode, RangeSetting};
pub use error::PpkError;
pub use frame::TelemetryFrame;
pub use handshake::Handshake;
pub use measurement::{CalibrationResistors, MeasurementRange, TelemetryWord, TriggerSample};
pub use session::{DisplaySnapshot, Session, SessionConfig, SessionMonitor};
pub use stats::{CursorSummary, Summary};
pub use transport::Transport;
pub use window::SlidingWindow;
