use crate::command::Command;
use crate::error::PpkError;

/// The debug-transport collaborator, as seen by the acquisition core.
///
/// The implementation owns the byte-stuffed framing and the physical
/// probe connection; the core only hands it an opcode plus payload.
/// Delivery of decoded telemetry goes the other way, by feeding
/// payloads to [`Session::handle_payload`].
///
/// There is no delivery timeout: the transport either delivers or the
/// whole session is considered failed.
///
/// [`Session::handle_payload`]: crate::session::Session::handle_payload
pub trait Transport {
    /// Frame and transmit one command. Ownership of the payload bytes
    /// transfers to the transport.
    fn send(&mut self, opcode: u8, payload: &[u8]) -> Result<(), PpkError>;

    fn send_command(&mut self, command: &Command) -> Result<(), PpkError> {
        self.send(command.opcode().into(), &command.payload())
    }
}
