use std::io;
use thiserror::Error;

/// The primary error type for the `ppk-rs` library.
#[derive(Error, Debug)]
pub enum PpkError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("handshake error: {0}")]
    Handshake(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("index out of bounds")]
    IndexOutOfBounds,

    #[error("N/A (out of bounds)")]
    CursorOutOfBounds,

    #[error("window is empty")]
    EmptyWindow,
}
