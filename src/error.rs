//! Error types for the halo engine.

use thiserror::Error;

/// Library error type for halo operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixels of the current frame could not be read back (e.g. tainted by
    /// cross-origin content). Ends the session.
    #[error("cannot read video frame: {0}")]
    FrameRead(String),
}
