//! Renderer error types.

use std::fmt;
use std::io;

/// Errors that can occur while building or exporting a rollout
/// animation.
#[derive(Debug)]
pub enum RenderError {
    /// I/O error (file operations)
    Io(io::Error),
    /// A requested state channel is not present in the snapshot.
    MissingChannel(String),
    /// Channel data length disagrees with the snapshot dimensions.
    ShapeMismatch { expected: usize, actual: usize },
    /// Frame index beyond the snapshot's frame count.
    FrameOutOfRange { frame: usize, num_frames: usize },
    /// Snapshot holds no frames.
    EmptyRollout,
    /// Bitmap drawing error
    ImageEncoding(String),
    /// GIF encoding error
    GifEncoding(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Io(e) => write!(f, "I/O error: {}", e),
            RenderError::MissingChannel(name) => {
                write!(f, "snapshot has no channel named {:?}", name)
            }
            RenderError::ShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "channel length mismatch: expected {} values, got {}",
                    expected, actual
                )
            }
            RenderError::FrameOutOfRange { frame, num_frames } => {
                write!(
                    f,
                    "frame {} out of range for a {}-frame rollout",
                    frame, num_frames
                )
            }
            RenderError::EmptyRollout => write!(f, "rollout snapshot is empty"),
            RenderError::ImageEncoding(msg) => write!(f, "image encoding error: {}", msg),
            RenderError::GifEncoding(msg) => write!(f, "GIF encoding error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        RenderError::Io(err)
    }
}

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
