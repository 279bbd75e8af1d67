//! Scene-level precondition failures.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Perspective projection with a zero or non-finite aspect ratio.
    #[error("degenerate aspect ratio {0}")]
    DegenerateAspectRatio(f32),

    /// View direction of zero length, e.g. a look-at target equal to the eye.
    #[error("degenerate view direction: {0}")]
    DegenerateViewDirection(String),

    /// Every id a registry can issue has been handed out.
    #[error("game object ids exhausted")]
    IdsExhausted,
}

pub type SceneResult<T> = std::result::Result<T, SceneError>;
