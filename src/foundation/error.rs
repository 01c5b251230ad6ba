/// Convenience result alias used across the crate.
pub type MaptrailResult<T> = Result<T, MaptrailError>;

/// Error taxonomy for editing, export and project IO.
#[derive(thiserror::Error, Debug)]
pub enum MaptrailError {
    /// Input rejected before any state change (bad settings, too few waypoints, busy exporter).
    #[error("validation error: {0}")]
    Validation(String),

    /// Renderer or frame capture failed; fatal to the running export.
    #[error("renderer error: {0}")]
    Renderer(String),

    /// Archiver/encoder rejected the captured frames or the keyframe script could not be built.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Project file could not be parsed or failed validation.
    #[error("parse error: {0}")]
    Parse(String),

    /// Export stopped by the cancel signal.
    #[error("export cancelled after {frames} frames")]
    Cancelled {
        /// Frames captured before the cancel signal was observed.
        frames: u64,
    },

    /// Wrapped lower-level error (IO and friends).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MaptrailError {
    /// Build a [`MaptrailError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MaptrailError::Renderer`].
    pub fn renderer(msg: impl Into<String>) -> Self {
        Self::Renderer(msg.into())
    }

    /// Build a [`MaptrailError::Encoding`].
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`MaptrailError::Parse`].
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// `true` for errors that abort an export in progress (as opposed to rejecting it up front).
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Renderer(_) | Self::Cancelled { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
