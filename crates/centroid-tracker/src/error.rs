use thiserror::Error;

/// Result type alias for the tracking library
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Errors surfaced by loading, matching and sequencing frames.
///
/// None of these are recovered from inside the library: a frame either resolves completely or the
/// error is returned to the caller and the track store is left as it was at frame start.
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("malformed input for frame `{frame}`: {reason}")]
    MalformedInput { frame: String, reason: String },

    #[error("unknown class `{class}` in frame {frame}")]
    UnknownClass { frame: u32, class: String },

    #[error("frame {frame} presented after frame {previous}, frames must be strictly increasing and start above 0")]
    NonMonotonicFrame { previous: u32, frame: u32 },

    #[error("update references unknown track {0}")]
    UnknownTrack(usize),

    #[error("track {0} already exists")]
    DuplicateTrack(usize),

    #[error("detection in frame {frame} has no track id")]
    Untracked { frame: u32 },

    #[error("invalid class table: {0}")]
    InvalidConfig(#[source] serde_json::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackingError {
    pub fn malformed<F: ToString, S: Into<String>>(frame: F, reason: S) -> Self {
        Self::MalformedInput {
            frame: frame.to_string(),
            reason: reason.into(),
        }
    }
}
