//! Playback error taxonomy.
//!
//! Surfaces report raw numeric codes (the HTML media-element values); they are
//! resolved exactly once into [`PlaybackError`] when the error event reaches
//! the session dispatcher.

/// Fetch interrupted by the user or by a programmatic reset.
pub const MEDIA_ERR_ABORTED: u16 = 1;
/// Network failure while fetching the resource.
pub const MEDIA_ERR_NETWORK: u16 = 2;
/// The resource was fetched but could not be decoded.
pub const MEDIA_ERR_DECODE: u16 = 3;
/// The format is unsupported or the resource does not exist.
pub const MEDIA_ERR_SRC_NOT_SUPPORTED: u16 = 4;

/// Closed set of playback failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("Video loading was aborted")]
    Aborted,

    #[error("Network error, please check your connection")]
    Network,

    #[error("Video decode error")]
    Decode,

    #[error("Video format not supported or file not found")]
    SourceUnsupported,

    /// Any other code, or no error detail at all.
    #[error("{}", describe_unknown(.0))]
    Unknown(Option<u16>),
}

fn describe_unknown(code: &Option<u16>) -> String {
    match code {
        Some(code) => format!("Error code: {code}"),
        None => "Unknown error".to_string(),
    }
}

impl PlaybackError {
    /// Classify a raw surface code. `None` means the surface gave no detail.
    pub fn from_code(code: Option<u16>) -> Self {
        match code {
            Some(MEDIA_ERR_ABORTED) => PlaybackError::Aborted,
            Some(MEDIA_ERR_NETWORK) => PlaybackError::Network,
            Some(MEDIA_ERR_DECODE) => PlaybackError::Decode,
            Some(MEDIA_ERR_SRC_NOT_SUPPORTED) => PlaybackError::SourceUnsupported,
            other => PlaybackError::Unknown(other),
        }
    }

    /// Only network failures earn the automatic retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlaybackError::Network)
    }
}
