//! Playback session core.
//!
//! [`PlaybackSession`] owns one video-playback attempt at a time on a passive
//! [`PlaybackSurface`]: it assigns the source and poster, tracks the event
//! subscriptions, surfaces status on a [`StatusOverlay`], retries once after a
//! network failure and tears everything down on cancel.

pub mod error;
pub mod listeners;
pub mod poster;
pub mod session;
pub mod surface;

pub use error::PlaybackError;
pub use listeners::ListenerSet;
pub use poster::PosterTable;
pub use session::{PlaybackSession, PlaybackState};
pub use surface::{
    EventSink, HideMode, PlayCompletion, PlayRejected, PlaybackSurface, StatusOverlay,
    StatusStyle, SubscriptionId, SurfaceEvent, SurfaceEventKind,
};
