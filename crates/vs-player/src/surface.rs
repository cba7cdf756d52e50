//! Boundary traits for the passive media element and the status overlay.
//!
//! A surface never calls back into the session directly. Each subscription
//! receives an [`EventSink`] stamped with the load generation and the load's
//! cancellation token; events pushed through it land in the session inbox and
//! are applied by the session dispatcher.

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Events a surface can report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// The browser-native fetch started.
    LoadStart,
    /// Enough data is buffered to begin (or resume) playback.
    CanPlay,
    /// Playback stalled waiting for data.
    Waiting,
    /// The fetch or decode failed. `None` when the surface has no detail.
    Error(Option<u16>),
    /// Playback position advanced.
    TimeUpdate,
}

impl SurfaceEvent {
    pub fn kind(&self) -> SurfaceEventKind {
        match self {
            SurfaceEvent::LoadStart => SurfaceEventKind::LoadStart,
            SurfaceEvent::CanPlay => SurfaceEventKind::CanPlay,
            SurfaceEvent::Waiting => SurfaceEventKind::Waiting,
            SurfaceEvent::Error(_) => SurfaceEventKind::Error,
            SurfaceEvent::TimeUpdate => SurfaceEventKind::TimeUpdate,
        }
    }
}

/// Subscription key for [`PlaybackSurface::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceEventKind {
    LoadStart,
    CanPlay,
    Waiting,
    Error,
    TimeUpdate,
}

/// Handle returned by [`PlaybackSurface::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Autoplay was refused (typically by browser policy).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("playback was rejected: {0}")]
pub struct PlayRejected(pub String);

#[derive(Debug)]
pub(crate) enum Message {
    Surface(SurfaceEvent),
    PlayResolved(Result<(), PlayRejected>),
    HideStatus,
    Retry,
}

#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) generation: u64,
    pub(crate) message: Message,
}

/// Route back into the session inbox for one load generation.
#[derive(Debug, Clone)]
pub(crate) struct Dispatch {
    tx: UnboundedSender<Envelope>,
    generation: u64,
    token: CancellationToken,
}

impl Dispatch {
    pub(crate) fn new(
        tx: UnboundedSender<Envelope>,
        generation: u64,
        token: CancellationToken,
    ) -> Self {
        Self {
            tx,
            generation,
            token,
        }
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn send(&self, message: Message) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.tx
            .send(Envelope {
                generation: self.generation,
                message,
            })
            .is_ok()
    }
}

/// Callback handed to a surface for one event kind.
#[derive(Debug, Clone)]
pub struct EventSink {
    dispatch: Dispatch,
    kind: SurfaceEventKind,
}

impl EventSink {
    pub(crate) fn new(dispatch: Dispatch, kind: SurfaceEventKind) -> Self {
        Self { dispatch, kind }
    }

    pub fn kind(&self) -> SurfaceEventKind {
        self.kind
    }

    /// Deliver an event. Returns `false` when the load this sink belongs to
    /// was superseded or cancelled; the event is dropped in that case.
    pub fn emit(&self, event: SurfaceEvent) -> bool {
        self.dispatch.send(Message::Surface(event))
    }

    pub fn is_stale(&self) -> bool {
        self.dispatch.token.is_cancelled()
    }
}

/// One-shot completion for [`PlaybackSurface::play`].
#[derive(Debug)]
pub struct PlayCompletion {
    dispatch: Dispatch,
}

impl PlayCompletion {
    pub(crate) fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Report whether playback actually started.
    pub fn resolve(self, result: Result<(), PlayRejected>) -> bool {
        self.dispatch.send(Message::PlayResolved(result))
    }

    pub fn is_stale(&self) -> bool {
        self.dispatch.token.is_cancelled()
    }
}

/// The passive media element a session drives.
pub trait PlaybackSurface {
    /// Currently assigned source, if any.
    fn source(&self) -> Option<&str>;

    /// Assign a source and begin the native progressive fetch.
    fn set_source(&mut self, url: &str);

    fn clear_source(&mut self);

    fn set_poster(&mut self, url: &str);

    fn clear_poster(&mut self);

    /// Attempt playback; the outcome is reported through `completion`.
    fn play(&mut self, completion: PlayCompletion);

    fn pause(&mut self);

    /// Drop all buffered state. Returns the error code the surface reports
    /// if this interrupted an in-flight fetch.
    fn reset(&mut self) -> Option<u16>;

    /// Playback position in seconds.
    fn current_time(&self) -> f64;

    fn seek(&mut self, position: f64);

    fn subscribe(&mut self, sink: EventSink) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideMode {
    Fade,
    Immediate,
}

/// Transient text shown over the video.
pub trait StatusOverlay {
    fn show(&mut self, text: &str, style: StatusStyle);

    fn hide(&mut self, mode: HideMode);
}
