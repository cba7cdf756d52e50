//! The playback session: one load/cancel/retry lifecycle per surface.
//!
//! Every surface callback and timer completion is queued as an [`Envelope`]
//! and applied by [`PlaybackSession::dispatch`], the only place where
//! staleness is checked. A message is stale when its generation is not the
//! current load's or when the load's token has been cancelled.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use vs_core::config::PlayerConfig;
use vs_core::Error;

use crate::error::PlaybackError;
use crate::listeners::ListenerSet;
use crate::poster::PosterTable;
use crate::surface::{
    Dispatch, Envelope, HideMode, Message, PlayCompletion, PlaybackSurface, StatusOverlay,
    StatusStyle, SurfaceEvent,
};

const STATUS_LOADING: &str = "Loading video...";
const STATUS_STARTED: &str = "Video started loading...";
const STATUS_LOADED: &str = "Video loaded";
const STATUS_BUFFERING: &str = "Video buffering...";
const STATUS_CLICK_TO_PLAY: &str = "Click play to start watching";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Buffering,
    Ready,
    Playing,
    Failed,
    Cancelled,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Buffering => "buffering",
            PlaybackState::Ready => "ready",
            PlaybackState::Playing => "playing",
            PlaybackState::Failed => "failed",
            PlaybackState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Playback window requested through [`PlaybackSession::load_segment`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    start: f64,
    end: Option<f64>,
    seek_pending: bool,
}

/// Drives one [`PlaybackSurface`] and reports status on a [`StatusOverlay`].
///
/// The status-hide and retry timers are tokio tasks, so loads must be started
/// from within a tokio runtime. Without one, [`pump`](Self::pump) and
/// [`step`](Self::step) still apply surface events but no timer ever fires.
pub struct PlaybackSession<S: PlaybackSurface, O: StatusOverlay> {
    surface: S,
    overlay: O,
    posters: PosterTable,
    hide_delay: Duration,
    retry_delay: Duration,

    state: PlaybackState,
    source_url: Option<String>,
    poster_url: Option<String>,
    silent: bool,
    retry_attempted: bool,
    ready_seen: bool,
    has_played: bool,
    segment: Option<Segment>,

    generation: u64,
    token: Option<CancellationToken>,
    listeners: ListenerSet,
    tx: UnboundedSender<Envelope>,
    rx: UnboundedReceiver<Envelope>,
}

impl<S: PlaybackSurface, O: StatusOverlay> PlaybackSession<S, O> {
    pub fn new(surface: S, overlay: O) -> Self {
        Self::with_config(surface, overlay, &PlayerConfig::default())
    }

    pub fn with_config(surface: S, overlay: O, config: &PlayerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            surface,
            overlay,
            posters: PosterTable::from_config(config),
            hide_delay: Duration::from_millis(config.status_hide_delay_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            state: PlaybackState::Idle,
            source_url: None,
            poster_url: None,
            silent: false,
            retry_attempted: false,
            ready_seen: false,
            has_played: false,
            segment: None,
            generation: 0,
            token: None,
            listeners: ListenerSet::default(),
            tx,
            rx,
        }
    }

    /// Start loading `url`, preempting any load in progress.
    ///
    /// Only an empty URL is rejected here; everything else the surface
    /// reports through its error event. Must run inside a tokio runtime for
    /// the status hide and network retry to be scheduled.
    pub fn load(&mut self, url: &str) -> vs_core::Result<()> {
        if url.is_empty() {
            return Err(Error::Validation("video url must not be empty".into()));
        }

        if self.surface.source() != Some(url) {
            self.retry_attempted = false;
        }

        let dispatch = self.rearm();
        self.silent = false;
        self.segment = None;
        self.ready_seen = false;
        self.has_played = false;
        self.state = PlaybackState::Idle;

        self.overlay.show(STATUS_LOADING, StatusStyle::Info);
        self.listeners.bind(&mut self.surface, &dispatch);
        self.set_poster_by_url(url);
        self.source_url = Some(url.to_string());
        self.surface.set_source(url);

        tracing::info!(url, generation = self.generation, "Loading video");
        Ok(())
    }

    /// Load `url`, seek to `start` once it can play, and pause at `end`.
    pub fn load_segment(
        &mut self,
        url: &str,
        start: f64,
        end: Option<f64>,
    ) -> vs_core::Result<()> {
        if !start.is_finite() || start < 0.0 {
            return Err(Error::Validation(format!(
                "segment start must be a non-negative number, got {start}"
            )));
        }
        if let Some(end) = end {
            if !end.is_finite() || end < start {
                return Err(Error::Validation(format!(
                    "segment end {end} must not precede start {start}"
                )));
            }
        }

        self.load(url)?;
        self.arm_segment(Segment {
            start,
            end,
            seek_pending: true,
        });
        tracing::debug!(url, start, ?end, "Segment armed");
        Ok(())
    }

    /// Stop the current load and tear the surface down.
    ///
    /// With `silent` set, no error status is shown for the interruption.
    pub fn cancel_load(&mut self, silent: bool) {
        self.silent = silent;
        self.overlay.hide(HideMode::Immediate);

        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.listeners.release(&mut self.surface);
        self.segment = None;

        self.surface.pause();
        self.surface.clear_source();
        let interrupted = self.surface.reset();
        self.surface.clear_poster();
        self.poster_url = None;
        self.source_url = None;

        if self.state != PlaybackState::Cancelled {
            tracing::info!(generation = self.generation, silent, "Load cancelled");
        }
        self.state = PlaybackState::Cancelled;

        if let Some(code) = interrupted {
            self.report_failure(PlaybackError::from_code(Some(code)));
        }
    }

    /// Resolve the poster for `url` and assign it to the surface.
    pub fn set_poster_by_url(&mut self, url: &str) {
        let poster = self.posters.resolve(url).to_string();
        self.surface.set_poster(&poster);
        self.poster_url = Some(poster);
    }

    /// Apply every queued message. Returns how many were not stale.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            if self.dispatch(envelope) {
                applied += 1;
            }
        }
        applied
    }

    /// Apply one queued message, if any. `Some(false)` means it was stale.
    pub fn step(&mut self) -> Option<bool> {
        let envelope = self.rx.try_recv().ok()?;
        Some(self.dispatch(envelope))
    }

    /// Wait for the next surface event or timer and apply it.
    pub async fn next_event(&mut self) -> bool {
        match self.rx.recv().await {
            Some(envelope) => self.dispatch(envelope),
            None => false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn poster_url(&self) -> Option<&str> {
        self.poster_url.as_deref()
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn retry_attempted(&self) -> bool {
        self.retry_attempted
    }

    /// Incremented by every load; events from earlier loads carry an older value.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of live subscriptions on the surface.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Invalidate the current token and mint the next generation's.
    fn rearm(&mut self) -> Dispatch {
        if let Some(old) = self.token.take() {
            old.cancel();
        }
        self.generation += 1;
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        Dispatch::new(self.tx.clone(), self.generation, token)
    }

    fn current_dispatch(&self) -> Option<Dispatch> {
        let token = self.token.as_ref().filter(|t| !t.is_cancelled())?;
        Some(Dispatch::new(self.tx.clone(), self.generation, token.clone()))
    }

    fn arm_segment(&mut self, segment: Segment) {
        if segment.end.is_some() {
            if let Some(dispatch) = self.current_dispatch() {
                self.listeners.bind_progress(&mut self.surface, &dispatch);
            }
        }
        self.segment = Some(segment);
    }

    fn dispatch(&mut self, envelope: Envelope) -> bool {
        let live = self.token.as_ref().is_some_and(|t| !t.is_cancelled());
        if !live || envelope.generation != self.generation {
            tracing::trace!(
                generation = envelope.generation,
                current = self.generation,
                "Discarding stale message"
            );
            return false;
        }

        match envelope.message {
            Message::Surface(event) => self.on_surface_event(event),
            Message::PlayResolved(Ok(())) => {
                self.has_played = true;
                if self.state == PlaybackState::Ready {
                    self.state = PlaybackState::Playing;
                }
            }
            Message::PlayResolved(Err(rejected)) => {
                tracing::info!("Autoplay rejected: {rejected}");
                self.overlay.show(STATUS_CLICK_TO_PLAY, StatusStyle::Info);
            }
            Message::HideStatus => self.overlay.hide(HideMode::Fade),
            Message::Retry => self.retry(),
        }
        true
    }

    fn on_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::LoadStart => {
                self.state = PlaybackState::Loading;
                self.overlay.show(STATUS_STARTED, StatusStyle::Info);
            }
            SurfaceEvent::CanPlay if self.ready_seen => {
                if self.state == PlaybackState::Buffering {
                    self.state = self.resume_state();
                }
            }
            SurfaceEvent::CanPlay => self.on_ready(),
            SurfaceEvent::Waiting => {
                self.state = PlaybackState::Buffering;
                self.overlay.show(STATUS_BUFFERING, StatusStyle::Info);
            }
            SurfaceEvent::Error(code) => {
                let err = PlaybackError::from_code(code);
                self.state = PlaybackState::Failed;
                self.report_failure(err);
                if err.is_retryable() && !self.retry_attempted {
                    self.retry_attempted = true;
                    tracing::info!(
                        delay_ms = self.retry_delay.as_millis() as u64,
                        "Scheduling network retry"
                    );
                    self.schedule(self.retry_delay, Message::Retry);
                }
            }
            SurfaceEvent::TimeUpdate => {
                if self.state == PlaybackState::Buffering {
                    self.state = self.resume_state();
                }
                self.check_segment_end();
            }
        }
    }

    fn on_ready(&mut self) {
        self.ready_seen = true;
        self.state = PlaybackState::Ready;
        self.overlay.show(STATUS_LOADED, StatusStyle::Info);
        self.schedule(self.hide_delay, Message::HideStatus);

        if let Some(segment) = self.segment.as_mut().filter(|s| s.seek_pending) {
            segment.seek_pending = false;
            let start = segment.start;
            self.surface.seek(start);
        }

        if let Some(dispatch) = self.current_dispatch() {
            self.surface.play(PlayCompletion::new(dispatch));
        }
    }

    fn resume_state(&self) -> PlaybackState {
        if !self.ready_seen {
            PlaybackState::Loading
        } else if self.has_played {
            PlaybackState::Playing
        } else {
            PlaybackState::Ready
        }
    }

    fn check_segment_end(&mut self) {
        let Some(end) = self.segment.and_then(|s| s.end) else {
            return;
        };
        let position = self.surface.current_time();
        if position >= end {
            tracing::debug!(position, end, "Segment end reached");
            self.surface.pause();
        }
    }

    /// Re-issue the load for the same URL, keeping any segment window.
    fn retry(&mut self) {
        let Some(url) = self.source_url.clone() else {
            return;
        };
        let segment = self.segment;
        tracing::info!(url = %url, "Retrying load after network error");
        if let Err(e) = self.load(&url) {
            tracing::warn!("Retry failed: {e}");
            return;
        }
        if let Some(segment) = segment {
            self.arm_segment(Segment {
                seek_pending: true,
                ..segment
            });
        }
    }

    fn report_failure(&mut self, err: PlaybackError) {
        if self.silent {
            tracing::debug!("Suppressed playback error: {err}");
            return;
        }
        tracing::warn!(url = ?self.source_url, "Playback failed: {err}");
        self.overlay
            .show(&format!("Video failed to load: {err}"), StatusStyle::Error);
    }

    /// Deliver `message` after `delay` unless the current load is superseded
    /// or cancelled first.
    fn schedule(&self, delay: Duration, message: Message) {
        let Some(dispatch) = self.current_dispatch() else {
            return;
        };
        let deadline = Instant::now() + delay;
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No async runtime; timer dropped");
                return;
            }
        };
        handle.spawn(async move {
            let token = dispatch.token().clone();
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    dispatch.send(message);
                }
            }
        });
    }
}

impl<S: PlaybackSurface, O: StatusOverlay> Drop for PlaybackSession<S, O> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.listeners.release(&mut self.surface);
    }
}
