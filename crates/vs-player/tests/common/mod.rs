//! In-memory surface and overlay doubles for session tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use vs_player::{
    EventSink, HideMode, PlayCompletion, PlayRejected, PlaybackSession, PlaybackSurface,
    StatusOverlay, StatusStyle, SubscriptionId, SurfaceEvent, SurfaceEventKind,
};

/// Everything the session asked the surface to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetSource(String),
    ClearSource,
    SetPoster(String),
    ClearPoster,
    Play,
    Pause,
    Reset,
    Seek(f64),
}

/// Media element stand-in. A fetch counts as in flight from `set_source`
/// until `reset`, so resetting reports an interruption.
#[derive(Debug, Default)]
pub struct FakeSurface {
    pub source: Option<String>,
    pub poster: Option<String>,
    pub position: f64,
    pub calls: Vec<Call>,
    fetching: bool,
    next_id: u64,
    subscriptions: BTreeMap<u64, EventSink>,
    retired: Vec<EventSink>,
    pending_play: Option<PlayCompletion>,
}

impl FakeSurface {
    /// Emit `event` to every live subscription of its kind.
    pub fn fire(&self, event: SurfaceEvent) -> usize {
        self.subscriptions
            .values()
            .filter(|sink| sink.kind() == event.kind())
            .filter(|sink| sink.emit(event))
            .count()
    }

    /// Emit through sinks that were unsubscribed, as a late callback would.
    pub fn fire_retired(&self, event: SurfaceEvent) -> usize {
        self.retired
            .iter()
            .filter(|sink| sink.kind() == event.kind())
            .filter(|sink| sink.emit(event))
            .count()
    }

    pub fn resolve_play(&mut self, result: Result<(), PlayRejected>) -> bool {
        match self.pending_play.take() {
            Some(completion) => completion.resolve(result),
            None => false,
        }
    }

    /// Whether the outstanding play completion belongs to a dead load.
    pub fn play_is_stale(&self) -> Option<bool> {
        self.pending_play.as_ref().map(PlayCompletion::is_stale)
    }

    pub fn live_kinds(&self) -> Vec<SurfaceEventKind> {
        self.subscriptions.values().map(EventSink::kind).collect()
    }

    pub fn sources_assigned(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SetSource(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl PlaybackSurface for FakeSurface {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_source(&mut self, url: &str) {
        self.calls.push(Call::SetSource(url.to_string()));
        self.source = Some(url.to_string());
        self.fetching = true;
    }

    fn clear_source(&mut self) {
        self.calls.push(Call::ClearSource);
        self.source = None;
    }

    fn set_poster(&mut self, url: &str) {
        self.calls.push(Call::SetPoster(url.to_string()));
        self.poster = Some(url.to_string());
    }

    fn clear_poster(&mut self) {
        self.calls.push(Call::ClearPoster);
        self.poster = None;
    }

    fn play(&mut self, completion: PlayCompletion) {
        self.calls.push(Call::Play);
        self.pending_play = Some(completion);
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }

    fn reset(&mut self) -> Option<u16> {
        self.calls.push(Call::Reset);
        std::mem::take(&mut self.fetching).then_some(vs_player::error::MEDIA_ERR_ABORTED)
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, position: f64) {
        self.calls.push(Call::Seek(position));
        self.position = position;
    }

    fn subscribe(&mut self, sink: EventSink) -> SubscriptionId {
        self.next_id += 1;
        self.subscriptions.insert(self.next_id, sink);
        SubscriptionId(self.next_id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if let Some(sink) = self.subscriptions.remove(&id.0) {
            self.retired.push(sink);
        }
    }
}

/// Overlay that keeps every status it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    pub shown: Vec<(String, StatusStyle)>,
    pub hides: Vec<HideMode>,
    pub visible: bool,
}

impl RecordingOverlay {
    pub fn last(&self) -> Option<(&str, StatusStyle)> {
        self.shown.last().map(|(text, style)| (text.as_str(), *style))
    }

    pub fn errors(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter(|(_, style)| *style == StatusStyle::Error)
            .map(|(text, _)| text.as_str())
            .collect()
    }
}

impl StatusOverlay for RecordingOverlay {
    fn show(&mut self, text: &str, style: StatusStyle) {
        self.shown.push((text.to_string(), style));
        self.visible = true;
    }

    fn hide(&mut self, mode: HideMode) {
        self.hides.push(mode);
        self.visible = false;
    }
}

pub type TestSession = PlaybackSession<FakeSurface, RecordingOverlay>;

pub fn session() -> TestSession {
    PlaybackSession::new(FakeSurface::default(), RecordingOverlay::default())
}

/// Fire an event on the session's surface and apply it.
pub fn fire(session: &mut TestSession, event: SurfaceEvent) -> usize {
    session.surface().fire(event);
    session.pump()
}
