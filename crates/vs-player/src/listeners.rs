//! Tracked surface subscriptions for one load.

use crate::surface::{Dispatch, EventSink, PlaybackSurface, SubscriptionId, SurfaceEventKind};

/// The four subscriptions every load binds.
pub const CANONICAL_EVENTS: [SurfaceEventKind; 4] = [
    SurfaceEventKind::LoadStart,
    SurfaceEventKind::CanPlay,
    SurfaceEventKind::Waiting,
    SurfaceEventKind::Error,
];

/// Either empty or the full canonical set, plus an optional progress
/// subscription for segment playback. Both are released together.
#[derive(Debug, Default)]
pub struct ListenerSet {
    canonical: Option<[SubscriptionId; 4]>,
    progress: Option<SubscriptionId>,
}

impl ListenerSet {
    /// Replace whatever is bound with a fresh canonical set.
    pub(crate) fn bind<S: PlaybackSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        dispatch: &Dispatch,
    ) {
        self.release(surface);
        let ids =
            CANONICAL_EVENTS.map(|kind| surface.subscribe(EventSink::new(dispatch.clone(), kind)));
        self.canonical = Some(ids);
    }

    pub(crate) fn bind_progress<S: PlaybackSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        dispatch: &Dispatch,
    ) {
        if let Some(id) = self.progress.take() {
            surface.unsubscribe(id);
        }
        let sink = EventSink::new(dispatch.clone(), SurfaceEventKind::TimeUpdate);
        self.progress = Some(surface.subscribe(sink));
    }

    /// Unsubscribe everything. Safe to call when nothing is bound.
    pub(crate) fn release<S: PlaybackSurface + ?Sized>(&mut self, surface: &mut S) {
        for id in self.canonical.take().into_iter().flatten() {
            surface.unsubscribe(id);
        }
        if let Some(id) = self.progress.take() {
            surface.unsubscribe(id);
        }
    }

    pub fn len(&self) -> usize {
        self.canonical.map_or(0, |ids| ids.len()) + usize::from(self.progress.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
