// ── Reactive cache streams ──
//
// Subscription types for consuming cache changes from the StatusStore,
// either raw (`CacheStream`) or rendered through a view (`ViewStream`).

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::CacheState;
use crate::view::ParameterView;

/// A subscription to one device's cache.
///
/// Provides both point-in-time access and change notification via
/// `changed()` or by converting to a `Stream`.
pub struct CacheStream {
    current: Arc<CacheState>,
    receiver: watch::Receiver<Arc<CacheState>>,
}

impl CacheStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<CacheState>>) -> Self {
        let current = Arc::clone(&receiver.borrow());
        Self { current, receiver }
    }

    /// State captured at creation time or at the last `changed()`.
    pub fn current(&self) -> &Arc<CacheState> {
        &self.current
    }

    /// Latest published state.
    pub fn latest(&self) -> Arc<CacheState> {
        Arc::clone(&self.receiver.borrow())
    }

    /// Wait for the next publish. Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Arc<CacheState>> {
        self.receiver.changed().await.ok()?;
        let state = Arc::clone(&self.receiver.borrow_and_update());
        self.current = Arc::clone(&state);
        Some(state)
    }

    /// Render every future state through `view`.
    pub fn render<V: ParameterView>(self, view: V) -> ViewStream<V> {
        ViewStream { view, cache: self }
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    /// The first item is the state current at conversion time.
    pub fn into_stream(self) -> CacheWatchStream {
        CacheWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct CacheWatchStream {
    inner: WatchStream<Arc<CacheState>>,
}

impl Stream for CacheWatchStream {
    type Item = Arc<CacheState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

// ── ViewStream ──────────────────────────────────────────────────────

/// A cache subscription that re-renders one view on every change.
pub struct ViewStream<V: ParameterView> {
    view: V,
    cache: CacheStream,
}

impl<V: ParameterView> ViewStream<V> {
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Rendered from the last observed state.
    pub fn current(&self) -> V::State {
        self.view.render(self.cache.current())
    }

    /// Wait for the next cache publish and render it.
    pub async fn changed(&mut self) -> Option<V::State> {
        let state = self.cache.changed().await?;
        Some(self.view.render(&state))
    }

    pub fn into_stream(self) -> ViewWatchStream<V> {
        ViewWatchStream {
            view: self.view,
            inner: self.cache.into_stream(),
        }
    }
}

/// `Stream` of rendered view states.
pub struct ViewWatchStream<V: ParameterView> {
    view: V,
    inner: CacheWatchStream,
}

impl<V: ParameterView + Unpin> Stream for ViewWatchStream<V> {
    type Item = V::State;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(state)) => Poll::Ready(Some(this.view.render(&state))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;
    use crate::command::PresetTransition;
    use crate::store::StatusStore;
    use crate::view::ClimateView;

    #[test]
    fn view_stream_yields_current_then_waits() {
        let store = StatusStore::new(Duration::from_secs(30));
        let mut stream = task::spawn(store.subscribe().render(ClimateView).into_stream());

        let first = assert_ready!(stream.poll_next()).unwrap();
        assert!(!first.available);
        assert_pending!(stream.poll_next());

        store.record_failure("timed out", PresetTransition::Keep);
        assert!(stream.is_woken());
        let second = assert_ready!(stream.poll_next()).unwrap();
        assert!(!second.available);
        assert_pending!(stream.poll_next());
    }

    #[tokio::test]
    async fn cache_stream_tracks_revisions() {
        let store = StatusStore::new(Duration::from_secs(30));
        let mut cache = store.subscribe();
        assert_eq!(cache.current().revision, 0);

        store.record_failure("unreachable", PresetTransition::Keep);
        let next = cache.changed().await.unwrap();
        assert_eq!(next.revision, 1);
        assert_eq!(cache.current().refresh.consecutive_failures, 1);
        assert_eq!(cache.latest().revision, 1);
    }
}
