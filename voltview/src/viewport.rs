//! The shared visible time window, synchronized across views
//!
//! One [`Viewport`] is shared by every active view and by the acquisition
//! thread. Views subscribe to receive `(min, max)` pushes; the window
//! auto-advances in fixed jumps as data streams past its right edge, and a
//! user pan/zoom on any view is broadcast to all the others.

use parking_lot::Mutex;

/// At least this many samples fit in the default window.
pub const VIEW_POINTS_MIN: u32 = 100;

/// The window advances by this many sample intervals when data reaches its
/// right edge — fixed jumps, not a shift on every frame.
pub const VIEW_POINTS_STEP: u32 = 20;

/// Never show less than this many seconds, even at the fastest rate.
const MIN_SPAN_SECS: f64 = 5.0;

/// Identifies one subscribed view.
pub type ViewId = usize;

/// min and max are a pair: they are only ever read or written together,
/// under the one lock, along with the sample interval both window formulas
/// need.
struct State {
    min: f64,
    max: f64,
    interval_secs: f64,
    views: Vec<(ViewId, flume::Sender<(f64, f64)>)>,
    next_id: ViewId,
}

pub struct Viewport {
    state: Mutex<State>,
}

impl Viewport {
    /// A window spanning `[0, time_range]` at the given sample interval.
    pub fn new(time_range: f64, interval_secs: f64) -> Viewport {
        Viewport {
            state: Mutex::new(State {
                min: 0.0,
                max: time_range,
                interval_secs,
                views: Vec::new(),
                next_id: 0,
            }),
        }
    }

    /// Current window as `(min, max)`.
    pub fn range(&self) -> (f64, f64) {
        let state = self.state.lock();
        (state.min, state.max)
    }

    /// Register a view. It immediately receives the current window on the
    /// returned channel, then every later change.
    pub fn subscribe(&self) -> (ViewId, flume::Receiver<(f64, f64)>) {
        let (tx, rx) = flume::unbounded();
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let _ = tx.send((state.min, state.max));
        state.views.push((id, tx));
        (id, rx)
    }

    /// Recompute the default window after the interval or unit changed,
    /// keeping at least [`VIEW_POINTS_MIN`] samples and 5 s visible.
    pub fn on_interval_changed(&self, interval_secs: f64, elapsed: f64) {
        let mut state = self.state.lock();
        state.interval_secs = interval_secs;

        let span = (interval_secs * VIEW_POINTS_MIN as f64).max(MIN_SPAN_SECS);
        let overhang = interval_secs * VIEW_POINTS_STEP as f64;
        state.max = elapsed + overhang;
        state.min = state.max - span;
        if state.min < 0.0 {
            state.min = 0.0;
            state.max = span;
        }
        push_all(&mut state, None);
    }

    /// New data arrived at `elapsed` seconds. If it reached the right edge,
    /// jump the window forward by [`VIEW_POINTS_STEP`] sample intervals,
    /// preserving its width; otherwise leave a manually set range alone.
    pub fn on_new_data(&self, elapsed: f64) {
        let mut state = self.state.lock();
        if elapsed < state.max {
            return;
        }
        let width = state.max - state.min;
        state.max = elapsed + state.interval_secs * VIEW_POINTS_STEP as f64;
        state.min = state.max - width;
        push_all(&mut state, None);
    }

    /// A view reports the user panned or zoomed it. Every other view gets
    /// the new window; the source keeps the exact range it set.
    pub fn on_user_range_changed(&self, source: ViewId, min: f64, max: f64) {
        let mut state = self.state.lock();
        state.min = min;
        state.max = max;
        push_all(&mut state, Some(source));
    }

    /// Rewind to t=0, keeping the current width. Used after the series
    /// data is cleared.
    pub fn on_clear(&self) {
        let mut state = self.state.lock();
        let width = state.max - state.min;
        state.min = 0.0;
        state.max = width;
        push_all(&mut state, None);
    }

    /// Re-push the current window to every view, e.g. after the active
    /// view layout switched.
    pub fn rebroadcast(&self) {
        let mut state = self.state.lock();
        push_all(&mut state, None);
    }
}

/// Push the current window to every subscriber except `skip`, dropping
/// subscribers whose receiving end is gone.
fn push_all(state: &mut State, skip: Option<ViewId>) {
    let (min, max) = (state.min, state.max);
    state.views.retain(|(id, tx)| {
        if skip == Some(*id) {
            return true;
        }
        tx.send((min, max)).is_ok()
    });
}
