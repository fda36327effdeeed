//! In-process native pager with a virtual clock.
//!
//! ## Usage
//!
//! Drive a [`Carousel`](crate::Carousel) without a platform widget, in tests
//! or scripted demos. Keep a [`HeadlessProbe`] to advance time, simulate
//! swipes and inspect what the carousel asked the widget to do.
//!
//! ```
//! use std::time::Duration;
//! use carousel_core::{Carousel, CarouselConfig, HeadlessPager};
//!
//! let pager = HeadlessPager::new(|item: &u32| format!("page {item}"));
//! let probe = pager.probe();
//! let mut carousel = Carousel::attach(&vec![10, 20], 0, pager, CarouselConfig::default());
//!
//! carousel.pump(probe.swipe_to(1));
//! assert_eq!(carousel.position(), 1);
//! assert_eq!(probe.pages(), vec!["page 10".to_string(), "page 20".to_string()]);
//! assert!(probe.advance(Duration::from_millis(500)).is_empty());
//! ```
use std::{collections::VecDeque, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::{
    config::{CarouselConfig, DEFAULT_SETTLE_DELAY, Orientation},
    native::{NativeEvent, NativePager, NativeResult, Settle, TransitionRequest},
};

/// A call the carousel made on the headless widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeOp {
    /// [`NativePager::configure`].
    Configure,
    /// [`NativePager::rebuild`].
    Rebuild {
        /// Item count.
        count: usize,
        /// Page shown after the rebuild.
        position: usize,
    },
    /// [`NativePager::reload`].
    Reload {
        /// Item count.
        count: usize,
        /// Page shown after the reload.
        position: usize,
    },
    /// [`NativePager::refresh_page`].
    RefreshPage {
        /// Re-rendered page.
        index: usize,
    },
    /// [`NativePager::transition_to`].
    Transition(TransitionRequest),
    /// [`NativePager::teardown`].
    Teardown,
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    target: usize,
    settles_at: Duration,
}

#[derive(Debug)]
struct HeadlessState {
    pages: Vec<String>,
    current: usize,
    clock: Duration,
    settle_delay: Duration,
    in_flight: Option<InFlight>,
    events: VecDeque<NativeEvent>,
    ops: Vec<NativeOp>,
    highlights: Vec<bool>,
    indicators_visible: bool,
    swiping_enabled: bool,
    orientation: Orientation,
    teardown_error: Option<String>,
    torn_down: bool,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            current: 0,
            clock: Duration::ZERO,
            settle_delay: DEFAULT_SETTLE_DELAY,
            in_flight: None,
            events: VecDeque::new(),
            ops: Vec::new(),
            highlights: Vec::new(),
            indicators_visible: false,
            swiping_enabled: true,
            orientation: Orientation::default(),
            teardown_error: None,
            torn_down: false,
        }
    }
}

/// Shared view into a [`HeadlessPager`], usable after the pager has been
/// moved into a carousel.
#[derive(Clone, Debug, Default)]
pub struct HeadlessProbe {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessProbe {
    /// Advances the virtual clock by `elapsed`.
    ///
    /// Returns the native callbacks produced meanwhile: any queued echoes,
    /// then a selection report and a settle for a transition whose delay
    /// has passed.
    pub fn advance(&self, elapsed: Duration) -> Vec<NativeEvent> {
        let mut state = self.state.lock();
        state.clock += elapsed;
        if let Some(in_flight) = state.in_flight
            && state.clock >= in_flight.settles_at
        {
            state.in_flight = None;
            state.current = in_flight.target;
            state.events.push_back(NativeEvent::SelectionChanged(in_flight.target));
            state.events.push_back(NativeEvent::Settled);
            trace!(target = in_flight.target, "headless transition settled");
        }
        state.events.drain(..).collect()
    }

    /// Simulates the user swiping to `index`.
    ///
    /// Returns nothing when swiping is disabled or the index is not a page.
    pub fn swipe_to(&self, index: usize) -> Vec<NativeEvent> {
        let mut state = self.state.lock();
        if !state.swiping_enabled || index >= state.pages.len() {
            return Vec::new();
        }
        state.current = index;
        state.events.push_back(NativeEvent::SelectionChanged(index));
        state.events.drain(..).collect()
    }

    /// Takes callbacks queued by immediate transitions.
    pub fn take_events(&self) -> Vec<NativeEvent> {
        self.state.lock().events.drain(..).collect()
    }

    /// Page the widget currently shows.
    pub fn current_page(&self) -> usize {
        self.state.lock().current
    }

    /// Rendered page contents.
    pub fn pages(&self) -> Vec<String> {
        self.state.lock().pages.clone()
    }

    /// Calls received so far, oldest first.
    pub fn ops(&self) -> Vec<NativeOp> {
        self.state.lock().ops.clone()
    }

    /// Indicator highlights last pushed by the carousel.
    pub fn highlights(&self) -> Vec<bool> {
        self.state.lock().highlights.clone()
    }

    /// Whether the carousel asked for visible indicators.
    pub fn indicators_visible(&self) -> bool {
        self.state.lock().indicators_visible
    }

    /// Orientation received on configure.
    pub fn orientation(&self) -> Orientation {
        self.state.lock().orientation
    }

    /// Whether a deferred transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().clock
    }

    /// Makes the next teardown fail with `message`.
    pub fn fail_teardown(&self, message: impl Into<String>) {
        self.state.lock().teardown_error = Some(message.into());
    }

    /// Whether the widget has been torn down.
    pub fn is_torn_down(&self) -> bool {
        self.state.lock().torn_down
    }
}

/// Native pager that renders pages to strings.
pub struct HeadlessPager<T> {
    content: Box<dyn Fn(&T) -> String + Send + Sync>,
    probe: HeadlessProbe,
}

impl<T> HeadlessPager<T> {
    /// Creates a pager that renders each item with `content`.
    pub fn new(content: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self {
            content: Box::new(content),
            probe: HeadlessProbe::default(),
        }
    }

    /// Returns a probe sharing this pager's state.
    pub fn probe(&self) -> HeadlessProbe {
        self.probe.clone()
    }

    fn render(&self, items: &[T]) -> Vec<String> {
        items.iter().map(|item| (self.content)(item)).collect()
    }
}

impl<T> NativePager<T> for HeadlessPager<T> {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn configure(&mut self, config: &CarouselConfig) {
        let mut state = self.probe.state.lock();
        state.settle_delay = config.settle_delay;
        state.swiping_enabled = config.swiping_enabled;
        state.orientation = config.orientation;
        state.indicators_visible = config.show_indicators;
        state.ops.push(NativeOp::Configure);
    }

    fn rebuild(&mut self, items: &[T], position: usize) {
        let pages = self.render(items);
        let mut state = self.probe.state.lock();
        state.pages = pages;
        state.current = position;
        state.in_flight = None;
        state.ops.push(NativeOp::Rebuild {
            count: items.len(),
            position,
        });
    }

    fn reload(&mut self, items: &[T], position: usize) {
        let pages = self.render(items);
        let mut state = self.probe.state.lock();
        state.pages = pages;
        state.current = position;
        state.ops.push(NativeOp::Reload {
            count: items.len(),
            position,
        });
    }

    fn refresh_page(&mut self, index: usize, item: &T) {
        let page = (self.content)(item);
        let mut state = self.probe.state.lock();
        if let Some(slot) = state.pages.get_mut(index) {
            *slot = page;
        }
        state.ops.push(NativeOp::RefreshPage { index });
    }

    fn transition_to(&mut self, request: TransitionRequest) -> Settle {
        let mut state = self.probe.state.lock();
        state.ops.push(NativeOp::Transition(request));
        if !request.animate || state.settle_delay.is_zero() {
            state.current = request.target;
            state
                .events
                .push_back(NativeEvent::SelectionChanged(request.target));
            return Settle::Immediate;
        }
        if let Some(previous) = state.in_flight {
            warn!(
                previous = previous.target,
                next = request.target,
                "headless pager replacing an unsettled transition"
            );
        }
        let settles_at = state.clock + state.settle_delay;
        state.in_flight = Some(InFlight {
            target: request.target,
            settles_at,
        });
        Settle::Deferred
    }

    fn update_indicators(&mut self, highlights: &[bool], visible: bool) {
        let mut state = self.probe.state.lock();
        state.highlights = highlights.to_vec();
        state.indicators_visible = visible;
    }

    fn teardown(&mut self) -> NativeResult {
        let mut state = self.probe.state.lock();
        state.ops.push(NativeOp::Teardown);
        state.in_flight = None;
        state.events.clear();
        if let Some(message) = state.teardown_error.take() {
            return Err(message.into());
        }
        state.torn_down = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::native::TransitionDirection;

    fn request(target: usize, animate: bool) -> TransitionRequest {
        TransitionRequest {
            target,
            direction: TransitionDirection::Forward,
            animate,
        }
    }

    #[test]
    fn animated_transition_settles_after_delay() {
        let mut pager = HeadlessPager::new(|item: &i32| item.to_string());
        let probe = pager.probe();
        pager.rebuild(&[1, 2, 3], 0);

        assert_eq!(pager.transition_to(request(2, true)), Settle::Deferred);
        assert!(probe.advance(Duration::from_millis(99)).is_empty());
        assert_eq!(probe.current_page(), 0);

        let events = probe.advance(Duration::from_millis(1));
        assert_eq!(
            events,
            vec![NativeEvent::SelectionChanged(2), NativeEvent::Settled]
        );
        assert_eq!(probe.current_page(), 2);
        assert!(!probe.is_transitioning());
    }

    #[test]
    fn zero_delay_settles_immediately() {
        let mut pager = HeadlessPager::new(|item: &i32| item.to_string());
        let probe = pager.probe();
        pager.configure(&CarouselConfig::default().settle_delay(Duration::ZERO));
        pager.rebuild(&[1, 2], 0);
        assert_eq!(pager.transition_to(request(1, true)), Settle::Immediate);
        assert_eq!(probe.take_events(), vec![NativeEvent::SelectionChanged(1)]);
    }

    #[test]
    fn swipe_is_blocked_when_disabled() {
        let mut pager = HeadlessPager::new(|item: &i32| item.to_string());
        let probe = pager.probe();
        pager.configure(&CarouselConfig::default().swiping_enabled(false));
        pager.rebuild(&[1, 2], 0);
        assert!(probe.swipe_to(1).is_empty());
        assert_eq!(probe.current_page(), 0);
    }

    #[test]
    fn teardown_failure_is_reported_once() {
        let mut pager = HeadlessPager::new(|item: &i32| item.to_string());
        let probe = pager.probe();
        probe.fail_teardown("gone");
        let err = pager.teardown().expect_err("teardown should fail");
        assert_eq!(err.to_string(), "gone");
        assert!(pager.teardown().is_ok());
        assert!(probe.is_torn_down());
    }
}
