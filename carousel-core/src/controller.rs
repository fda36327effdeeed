//! Canonical position ownership and transition driving.
//!
//! The controller is a two-state machine. In [`TransitionState::Idle`] a
//! request may start one transition; it then sits in
//! [`TransitionState::Pending`] until the native widget settles, at which
//! point the canonical position is finalized and exactly one
//! [`PositionSelected`](crate::PositionSelected) fires. The canonical
//! position only moves on settle, so transition direction is always derived
//! from the last settled page.
use tracing::{debug, trace, warn};

use crate::{
    carousel::{Carousel, SelectionOrigin, TransitionOutcome},
    error::{CarouselError, check_element},
    native::{NativeEvent, NativePager, Settle, TransitionDirection, TransitionRequest},
};

/// Work to finish once a pending transition settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Completion {
    /// Adopt the transition target as the canonical position.
    Select,
    /// Drop the entry that was displayed before the transition.
    RemoveDisplayed {
        index: usize,
        position_after: usize,
    },
}

/// The single in-flight transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTransition {
    /// Page the widget is moving to.
    pub target: usize,
    /// Whether the widget animates.
    pub animate: bool,
    completion: Completion,
}

/// Transition state of a carousel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionState {
    /// No transition in flight.
    #[default]
    Idle,
    /// One transition is waiting for the native widget to settle.
    Pending(PendingTransition),
}

impl TransitionState {
    pub(crate) fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl<T, N: NativePager<T>> Carousel<T, N> {
    /// Moves to `target`, animating when `animate` is set.
    ///
    /// Returns [`TransitionOutcome::EmptySource`] without side effects when
    /// there are no items and [`TransitionOutcome::Unchanged`] when `target`
    /// is already displayed.
    pub fn set_position(
        &mut self,
        target: usize,
        animate: bool,
    ) -> Result<TransitionOutcome, CarouselError> {
        self.ensure_attached()?;
        if self.mirror.is_empty() {
            debug!(target, "ignoring position request on empty source");
            return Ok(TransitionOutcome::EmptySource);
        }
        self.ensure_idle()?;
        check_element(target, self.mirror.len())?;
        if target == self.position {
            return Ok(TransitionOutcome::Unchanged);
        }
        Ok(self.begin_transition(target, animate, Completion::Select))
    }

    /// Moves to `target` using the configured animation preference.
    pub fn select(&mut self, target: usize) -> Result<TransitionOutcome, CarouselError> {
        self.set_position(target, self.config.animate_transition)
    }

    /// Whether a transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        matches!(self.transition, TransitionState::Pending(_))
    }

    /// The in-flight transition, if any.
    pub fn pending_transition(&self) -> Option<&PendingTransition> {
        match &self.transition {
            TransitionState::Idle => None,
            TransitionState::Pending(pending) => Some(pending),
        }
    }

    /// Whether a native selection report right now would come from the user.
    ///
    /// False while the controller drives the widget, while a transition is
    /// pending and while echoes of immediate transitions are still owed.
    pub fn is_user_driven(&self) -> bool {
        self.guard.is_user_driven() && !self.is_transitioning() && self.echoes.is_empty()
    }

    /// Handles the native widget reporting `raw_index` as the visible page.
    ///
    /// Reports made while the controller drives a transition, and the
    /// echoes still owed by transitions that settled immediately, are
    /// ignored. A user swipe to a new page becomes the canonical position
    /// and fires one event.
    pub fn on_native_selection_changed(&mut self, raw_index: usize) {
        if self.is_detached() {
            return;
        }
        if !self.guard.is_user_driven() || self.is_transitioning() {
            self.retire_echo(raw_index);
            trace!(raw_index, "ignoring controller-driven selection echo");
            return;
        }
        if self.retire_echo(raw_index) {
            trace!(raw_index, "consumed echo of immediate transition");
            return;
        }
        if !self.echoes.is_empty() {
            // The widget skipped its echoes; this report is a swipe.
            debug!(owed = self.echoes.len(), "dropping unreported echoes");
            self.echoes.clear();
        }
        if raw_index >= self.mirror.len() {
            warn!(
                raw_index,
                count = self.mirror.len(),
                "native pager reported a page outside the item range"
            );
            return;
        }
        if raw_index == self.position {
            return;
        }
        if !self.config.swiping_enabled {
            warn!(raw_index, "swipe reported while swiping is disabled; snapping back");
            self.reload_native();
            return;
        }
        self.position = raw_index;
        self.sync_indicators();
        self.emit(SelectionOrigin::User);
    }

    /// Handles the native widget finishing a deferred transition.
    pub fn on_transition_settled(&mut self) {
        if self.is_detached() {
            return;
        }
        let TransitionState::Pending(pending) = self.transition.take() else {
            warn!("native pager settled with no transition pending");
            return;
        };
        self.finish_transition(pending);
        self.drain_queue();
    }

    /// Dispatches one native callback.
    pub fn handle_native_event(&mut self, event: NativeEvent) {
        match event {
            NativeEvent::SelectionChanged(index) => self.on_native_selection_changed(index),
            NativeEvent::Settled => self.on_transition_settled(),
        }
    }

    /// Dispatches native callbacks in order.
    pub fn pump(&mut self, events: impl IntoIterator<Item = NativeEvent>) {
        for event in events {
            self.handle_native_event(event);
        }
    }

    pub(crate) fn begin_transition(
        &mut self,
        target: usize,
        animate: bool,
        completion: Completion,
    ) -> TransitionOutcome {
        let request = TransitionRequest {
            target,
            direction: TransitionDirection::between(self.position, target),
            animate,
        };
        let pending = PendingTransition {
            target,
            animate,
            completion,
        };
        debug!(?request, "starting transition");
        self.transition = TransitionState::Pending(pending);
        let settle = self
            .guard
            .run_guarded(|| self.native.transition_to(request));
        match settle {
            Settle::Immediate => {
                self.transition = TransitionState::Idle;
                self.echoes.push_back(target);
                self.finish_transition(pending);
                TransitionOutcome::Settled
            }
            Settle::Deferred => TransitionOutcome::Pending,
        }
    }

    /// Retires the owed echo matching `raw_index` and every older one.
    /// Echoes arrive in request order.
    fn retire_echo(&mut self, raw_index: usize) -> bool {
        match self.echoes.iter().position(|echo| *echo == raw_index) {
            Some(matched) => {
                self.echoes.drain(..=matched);
                true
            }
            None => false,
        }
    }

    fn finish_transition(&mut self, pending: PendingTransition) {
        match pending.completion {
            Completion::Select => {
                self.position = pending.target;
                self.sync_indicators();
                self.emit(SelectionOrigin::Controller);
            }
            Completion::RemoveDisplayed {
                index,
                position_after,
            } => {
                self.mirror.remove(index);
                self.position = position_after;
                self.reload_native();
                self.sync_indicators();
                self.emit(SelectionOrigin::Source);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use parking_lot::Mutex;
    use rstest::rstest;

    use crate::{
        Carousel, CarouselConfig, CarouselError, HeadlessPager, PositionSelected, SelectionOrigin,
        TransitionOutcome,
        headless::{HeadlessProbe, NativeOp},
        native::{NativeEvent, TransitionDirection, TransitionRequest},
    };

    const SETTLE: Duration = crate::config::DEFAULT_SETTLE_DELAY;

    type TestCarousel = Carousel<&'static str, HeadlessPager<&'static str>>;

    struct Harness {
        carousel: TestCarousel,
        probe: HeadlessProbe,
        fired: Arc<Mutex<Vec<PositionSelected>>>,
    }

    impl Harness {
        fn new(items: &[&'static str], position: usize) -> Self {
            Self::with_config(items, position, CarouselConfig::default())
        }

        fn with_config(items: &[&'static str], position: usize, config: CarouselConfig) -> Self {
            let pager = HeadlessPager::new(|item: &&str| item.to_string());
            let probe = pager.probe();
            let mut carousel = Carousel::attach(items, position, pager, config);
            let fired = Arc::new(Mutex::new(Vec::new()));
            let sink = fired.clone();
            carousel.on_position_selected(move |event| sink.lock().push(event));
            Self {
                carousel,
                probe,
                fired,
            }
        }

        fn settle(&mut self) {
            let events = self.probe.advance(SETTLE);
            self.carousel.pump(events);
        }

        fn fired(&self) -> Vec<PositionSelected> {
            self.fired.lock().clone()
        }
    }

    #[rstest]
    #[case(0, 1)]
    #[case(0, 3)]
    #[case(3, 0)]
    #[case(2, 1)]
    fn animated_transition_settles_on_target(#[case] start: usize, #[case] target: usize) {
        let mut h = Harness::new(&["a", "b", "c", "d"], start);
        let outcome = h.carousel.set_position(target, true);
        assert_eq!(outcome, Ok(TransitionOutcome::Pending));
        assert_eq!(h.carousel.position(), start);
        assert!(h.fired().is_empty());

        h.settle();
        assert_eq!(h.carousel.position(), target);
        assert!(!h.carousel.is_transitioning());
        assert_eq!(
            h.fired(),
            vec![PositionSelected {
                position: target,
                origin: SelectionOrigin::Controller,
            }]
        );
        assert_eq!(h.probe.current_page(), target);
    }

    #[test]
    fn unanimated_transition_settles_immediately() {
        let mut h = Harness::new(&["a", "b"], 0);
        let outcome = h.carousel.set_position(1, false);
        assert_eq!(outcome, Ok(TransitionOutcome::Settled));
        assert_eq!(h.carousel.position(), 1);
        assert_eq!(h.fired().len(), 1);

        // The widget's echo of the jump must not count as a swipe.
        let echoes = h.probe.take_events();
        assert_eq!(echoes, vec![NativeEvent::SelectionChanged(1)]);
        h.carousel.pump(echoes);
        assert_eq!(h.fired().len(), 1);
    }

    #[test]
    fn echoes_of_consecutive_jumps_are_not_swipes() {
        let mut h = Harness::new(&["a", "b", "c"], 0);
        h.carousel.set_position(1, false).expect("first jump");
        h.carousel.set_position(0, false).expect("second jump");
        assert!(!h.carousel.is_user_driven());

        h.carousel.pump(h.probe.take_events());
        assert_eq!(h.carousel.position(), 0);
        assert_eq!(
            h.fired(),
            vec![
                PositionSelected {
                    position: 1,
                    origin: SelectionOrigin::Controller,
                },
                PositionSelected {
                    position: 0,
                    origin: SelectionOrigin::Controller,
                },
            ]
        );
        assert!(h.carousel.is_user_driven());
    }

    #[test]
    fn swipe_after_consumed_echo_is_reported() {
        let mut h = Harness::new(&["a", "b", "c"], 0);
        h.carousel.set_position(2, false).expect("jump");
        h.carousel.pump(h.probe.take_events());
        h.carousel.pump(h.probe.swipe_to(1));
        assert_eq!(h.carousel.position(), 1);
        assert_eq!(h.fired().len(), 2);
        assert_eq!(h.fired()[1].origin, SelectionOrigin::User);
    }

    #[test]
    fn current_position_is_idempotent() {
        let mut h = Harness::new(&["a", "b", "c"], 1);
        let before = h.probe.ops().len();
        assert_eq!(h.carousel.set_position(1, true), Ok(TransitionOutcome::Unchanged));
        assert_eq!(h.probe.ops().len(), before);
        assert!(h.fired().is_empty());
    }

    #[test]
    fn empty_source_is_a_no_op() {
        let mut h = Harness::new(&[], 0);
        assert_eq!(h.carousel.set_position(0, true), Ok(TransitionOutcome::EmptySource));
        assert_eq!(h.carousel.set_position(4, false), Ok(TransitionOutcome::EmptySource));
        assert!(!h.carousel.is_transitioning());
        assert!(h.fired().is_empty());
    }

    #[test]
    fn out_of_range_target_is_rejected() {
        let mut h = Harness::new(&["a", "b"], 0);
        assert!(matches!(
            h.carousel.set_position(2, true),
            Err(CarouselError::OutOfRange { index: 2, count: 2, .. })
        ));
        assert!(!h.carousel.is_transitioning());
    }

    #[test]
    fn second_transition_is_rejected_while_pending() {
        let mut h = Harness::new(&["a", "b", "c"], 0);
        h.carousel.set_position(2, true).expect("first transition");
        assert_eq!(
            h.carousel.set_position(1, true),
            Err(CarouselError::TransitionPending { target: 2 })
        );
        assert_eq!(
            h.carousel.set_position(0, true),
            Err(CarouselError::TransitionPending { target: 2 })
        );
        h.settle();
        assert_eq!(h.carousel.position(), 2);
        assert_eq!(h.fired().len(), 1);
    }

    #[test]
    fn direction_follows_last_settled_page() {
        let mut h = Harness::new(&["a", "b", "c", "d"], 2);
        h.carousel.set_position(3, false).expect("jump forward");
        h.carousel.set_position(0, true).expect("animate back");
        h.settle();
        let transitions: Vec<TransitionRequest> = h
            .probe
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                NativeOp::Transition(request) => Some(request),
                _ => None,
            })
            .collect();
        assert_eq!(transitions[0].direction, TransitionDirection::Forward);
        assert_eq!(transitions[1].direction, TransitionDirection::Reverse);
        // The jump's echo was delivered during the animated transition.
        assert!(h.carousel.is_user_driven());
    }

    #[test]
    fn user_swipe_sets_position_once() {
        let mut h = Harness::new(&["a", "b", "c"], 0);
        assert!(h.carousel.is_user_driven());
        let events = h.probe.swipe_to(1);
        h.carousel.pump(events);
        assert_eq!(h.carousel.position(), 1);
        assert_eq!(
            h.fired(),
            vec![PositionSelected {
                position: 1,
                origin: SelectionOrigin::User,
            }]
        );
        assert_eq!(h.carousel.highlights(), &[false, true, false]);

        // Repeated report for the same settle.
        h.carousel.on_native_selection_changed(1);
        assert_eq!(h.fired().len(), 1);
    }

    #[test]
    fn selection_echo_during_transition_is_ignored() {
        let mut h = Harness::new(&["a", "b", "c"], 0);
        h.carousel.set_position(2, true).expect("transition");
        assert!(!h.carousel.is_user_driven());
        h.carousel.on_native_selection_changed(1);
        assert_eq!(h.carousel.position(), 0);
        assert!(h.fired().is_empty());

        h.settle();
        assert_eq!(h.carousel.position(), 2);
        assert_eq!(h.fired().len(), 1);
    }

    #[test]
    fn selection_outside_range_is_ignored() {
        let mut h = Harness::new(&["a", "b"], 0);
        h.carousel.on_native_selection_changed(5);
        assert_eq!(h.carousel.position(), 0);
        assert!(h.fired().is_empty());
    }

    #[test]
    fn swipe_is_reverted_when_swiping_is_disabled() {
        let mut h = Harness::with_config(
            &["a", "b"],
            0,
            CarouselConfig::default().swiping_enabled(false),
        );
        h.carousel.on_native_selection_changed(1);
        assert_eq!(h.carousel.position(), 0);
        assert_eq!(h.probe.current_page(), 0);
        assert!(h.fired().is_empty());
    }

    #[test]
    fn stray_settle_is_ignored() {
        let mut h = Harness::new(&["a", "b"], 1);
        h.carousel.on_transition_settled();
        assert_eq!(h.carousel.position(), 1);
        assert!(h.fired().is_empty());
    }

    #[test]
    fn select_uses_configured_animation() {
        let mut h = Harness::with_config(
            &["a", "b"],
            0,
            CarouselConfig::default().animate_transition(false),
        );
        assert_eq!(h.carousel.select(1), Ok(TransitionOutcome::Settled));

        let mut h = Harness::new(&["a", "b"], 0);
        assert_eq!(h.carousel.select(1), Ok(TransitionOutcome::Pending));
        assert_eq!(h.carousel.pending_transition().map(|p| p.target), Some(1));
    }
}
