//! The carousel aggregate: item mirror, canonical position and native pager.
//!
//! ## Usage
//!
//! Attach a carousel to an item source and a [`NativePager`], subscribe to
//! position selection, then feed it caller requests and native callbacks.
//!
//! ```
//! use std::sync::{
//!     Arc,
//!     atomic::{AtomicUsize, Ordering},
//! };
//! use carousel_core::{Carousel, CarouselConfig, HeadlessPager};
//!
//! let pager = HeadlessPager::new(|item: &&str| item.to_string());
//! let probe = pager.probe();
//! let mut carousel = Carousel::attach(&vec!["a", "b", "c"], 0, pager, CarouselConfig::default());
//!
//! let fired = Arc::new(AtomicUsize::new(0));
//! let counter = fired.clone();
//! carousel.on_position_selected(move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! carousel.set_position(2, true).unwrap();
//! assert!(carousel.is_transitioning());
//!
//! carousel.pump(probe.advance(CarouselConfig::default().settle_delay));
//! assert_eq!(carousel.position(), 2);
//! assert_eq!(fired.load(Ordering::SeqCst), 1);
//! ```
use std::{collections::VecDeque, fmt, sync::Arc};

use tracing::{debug, error};

use crate::{
    config::CarouselConfig,
    controller::TransitionState,
    error::CarouselError,
    indicator::{Highlights, compute_highlights},
    mirror::{ItemSource, ItemSourceMirror},
    native::NativePager,
    reconciler::ChangeEvent,
    swipe_guard::SwipeGuard,
};

/// What caused a "position selected" notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOrigin {
    /// The user swiped the native widget.
    User,
    /// A controller-driven transition settled.
    Controller,
    /// A change of the item source moved the displayed page.
    Source,
}

/// Notification fired once per settled position change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionSelected {
    /// Canonical position after the change.
    pub position: usize,
    /// Cause of the change.
    pub origin: SelectionOrigin,
}

/// Result of a request that may move the displayed page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The source is empty; there was nothing to do.
    EmptySource,
    /// The displayed page did not change and no event fired.
    Unchanged,
    /// The change settled synchronously and one event fired.
    Settled,
    /// A transition is in flight; the event fires when it settles.
    Pending,
}

type PositionListener = Arc<dyn Fn(PositionSelected) + Send + Sync>;

/// Position-synchronized carousel over a native paging widget.
///
/// All methods expect single-threaded, UI-affine use. Transitions are
/// serialized: while one is pending, direct requests are rejected with
/// [`CarouselError::TransitionPending`] and [`Carousel::enqueue`] defers
/// source changes until the transition settles.
pub struct Carousel<T, N: NativePager<T>> {
    pub(crate) mirror: ItemSourceMirror<T>,
    pub(crate) position: usize,
    pub(crate) transition: TransitionState,
    pub(crate) guard: SwipeGuard,
    pub(crate) native: N,
    pub(crate) config: CarouselConfig,
    pub(crate) highlights: Highlights,
    pub(crate) queued: VecDeque<ChangeEvent<T>>,
    /// Selection reports still owed by transitions that settled immediately.
    pub(crate) echoes: VecDeque<usize>,
    listener: Option<PositionListener>,
    detached: bool,
}

impl<T, N: NativePager<T>> Carousel<T, N> {
    /// Attaches to `source`, showing `position` clamped into range.
    pub fn attach<S>(source: &S, position: usize, native: N, config: CarouselConfig) -> Self
    where
        S: ItemSource<T> + ?Sized,
    {
        let mirror = ItemSourceMirror::from_source(source);
        let position = clamp_position(position, mirror.len());
        let mut carousel = Self {
            mirror,
            position,
            transition: TransitionState::Idle,
            guard: SwipeGuard::new(),
            native,
            config,
            highlights: Highlights::new(),
            queued: VecDeque::new(),
            echoes: VecDeque::new(),
            listener: None,
            detached: false,
        };
        carousel.native.configure(&carousel.config);
        carousel.rebuild_native();
        carousel.sync_indicators();
        debug!(
            pager = carousel.native.name(),
            count = carousel.mirror.len(),
            position,
            "carousel attached"
        );
        carousel
    }

    /// Registers the "position selected" listener, replacing any previous one.
    pub fn on_position_selected(
        &mut self,
        listener: impl Fn(PositionSelected) + Send + Sync + 'static,
    ) {
        self.listener = Some(Arc::new(listener));
    }

    /// Canonical position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of mirrored items.
    pub fn len(&self) -> usize {
        self.mirror.len()
    }

    /// Whether the carousel has no items.
    pub fn is_empty(&self) -> bool {
        self.mirror.is_empty()
    }

    /// Mirrored items in display order.
    pub fn items(&self) -> &[T] {
        self.mirror.snapshot()
    }

    /// Item shown at the canonical position.
    pub fn selected_item(&self) -> Option<&T> {
        self.mirror.get(self.position)
    }

    /// Current indicator highlights.
    pub fn highlights(&self) -> &[bool] {
        &self.highlights
    }

    /// Active configuration.
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Replaces the configuration and forwards it to the native widget.
    ///
    /// Takes effect for the next request; a pending transition keeps the
    /// animation flag it started with.
    pub fn set_config(&mut self, config: CarouselConfig) -> Result<(), CarouselError> {
        self.ensure_attached()?;
        self.config = config;
        self.native.configure(&self.config);
        self.sync_indicators();
        debug!(config = ?self.config, "carousel reconfigured");
        Ok(())
    }

    /// Number of source changes waiting for the pending transition.
    pub fn queued_changes(&self) -> usize {
        self.queued.len()
    }

    /// Native adapter.
    pub fn native(&self) -> &N {
        &self.native
    }

    /// Mutable native adapter, for host-side plumbing.
    pub fn native_mut(&mut self) -> &mut N {
        &mut self.native
    }

    /// Whether the native widget has been released.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Releases the native widget.
    ///
    /// Any pending transition and queued change is dropped. Teardown failures
    /// are logged and never surface to the caller. Calling this twice is a
    /// no-op.
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        if let TransitionState::Pending(pending) = self.transition.take() {
            debug!(target = pending.target, "dropping pending transition on detach");
        }
        self.queued.clear();
        self.echoes.clear();
        if let Err(err) = self.native.teardown() {
            error!("Native pager '{}' teardown failed: {}", self.native.name(), err);
        }
    }

    pub(crate) fn ensure_attached(&self) -> Result<(), CarouselError> {
        if self.detached {
            Err(CarouselError::Detached)
        } else {
            Ok(())
        }
    }

    /// Rejects requests while detached or while a transition is in flight.
    pub(crate) fn ensure_idle(&self) -> Result<(), CarouselError> {
        self.ensure_attached()?;
        match self.transition {
            TransitionState::Idle => Ok(()),
            TransitionState::Pending(pending) => Err(CarouselError::TransitionPending {
                target: pending.target,
            }),
        }
    }

    pub(crate) fn rebuild_native(&mut self) {
        let position = self.position;
        self.guard
            .run_guarded(|| self.native.rebuild(self.mirror.snapshot(), position));
    }

    pub(crate) fn reload_native(&mut self) {
        let position = self.position;
        self.guard
            .run_guarded(|| self.native.reload(self.mirror.snapshot(), position));
    }

    pub(crate) fn sync_indicators(&mut self) {
        self.highlights = compute_highlights(self.mirror.len(), self.position);
        self.native
            .update_indicators(&self.highlights, self.config.show_indicators);
    }

    pub(crate) fn emit(&self, origin: SelectionOrigin) {
        let event = PositionSelected {
            position: self.position,
            origin,
        };
        debug!(position = event.position, ?origin, "position selected");
        if let Some(listener) = &self.listener {
            listener(event);
        }
    }
}

impl<T, N: NativePager<T>> Drop for Carousel<T, N> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<T: fmt::Debug, N: NativePager<T>> fmt::Debug for Carousel<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carousel")
            .field("items", &self.mirror.snapshot())
            .field("position", &self.position)
            .field("transition", &self.transition)
            .field("queued", &self.queued.len())
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

pub(crate) fn clamp_position(position: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        position.min(count - 1)
    }
}
