//! carousel-core keeps a paged carousel widget, its item source and its
//! caller-visible position in agreement.
//!
//! # Model
//!
//! A [`Carousel`] owns a snapshot of the caller's items
//! ([`ItemSourceMirror`]), a canonical position and a platform adapter
//! implementing [`NativePager`]. Callers request moves with
//! [`Carousel::set_position`], report source mutations through the
//! reconciler methods ([`Carousel::insert`], [`Carousel::remove`], ...) and
//! feed widget callbacks back with [`Carousel::pump`].
//!
//! Each settled position change fires exactly one [`PositionSelected`],
//! whether the user swiped, the controller drove a transition or a source
//! change moved the displayed page. Selection reports the widget produces
//! while the controller is driving it are echoes and never surface.
//!
//! # Headless use
//!
//! [`HeadlessPager`] is an in-process adapter with a virtual clock, used by
//! the tests and the `carousel-demo` binary.
//!
//! ```
//! use carousel_core::{Carousel, CarouselConfig, HeadlessPager, SelectionOrigin};
//!
//! let pager = HeadlessPager::new(|item: &char| item.to_string());
//! let probe = pager.probe();
//! let mut carousel = Carousel::attach(&vec!['a', 'b', 'c'], 1, pager, CarouselConfig::default());
//!
//! carousel.on_position_selected(|event| {
//!     assert_eq!(event.origin, SelectionOrigin::User);
//! });
//! carousel.pump(probe.swipe_to(2));
//! assert_eq!(carousel.selected_item(), Some(&'c'));
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod carousel;
pub mod config;
pub mod controller;
pub mod error;
pub mod headless;
pub mod indicator;
pub mod mirror;
pub mod native;
pub mod reconciler;
pub mod swipe_guard;

pub use crate::{
    carousel::{Carousel, PositionSelected, SelectionOrigin, TransitionOutcome},
    config::{CarouselConfig, DEFAULT_SETTLE_DELAY, Orientation, RemoveAnchor},
    controller::{PendingTransition, TransitionState},
    error::{CarouselError, IndexKind},
    headless::{HeadlessPager, HeadlessProbe, NativeOp},
    indicator::{Highlights, compute_highlights},
    mirror::{ItemSource, ItemSourceMirror},
    native::{
        NativeEvent, NativePager, NativeResult, Settle, TransitionDirection, TransitionRequest,
    },
    reconciler::ChangeEvent,
    swipe_guard::SwipeGuard,
};
