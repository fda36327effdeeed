//! Capability interface implemented once per native paging widget.
//!
//! ## Usage
//!
//! Each platform supplies an adapter that renders pages through its own
//! content-creation function, drives transitions and forwards the widget's
//! callbacks back into the [`Carousel`](crate::Carousel) as [`NativeEvent`]s.
//! The adapter never decides positions; it only applies what the carousel
//! asks for.
use std::error::Error;

use crate::config::CarouselConfig;

/// Result type for native hooks that may fail at the platform boundary.
pub type NativeResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Direction of a page transition relative to the last settled page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionDirection {
    /// Towards higher indices.
    Forward,
    /// Towards lower indices.
    Reverse,
}

impl TransitionDirection {
    /// Direction for moving from `settled` to `target`.
    pub fn between(settled: usize, target: usize) -> Self {
        if target >= settled {
            Self::Forward
        } else {
            Self::Reverse
        }
    }
}

/// A transition the carousel asks the native widget to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionRequest {
    /// Page to show once the transition settles.
    pub target: usize,
    /// Direction relative to the last settled page.
    pub direction: TransitionDirection,
    /// Whether the widget should animate.
    pub animate: bool,
}

/// How a native transition completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settle {
    /// The widget already shows the target page.
    Immediate,
    /// The widget will report [`NativeEvent::Settled`] later.
    Deferred,
}

/// Callbacks delivered by the native widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeEvent {
    /// The visible page changed, by swipe or as an echo of a transition.
    SelectionChanged(usize),
    /// The last requested deferred transition finished.
    Settled,
}

/// Platform adapter for a paging widget.
pub trait NativePager<T> {
    /// Returns the adapter name for logging and diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Applies widget-level configuration. Called once on attach.
    fn configure(&mut self, _config: &CarouselConfig) {}

    /// Recreates the widget content for `items`, showing `position`.
    fn rebuild(&mut self, items: &[T], position: usize);

    /// Re-reads `items` in the existing widget and snaps to `position`
    /// without animation.
    fn reload(&mut self, items: &[T], position: usize);

    /// Re-renders the page at `index` in place.
    fn refresh_page(&mut self, index: usize, item: &T);

    /// Starts a transition to `request.target`.
    fn transition_to(&mut self, request: TransitionRequest) -> Settle;

    /// Updates the indicator dots.
    fn update_indicators(&mut self, _highlights: &[bool], _visible: bool) {}

    /// Releases native resources.
    fn teardown(&mut self) -> NativeResult {
        Ok(())
    }
}
