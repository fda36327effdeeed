//! Behavioural configuration for a carousel.
//!
//! ## Usage
//!
//! Build a config with the generated setters and pass it to
//! [`Carousel::attach`](crate::Carousel::attach).
//!
//! ```
//! use std::time::Duration;
//! use carousel_core::{CarouselConfig, Orientation};
//!
//! let config = CarouselConfig::default()
//!     .animate_transition(false)
//!     .orientation(Orientation::Vertical)
//!     .settle_delay(Duration::from_millis(250));
//! assert!(!config.animate_transition);
//! ```
use std::time::Duration;

use derive_setters::Setters;

/// Settle delay conventionally used by native pagers.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Scroll axis of the native pager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Pages are laid out left to right.
    #[default]
    Horizontal,
    /// Pages are laid out top to bottom.
    Vertical,
}

/// How removing an entry before the current page affects the position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemoveAnchor {
    /// Keep the numeric position; clamp it when it falls off the end.
    #[default]
    KeepIndex,
    /// Shift the position so the displayed entry stays displayed.
    FollowItem,
}

/// Configuration shared by the state machine and the native adapter.
#[derive(Clone, Debug, PartialEq, Setters)]
pub struct CarouselConfig {
    /// Animate controller-driven transitions unless the caller overrides it.
    pub animate_transition: bool,
    /// Whether the user may swipe between pages.
    pub swiping_enabled: bool,
    /// Whether the adapter should show the page indicators.
    pub show_indicators: bool,
    /// Scroll axis of the pager.
    pub orientation: Orientation,
    /// Gap between pages, in adapter units.
    pub inter_page_spacing: u32,
    /// Position policy for removals before the current page.
    pub remove_anchor: RemoveAnchor,
    /// Delay the headless adapter waits before an animated transition settles.
    pub settle_delay: Duration,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            animate_transition: true,
            swiping_enabled: true,
            show_indicators: false,
            orientation: Orientation::default(),
            inter_page_spacing: 0,
            remove_anchor: RemoveAnchor::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}
