//! Page indicator (dot) highlight state.
use smallvec::SmallVec;

/// Highlight flags, one per page.
pub type Highlights = SmallVec<[bool; 16]>;

/// Returns `count` flags that are `true` only at `position`.
///
/// A position outside `0..count` highlights nothing.
pub fn compute_highlights(count: usize, position: usize) -> Highlights {
    (0..count).map(|index| index == position).collect()
}
