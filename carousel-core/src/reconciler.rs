//! Applies item-source changes to the mirror, the position and the widget.
//!
//! Each change produces the smallest set of native updates that keeps the
//! widget consistent with the mirror. Removing the displayed page is the one
//! change that needs a transition: the widget first moves away from the
//! outgoing page and the entry is dropped only once that transition settles.
use tracing::{debug, warn};

use crate::{
    carousel::{Carousel, SelectionOrigin, TransitionOutcome, clamp_position},
    config::RemoveAnchor,
    controller::{Completion, TransitionState},
    error::{CarouselError, check_element, check_insertion},
    mirror::{ItemSource, ItemSourceMirror},
    native::NativePager,
};

/// A change notification from an observable item source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent<T> {
    /// `item` was inserted at `index`, or appended when `index` is `None`.
    Add {
        /// Inserted item.
        item: T,
        /// Insertion slot.
        index: Option<usize>,
    },
    /// The entry at `index` was removed.
    Remove {
        /// Removed slot.
        index: usize,
    },
    /// The entry at `from` now lives at `to`.
    Move {
        /// Original slot.
        from: usize,
        /// New slot.
        to: usize,
    },
    /// The entry at `index` was replaced by `item`.
    Replace {
        /// Replaced slot.
        index: usize,
        /// New item.
        item: T,
    },
    /// The whole collection was replaced.
    Reset {
        /// New contents.
        items: Vec<T>,
    },
}

impl<T, N: NativePager<T>> Carousel<T, N> {
    /// Inserts `item` at `index`, or appends it when `index` is `None`.
    ///
    /// Inserting at or before the displayed page shifts the position so the
    /// same item stays displayed. Inserting into an empty carousel selects
    /// the new item.
    pub fn insert(
        &mut self,
        item: T,
        index: Option<usize>,
    ) -> Result<TransitionOutcome, CarouselError> {
        self.ensure_idle()?;
        let count = self.mirror.len();
        let index = index.unwrap_or(count);
        check_insertion(index, count)?;

        self.mirror.insert(index, item);
        if count == 0 {
            self.position = 0;
            self.rebuild_native();
            self.sync_indicators();
            self.emit(SelectionOrigin::Source);
            return Ok(TransitionOutcome::Settled);
        }
        if index <= self.position {
            self.position += 1;
        }
        self.reload_native();
        self.sync_indicators();
        Ok(TransitionOutcome::Unchanged)
    }

    /// Appends `item`.
    pub fn append(&mut self, item: T) -> Result<TransitionOutcome, CarouselError> {
        self.insert(item, None)
    }

    /// Removes the entry at `index`.
    ///
    /// Removing the displayed page transitions to its neighbour first and
    /// finishes when that transition settles.
    pub fn remove(&mut self, index: usize) -> Result<TransitionOutcome, CarouselError> {
        self.ensure_idle()?;
        let count = self.mirror.len();
        check_element(index, count)?;

        if count == 1 {
            self.mirror.remove(index);
            self.position = 0;
            self.rebuild_native();
            self.sync_indicators();
            return Ok(TransitionOutcome::Unchanged);
        }

        if index == self.position {
            let (target, position_after) = if index == 0 {
                (1, 0)
            } else {
                (index - 1, index - 1)
            };
            let completion = Completion::RemoveDisplayed {
                index,
                position_after,
            };
            return Ok(self.begin_transition(
                target,
                self.config.animate_transition,
                completion,
            ));
        }

        self.mirror.remove(index);
        let mut outcome = TransitionOutcome::Unchanged;
        if index < self.position {
            match self.config.remove_anchor {
                RemoveAnchor::FollowItem => self.position -= 1,
                RemoveAnchor::KeepIndex if self.position >= self.mirror.len() => {
                    self.position = self.mirror.len() - 1;
                    outcome = TransitionOutcome::Settled;
                }
                RemoveAnchor::KeepIndex => {}
            }
        }
        self.reload_native();
        self.sync_indicators();
        if outcome == TransitionOutcome::Settled {
            self.emit(SelectionOrigin::Source);
        }
        Ok(outcome)
    }

    /// Moves the entry at `from` to `to`. The position follows the displayed
    /// entry.
    pub fn move_item(
        &mut self,
        from: usize,
        to: usize,
    ) -> Result<TransitionOutcome, CarouselError> {
        self.ensure_idle()?;
        let count = self.mirror.len();
        check_element(from, count)?;
        check_element(to, count)?;
        if from == to {
            return Ok(TransitionOutcome::Unchanged);
        }

        self.mirror.relocate(from, to);
        let position = self.position;
        self.position = if from == position {
            to
        } else if from < position && position <= to {
            position - 1
        } else if to <= position && position < from {
            position + 1
        } else {
            position
        };
        self.reload_native();
        self.sync_indicators();
        Ok(TransitionOutcome::Unchanged)
    }

    /// Replaces the entry at `index` and re-renders only that page, in place.
    pub fn replace(&mut self, index: usize, item: T) -> Result<TransitionOutcome, CarouselError> {
        self.ensure_idle()?;
        check_element(index, self.mirror.len())?;

        self.mirror.replace(index, item);
        if let Some(item) = self.mirror.get(index) {
            self.guard
                .run_guarded(|| self.native.refresh_page(index, item));
        }
        Ok(TransitionOutcome::Unchanged)
    }

    /// Replaces the whole collection and selects the clamped position.
    pub fn reset(&mut self, items: Vec<T>) -> Result<TransitionOutcome, CarouselError> {
        self.ensure_idle()?;
        self.mirror.refresh(items);
        self.position = clamp_position(self.position, self.mirror.len());
        self.rebuild_native();
        self.sync_indicators();
        self.emit(SelectionOrigin::Source);
        Ok(TransitionOutcome::Settled)
    }

    /// Replaces the whole collection with the current contents of `source`.
    pub fn reset_from<S>(&mut self, source: &S) -> Result<TransitionOutcome, CarouselError>
    where
        S: ItemSource<T> + ?Sized,
    {
        let mirror = ItemSourceMirror::from_source(source);
        self.reset(mirror.into_items())
    }

    /// Applies one change notification.
    pub fn apply(&mut self, event: ChangeEvent<T>) -> Result<TransitionOutcome, CarouselError> {
        match event {
            ChangeEvent::Add { item, index } => self.insert(item, index),
            ChangeEvent::Remove { index } => self.remove(index),
            ChangeEvent::Move { from, to } => self.move_item(from, to),
            ChangeEvent::Replace { index, item } => self.replace(index, item),
            ChangeEvent::Reset { items } => self.reset(items),
        }
    }

    /// Applies `event` now, or queues it while a transition is pending.
    ///
    /// Returns `Ok(None)` when the event was queued. Queued events are applied
    /// in order once the transition settles; failures at that point are
    /// logged and the event is dropped.
    pub fn enqueue(
        &mut self,
        event: ChangeEvent<T>,
    ) -> Result<Option<TransitionOutcome>, CarouselError> {
        self.ensure_attached()?;
        if self.is_transitioning() || !self.queued.is_empty() {
            debug!(queued = self.queued.len() + 1, "deferring source change");
            self.queued.push_back(event);
            self.drain_queue();
            return Ok(None);
        }
        self.apply(event).map(Some)
    }

    pub(crate) fn drain_queue(&mut self) {
        while matches!(self.transition, TransitionState::Idle) {
            let Some(event) = self.queued.pop_front() else {
                break;
            };
            if let Err(err) = self.apply(event) {
                warn!("dropping queued source change: {err}");
            }
        }
    }
}
