//! Local snapshot of the externally owned item collection.
//!
//! The native pager needs a stable count and index view while a transition
//! is in flight, so every paging decision reads from an [`ItemSourceMirror`]
//! rather than from the live collection. The mirror only changes through
//! reconciler operations or an explicit [`ItemSourceMirror::refresh`].

/// An ordered, indexable item collection owned by the caller.
pub trait ItemSource<T> {
    /// Number of items in the collection.
    fn count(&self) -> usize;

    /// Item at `index`, or `None` when out of range.
    fn get_at(&self, index: usize) -> Option<T>;
}

impl<T: Clone> ItemSource<T> for [T] {
    fn count(&self) -> usize {
        self.len()
    }

    fn get_at(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }
}

impl<T: Clone> ItemSource<T> for Vec<T> {
    fn count(&self) -> usize {
        self.len()
    }

    fn get_at(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }
}

/// Ordered snapshot of the item source.
#[derive(Clone, Debug)]
pub struct ItemSourceMirror<T> {
    items: Vec<T>,
}

impl<T> Default for ItemSourceMirror<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ItemSourceMirror<T> {
    /// Creates a mirror holding `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Copies the current contents of `source` into a new mirror.
    pub fn from_source<S>(source: &S) -> Self
    where
        S: ItemSource<T> + ?Sized,
    {
        let items = (0..source.count())
            .filter_map(|index| source.get_at(index))
            .collect();
        Self { items }
    }

    /// Current ordered sequence.
    pub fn snapshot(&self) -> &[T] {
        &self.items
    }

    /// Consumes the mirror, returning its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Replaces the snapshot wholesale.
    pub fn refresh(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Number of mirrored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the mirror holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    // Index checks happen in the reconciler before any of these run.

    pub(crate) fn insert(&mut self, index: usize, item: T) {
        self.items.insert(index, item);
    }

    pub(crate) fn remove(&mut self, index: usize) -> T {
        self.items.remove(index)
    }

    pub(crate) fn relocate(&mut self, from: usize, to: usize) {
        let item = self.items.remove(from);
        self.items.insert(to, item);
    }

    pub(crate) fn replace(&mut self, index: usize, item: T) -> T {
        std::mem::replace(&mut self.items[index], item)
    }
}
